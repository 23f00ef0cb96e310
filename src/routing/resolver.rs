//! Routing Resolver
//!
//! Turns a classified message into the [`RoutingKey`] of its target endpoint.
//!
//! ```text
//! QuotePost / TransferPost ──▶ body.amount.currency                (direct)
//! everything else          ──▶ stored object ──▶ amount.currency   (correlated)
//!                                              └▶ transferAmount.currency
//! ```
//!
//! There is never a default currency: a message whose currency cannot be
//! determined fails routing.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::key::RoutingKey;
use crate::error::DispatchError;
use crate::protocol::{MessageKind, ProtocolMessage};
use crate::store::{ObjectStore, StoredObjectRef};

/// Where a correlated message looks for the object it refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationSource {
    StoredQuote,
    StoredQuotePut,
    StoredTransfer,
    OutgoingTransfer,
}

impl CorrelationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationSource::StoredQuote => "stored_quote",
            CorrelationSource::StoredQuotePut => "stored_quote_put",
            CorrelationSource::StoredTransfer => "stored_transfer",
            CorrelationSource::OutgoingTransfer => "outgoing_transfer",
        }
    }
}

/// Lookup order per kind; the first source with a hit wins.
/// Empty for kinds that carry their own currency.
pub fn correlation_sources(kind: MessageKind) -> &'static [CorrelationSource] {
    use CorrelationSource::*;
    match kind {
        MessageKind::QuotePost | MessageKind::TransferPost => &[],
        MessageKind::QuotePut | MessageKind::QuoteGet | MessageKind::QuoteError => {
            &[StoredQuote, StoredQuotePut]
        }
        // a fulfilment answers the outgoing leg
        MessageKind::TransferPut => &[OutgoingTransfer, StoredTransfer],
        MessageKind::TransferGet | MessageKind::TransferError => &[StoredTransfer, OutgoingTransfer],
    }
}

/// Currency of a quote/transfer body: `amount`, else `transferAmount`
pub fn currency_of(body: &Value) -> Option<&str> {
    ["amount", "transferAmount"]
        .iter()
        .find_map(|field| body.get(field)?.get("currency")?.as_str())
}

pub struct RoutingResolver {
    store: Arc<dyn ObjectStore>,
}

impl RoutingResolver {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Resolve the routing key for `message` addressed to `peer_id`
    pub async fn resolve(
        &self,
        message: &ProtocolMessage,
        peer_id: &str,
    ) -> Result<RoutingKey, DispatchError> {
        if message.kind.carries_currency() {
            let currency = currency_of(&message.body).ok_or_else(|| {
                DispatchError::UnresolvedRoutingKey(format!(
                    "{} {} has no amount.currency",
                    message.kind, message.object_id
                ))
            })?;
            return RoutingKey::new(peer_id, currency);
        }

        let (source, stored) = self.correlate(message).await?;
        let currency = currency_of(&stored.body).ok_or_else(|| {
            DispatchError::UnresolvedRoutingKey(format!(
                "{} for {} {} has no currency",
                source.as_str(),
                message.kind,
                message.object_id
            ))
        })?;

        debug!(
            object_id = %message.object_id,
            kind = %message.kind,
            source = source.as_str(),
            source_peer_id = %stored.source_peer_id,
            currency,
            "Correlated message with stored object"
        );
        RoutingKey::new(peer_id, currency)
    }

    async fn lookup(
        &self,
        source: CorrelationSource,
        id: &str,
    ) -> Result<Option<StoredObjectRef>, DispatchError> {
        let result = match source {
            CorrelationSource::StoredQuote => self.store.get_stored_quote_by_id(id).await,
            CorrelationSource::StoredQuotePut => self.store.get_stored_quote_put_by_id(id).await,
            CorrelationSource::StoredTransfer => self.store.get_stored_transfer_by_id(id).await,
            CorrelationSource::OutgoingTransfer => {
                self.store.map_outgoing_transfer_to_incoming(id).await
            }
        };
        result.map_err(|e| DispatchError::CorrelationLookupFailed(e.to_string()))
    }

    async fn correlate(
        &self,
        message: &ProtocolMessage,
    ) -> Result<(CorrelationSource, StoredObjectRef), DispatchError> {
        for &source in correlation_sources(message.kind) {
            if let Some(stored) = self.lookup(source, &message.object_id).await? {
                return Ok((source, stored));
            }
        }
        Err(DispatchError::CorrelationNotFound {
            kind: message.kind,
            object_id: message.object_id.clone(),
        })
    }
}
