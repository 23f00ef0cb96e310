//! Protocol message types

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Serialize;
use serde_json::Value;

/// Characters escaped in an object id path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Business object family a message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectType {
    Transfer,
    Quote,
    TransferError,
    QuoteError,
}

/// Closed set of inbound message shapes.
///
/// The object type alone cannot tell a quote request from a quote response,
/// and routing depends on that difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    QuotePost,
    QuotePut,
    QuoteGet,
    QuoteError,
    TransferPost,
    TransferPut,
    TransferGet,
    TransferError,
}

impl MessageKind {
    pub fn object_type(&self) -> ObjectType {
        match self {
            MessageKind::QuotePost | MessageKind::QuotePut | MessageKind::QuoteGet => {
                ObjectType::Quote
            }
            MessageKind::QuoteError => ObjectType::QuoteError,
            MessageKind::TransferPost | MessageKind::TransferPut | MessageKind::TransferGet => {
                ObjectType::Transfer
            }
            MessageKind::TransferError => ObjectType::TransferError,
        }
    }

    /// Whether the body carries its own currency
    pub fn carries_currency(&self) -> bool {
        matches!(self, MessageKind::QuotePost | MessageKind::TransferPost)
    }

    /// Resource collection segment (`quotes` / `transfers`)
    pub fn resource(&self) -> &'static str {
        match self.object_type() {
            ObjectType::Quote | ObjectType::QuoteError => "quotes",
            ObjectType::Transfer | ObjectType::TransferError => "transfers",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::QuotePost => "quote_post",
            MessageKind::QuotePut => "quote_put",
            MessageKind::QuoteGet => "quote_get",
            MessageKind::QuoteError => "quote_error",
            MessageKind::TransferPost => "transfer_post",
            MessageKind::TransferPut => "transfer_put",
            MessageKind::TransferGet => "transfer_get",
            MessageKind::TransferError => "transfer_error",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified inbound message, handed unchanged to exactly one peer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolMessage {
    pub object_id: String,
    pub kind: MessageKind,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl ProtocolMessage {
    pub fn new(
        object_id: impl Into<String>,
        kind: MessageKind,
        headers: BTreeMap<String, String>,
        body: Value,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            kind,
            headers,
            body,
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.kind.object_type()
    }

    /// Path relative to a peer base url, e.g. `quotes/{id}/error`.
    /// The id is percent-encoded as a single path segment.
    pub fn relative_path(&self) -> String {
        let resource = self.kind.resource();
        let id = utf8_percent_encode(&self.object_id, PATH_SEGMENT);
        match self.kind {
            MessageKind::QuotePost | MessageKind::TransferPost => resource.to_string(),
            MessageKind::QuotePut
            | MessageKind::QuoteGet
            | MessageKind::TransferPut
            | MessageKind::TransferGet => format!("{}/{}", resource, id),
            MessageKind::QuoteError | MessageKind::TransferError => {
                format!("{}/{}/error", resource, id)
            }
        }
    }
}
