//! Correlation Store
//!
//! [`ObjectStore`] is the lookup capability the resolver consumes to find
//! previously seen quotes and transfers. [`InMemoryObjectStore`] is the
//! bounded, expiring implementation fed by request tracking through
//! [`MessageRecorder`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use cached::{Cached, TimedSizedCache};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::protocol::{MessageKind, ProtocolMessage};

/// Read-only snapshot of a stored protocol object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObjectRef {
    pub headers: BTreeMap<String, String>,
    pub body: Value,
    pub source_peer_id: String,
}

impl StoredObjectRef {
    pub fn new(source_peer_id: impl Into<String>, body: Value) -> Self {
        Self {
            headers: BTreeMap::new(),
            body,
            source_peer_id: source_peer_id.into(),
        }
    }
}

/// Lookup failure inside the store itself (not a miss)
#[derive(Debug, Clone, thiserror::Error)]
#[error("store lookup failed: {0}")]
pub struct StoreError(pub String);

pub type StoreResult = Result<Option<StoredObjectRef>, StoreError>;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_stored_transfer_by_id(&self, id: &str) -> StoreResult;

    async fn get_stored_quote_by_id(&self, id: &str) -> StoreResult;

    async fn get_stored_quote_put_by_id(&self, id: &str) -> StoreResult;

    /// Incoming transfer that an outgoing transfer id was created from
    async fn map_outgoing_transfer_to_incoming(&self, id: &str) -> StoreResult;
}

/// Records accepted messages so later callbacks can be correlated
pub trait MessageRecorder: Send + Sync {
    /// Returns false for kinds that are never stored
    fn record(&self, message: &ProtocolMessage, source_peer_id: &str) -> bool;
}

/// Default retention for tracked objects
pub const DEFAULT_TTL_SECS: u64 = 3600;
pub const DEFAULT_MAX_ENTRIES: usize = 100_000;

type Table<V> = Mutex<TimedSizedCache<String, V>>;

fn table<V>(max_entries: usize, ttl_secs: u64) -> Table<V> {
    Mutex::new(TimedSizedCache::with_size_and_lifespan(max_entries, ttl_secs))
}

/// Bounded in-memory store.
///
/// Each table keeps at most `max_entries` objects (least recently used goes
/// first) and drops objects older than `ttl_secs`.
pub struct InMemoryObjectStore {
    quotes: Table<StoredObjectRef>,
    quote_puts: Table<StoredObjectRef>,
    transfers: Table<StoredObjectRef>,
    /// outgoing transfer id -> incoming transfer id
    transfer_links: Table<String>,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS)
    }
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `max_entries` and `ttl_secs` must both be non-zero
    pub fn with_limits(max_entries: usize, ttl_secs: u64) -> Self {
        Self {
            quotes: table(max_entries, ttl_secs),
            quote_puts: table(max_entries, ttl_secs),
            transfers: table(max_entries, ttl_secs),
            transfer_links: table(max_entries, ttl_secs),
        }
    }

    pub fn insert_quote(&self, id: impl Into<String>, object: StoredObjectRef) {
        self.quotes.lock().cache_set(id.into(), object);
    }

    pub fn insert_quote_put(&self, id: impl Into<String>, object: StoredObjectRef) {
        self.quote_puts.lock().cache_set(id.into(), object);
    }

    pub fn insert_transfer(&self, id: impl Into<String>, object: StoredObjectRef) {
        self.transfers.lock().cache_set(id.into(), object);
    }

    pub fn link_transfers(&self, outgoing_id: impl Into<String>, incoming_id: impl Into<String>) {
        self.transfer_links
            .lock()
            .cache_set(outgoing_id.into(), incoming_id.into());
    }

    /// (quotes, quote responses, transfers, transfer links)
    pub fn stats(&self) -> (usize, usize, usize, usize) {
        (
            self.quotes.lock().cache_size(),
            self.quote_puts.lock().cache_size(),
            self.transfers.lock().cache_size(),
            self.transfer_links.lock().cache_size(),
        )
    }
}

impl MessageRecorder for InMemoryObjectStore {
    /// Stores QuotePost, QuotePut and TransferPost; GETs, transfer
    /// fulfilments and errors are skipped.
    fn record(&self, message: &ProtocolMessage, source_peer_id: &str) -> bool {
        let object = StoredObjectRef {
            headers: message.headers.clone(),
            body: message.body.clone(),
            source_peer_id: source_peer_id.to_string(),
        };
        let id = message.object_id.clone();
        match message.kind {
            MessageKind::QuotePost => self.insert_quote(id, object),
            MessageKind::QuotePut => self.insert_quote_put(id, object),
            MessageKind::TransferPost => self.insert_transfer(id, object),
            _ => return false,
        }
        true
    }
}

fn lookup<V: Clone>(table: &Table<V>, id: &str) -> Option<V> {
    table.lock().cache_get(&id.to_string()).cloned()
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get_stored_transfer_by_id(&self, id: &str) -> StoreResult {
        Ok(lookup(&self.transfers, id))
    }

    async fn get_stored_quote_by_id(&self, id: &str) -> StoreResult {
        Ok(lookup(&self.quotes, id))
    }

    async fn get_stored_quote_put_by_id(&self, id: &str) -> StoreResult {
        Ok(lookup(&self.quote_puts, id))
    }

    async fn map_outgoing_transfer_to_incoming(&self, id: &str) -> StoreResult {
        // release the link table before touching the transfer table
        let incoming = lookup(&self.transfer_links, id);
        Ok(incoming.and_then(|incoming_id| lookup(&self.transfers, &incoming_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_record_and_lookup() {
        let store = InMemoryObjectStore::new();
        let quote = ProtocolMessage::new(
            "Q1",
            MessageKind::QuotePost,
            BTreeMap::new(),
            json!({ "amount": { "amount": "1", "currency": "USD" } }),
        );
        assert!(store.record(&quote, "alice"));

        let stored = store.get_stored_quote_by_id("Q1").await.unwrap().unwrap();
        assert_eq!(stored.source_peer_id, "alice");
        assert_eq!(stored.body["amount"]["currency"], "USD");
        assert!(store.get_stored_transfer_by_id("Q1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_errors_and_gets_are_not_recorded() {
        let store = InMemoryObjectStore::new();
        let msg = ProtocolMessage::new("Q1", MessageKind::QuoteError, BTreeMap::new(), json!({}));
        assert!(!store.record(&msg, "alice"));
        let msg = ProtocolMessage::new("T1", MessageKind::TransferGet, BTreeMap::new(), json!({}));
        assert!(!store.record(&msg, "alice"));
        assert_eq!(store.stats(), (0, 0, 0, 0));
    }

    #[tokio::test]
    async fn test_outgoing_transfer_maps_to_incoming() {
        let store = InMemoryObjectStore::new();
        store.insert_transfer("IN1", StoredObjectRef::new("alice", json!({ "transferId": "IN1" })));
        store.link_transfers("OUT1", "IN1");

        let found = store.map_outgoing_transfer_to_incoming("OUT1").await.unwrap().unwrap();
        assert_eq!(found.body["transferId"], "IN1");
        assert!(store.map_outgoing_transfer_to_incoming("IN1").await.unwrap().is_none());
    }

    fn quote(id: &str) -> ProtocolMessage {
        ProtocolMessage::new(
            id,
            MessageKind::QuotePost,
            BTreeMap::new(),
            json!({ "amount": { "amount": "1", "currency": "USD" } }),
        )
    }

    #[tokio::test]
    async fn test_oldest_entries_are_evicted_at_capacity() {
        let store = InMemoryObjectStore::with_limits(2, 60);
        for id in ["Q1", "Q2", "Q3"] {
            assert!(store.record(&quote(id), "alice"));
        }

        assert_eq!(store.stats(), (2, 0, 0, 0));
        assert!(store.get_stored_quote_by_id("Q1").await.unwrap().is_none());
        assert!(store.get_stored_quote_by_id("Q3").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let store = InMemoryObjectStore::with_limits(10, 1);
        store.record(&quote("Q1"), "alice");
        assert!(store.get_stored_quote_by_id("Q1").await.unwrap().is_some());

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        assert!(store.get_stored_quote_by_id("Q1").await.unwrap().is_none());
    }
}
