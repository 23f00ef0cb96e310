//! Endpoint Registry
//!
//! Maps the table form of a [`RoutingKey`] to a shared [`PeerEndpoint`].
//! Uses DashMap so writes are atomic per key: a concurrent reader sees either
//! the old or the new `Arc`, never a partially built entry.

use std::sync::Arc;

use dashmap::DashMap;

use super::key::RoutingKey;
use crate::endpoint::PeerEndpoint;
use crate::error::DispatchError;

#[derive(Default)]
pub struct EndpointRegistry {
    /// "alice-usd" -> endpoint
    endpoints: DashMap<String, Arc<PeerEndpoint>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `endpoint` under `key`, replacing any previous entry
    pub fn set(&self, key: &RoutingKey, endpoint: Arc<PeerEndpoint>) {
        let table_key = key.to_table_key();
        let replaced = self.endpoints.insert(table_key.clone(), endpoint).is_some();
        tracing::info!(routing_key = %table_key, replaced, "Endpoint registered");
    }

    pub fn get(&self, key: &RoutingKey) -> Result<Arc<PeerEndpoint>, DispatchError> {
        let table_key = key.to_table_key();
        self.endpoints
            .get(&table_key)
            .map(|entry| entry.value().clone())
            .ok_or(DispatchError::EndpointNotFound(table_key))
    }

    /// Remove the entry for `key`. Removing an absent key is a no-op.
    pub fn remove(&self, key: &RoutingKey) -> Option<Arc<PeerEndpoint>> {
        let table_key = key.to_table_key();
        let removed = self.endpoints.remove(&table_key).map(|(_, endpoint)| endpoint);
        if removed.is_some() {
            tracing::info!(routing_key = %table_key, "Endpoint removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Registered table keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.endpoints.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}
