//! Wiring from [`AppConfig`] to a ready-to-serve gateway state

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::dispatcher::{Dispatcher, ForwardReport};
use crate::endpoint::{HttpForwarder, PeerEndpoint};
use crate::gateway::state::AppState;
use crate::routing::EndpointRegistry;
use crate::store::InMemoryObjectStore;

/// Register one HTTP-forwarding endpoint per configured peer
pub fn build_registry(config: &AppConfig) -> anyhow::Result<EndpointRegistry> {
    let registry = EndpointRegistry::new();
    let timeout = Duration::from_millis(config.forwarder.timeout_ms);

    for peer in &config.peers {
        let key = peer.routing_key()?;
        let url = peer.parsed_url()?;
        let forwarder = HttpForwarder::new(url.clone(), timeout)
            .with_context(|| format!("Failed to build forwarder for {}", key))?;

        let endpoint = PeerEndpoint::from_url(url);
        endpoint.set_incoming_request_handler(forwarder);
        registry.set(&key, Arc::new(endpoint));
    }

    Ok(registry)
}

/// Build gateway state. The returned receiver yields one report per
/// completed forward and must be drained by the caller.
pub fn build_state(
    config: &AppConfig,
) -> anyhow::Result<(Arc<AppState>, mpsc::UnboundedReceiver<ForwardReport>)> {
    let registry = Arc::new(build_registry(config)?);
    let store = Arc::new(InMemoryObjectStore::with_limits(
        config.tracking.max_entries,
        config.tracking.ttl_secs,
    ));
    let (reports_tx, reports_rx) = mpsc::unbounded_channel();

    let mut dispatcher = Dispatcher::new(registry, store.clone()).with_reports(reports_tx);
    if config.track_requests {
        dispatcher = dispatcher.with_recorder(store);
    }

    Ok((Arc::new(AppState::new(Arc::new(dispatcher))), reports_rx))
}

/// Log every forward report until the dispatcher is dropped
pub async fn drain_reports(mut reports: mpsc::UnboundedReceiver<ForwardReport>) {
    while let Some(report) = reports.recv().await {
        match report.result {
            Ok(resp) => tracing::info!(
                routing_key = %report.routing_key,
                kind = %report.kind,
                object_id = %report.object_id,
                status = resp.status,
                "Peer accepted forward"
            ),
            Err(e) => tracing::error!(
                routing_key = %report.routing_key,
                kind = %report.kind,
                object_id = %report.object_id,
                code = e.code(),
                error = %e,
                "Peer forward failed"
            ),
        }
    }
}
