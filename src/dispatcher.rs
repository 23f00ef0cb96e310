//! Dispatcher
//!
//! Drives one inbound request through the routing pipeline:
//!
//! ```text
//! Received → Classified → Resolved → EndpointFound → Forwarded → Acknowledged
//!     └──────────┴────────────┴────────────┴─────────────▶ Failed (500)
//! ```
//!
//! Forwarding is fire-and-forget: the peer handler runs in a detached task and
//! the caller is acknowledged without waiting for it. Every check that can
//! fail runs before the task is spawned, so a failed request never leaves a
//! forwarding side effect behind. An optional [`MessageRecorder`] sees each
//! accepted message before its forward starts, so a fast peer callback can
//! already be correlated.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::http::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::endpoint::{IncomingRequestHandler, PeerResponse};
use crate::error::{DispatchError, EndpointError};
use crate::protocol::{MessageKind, ProtocolMessage, classify};
use crate::routing::{EndpointRegistry, RoutingKey, RoutingResolver};
use crate::store::{MessageRecorder, ObjectStore};

// ============================================================================
// Request / Outcome Types
// ============================================================================

/// One inbound call as handed over by the transport
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// Participant segment the transport matched
    pub peer_id: String,
    pub method: Method,
    /// Full request path, e.g. `/alice/quotes/{id}/error`
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

/// A message handed to exactly one endpoint
#[derive(Debug, Clone)]
pub struct Accepted {
    pub routing_key: RoutingKey,
    pub message: ProtocolMessage,
}

#[derive(Debug)]
pub struct DispatchOutcome {
    pub status: StatusCode,
    pub body: Option<Value>,
    /// Present only when `status` is 202
    pub accepted: Option<Accepted>,
}

/// Completion of a detached forward
#[derive(Debug, Clone)]
pub struct ForwardReport {
    pub routing_key: RoutingKey,
    pub kind: MessageKind,
    pub object_id: String,
    pub result: Result<PeerResponse, EndpointError>,
}

pub type ForwardReportSender = mpsc::UnboundedSender<ForwardReport>;

// ============================================================================
// Stats
// ============================================================================

#[derive(Debug, Default)]
pub struct DispatchStats {
    pub received: AtomicU64,
    pub accepted: AtomicU64,
    pub malformed: AtomicU64,
    pub correlation_not_found: AtomicU64,
    pub correlation_lookup_failed: AtomicU64,
    pub unresolved_key: AtomicU64,
    pub endpoint_not_found: AtomicU64,
    pub no_handler: AtomicU64,
    pub forwards_succeeded: AtomicU64,
    pub forwards_failed: AtomicU64,
}

impl DispatchStats {
    fn record_failure(&self, err: &DispatchError) {
        let counter = match err {
            DispatchError::MalformedMessage(_) => &self.malformed,
            DispatchError::CorrelationNotFound { .. } => &self.correlation_not_found,
            DispatchError::CorrelationLookupFailed(_) => &self.correlation_lookup_failed,
            DispatchError::UnresolvedRoutingKey(_) => &self.unresolved_key,
            DispatchError::EndpointNotFound(_) => &self.endpoint_not_found,
            DispatchError::NoHandlerConfigured(_) => &self.no_handler,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchStatsSnapshot {
        DispatchStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            correlation_not_found: self.correlation_not_found.load(Ordering::Relaxed),
            correlation_lookup_failed: self.correlation_lookup_failed.load(Ordering::Relaxed),
            unresolved_key: self.unresolved_key.load(Ordering::Relaxed),
            endpoint_not_found: self.endpoint_not_found.load(Ordering::Relaxed),
            no_handler: self.no_handler.load(Ordering::Relaxed),
            forwards_succeeded: self.forwards_succeeded.load(Ordering::Relaxed),
            forwards_failed: self.forwards_failed.load(Ordering::Relaxed),
        }
    }
}

/// Immutable snapshot of stats (for reporting)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStatsSnapshot {
    pub received: u64,
    pub accepted: u64,
    pub malformed: u64,
    pub correlation_not_found: u64,
    pub correlation_lookup_failed: u64,
    pub unresolved_key: u64,
    pub endpoint_not_found: u64,
    pub no_handler: u64,
    pub forwards_succeeded: u64,
    pub forwards_failed: u64,
}

// ============================================================================
// Dispatcher
// ============================================================================

pub struct Dispatcher {
    registry: Arc<EndpointRegistry>,
    resolver: RoutingResolver,
    stats: Arc<DispatchStats>,
    reports: Option<ForwardReportSender>,
    recorder: Option<Arc<dyn MessageRecorder>>,
}

impl Dispatcher {
    pub fn new(registry: Arc<EndpointRegistry>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            registry,
            resolver: RoutingResolver::new(store),
            stats: Arc::new(DispatchStats::default()),
            reports: None,
            recorder: None,
        }
    }

    /// Publish a [`ForwardReport`] for every completed forward
    pub fn with_reports(mut self, reports: ForwardReportSender) -> Self {
        self.reports = Some(reports);
        self
    }

    /// Record every accepted message before it is forwarded
    pub fn with_recorder(mut self, recorder: Arc<dyn MessageRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn tracks_requests(&self) -> bool {
        self.recorder.is_some()
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> DispatchStatsSnapshot {
        self.stats.snapshot()
    }

    /// Dispatch and map the result to the transport-level answer.
    ///
    /// Every failure kind yields the same status; the kind and stage are only
    /// visible in logs and [`DispatchStats`].
    pub async fn dispatch(&self, request: InboundRequest) -> DispatchOutcome {
        self.stats.received.fetch_add(1, Ordering::Relaxed);
        let peer_id = request.peer_id.clone();
        let method = request.method.clone();
        let path = request.path.clone();

        match self.try_dispatch(request).await {
            Ok(accepted) => {
                self.stats.accepted.fetch_add(1, Ordering::Relaxed);
                info!(
                    peer_id = %peer_id,
                    kind = %accepted.message.kind,
                    object_id = %accepted.message.object_id,
                    routing_key = %accepted.routing_key,
                    "Message dispatched"
                );
                DispatchOutcome {
                    status: StatusCode::ACCEPTED,
                    body: None,
                    accepted: Some(accepted),
                }
            }
            Err(err) => {
                self.stats.record_failure(&err);
                warn!(
                    peer_id = %peer_id,
                    %method,
                    path = %path,
                    stage = %err.stage(),
                    code = err.code(),
                    error = %err,
                    "Dispatch failed"
                );
                DispatchOutcome {
                    status: StatusCode::from_u16(err.http_status())
                        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    body: None,
                    accepted: None,
                }
            }
        }
    }

    /// Run the pipeline, returning the failing kind on error
    pub async fn try_dispatch(&self, request: InboundRequest) -> Result<Accepted, DispatchError> {
        let classified = classify(&request.path, &request.method, request.headers, request.body)?;
        if classified.peer_id != request.peer_id {
            return Err(DispatchError::malformed(format!(
                "path participant {} does not match {}",
                classified.peer_id, request.peer_id
            )));
        }
        let message = classified.message;

        let routing_key = self.resolver.resolve(&message, &request.peer_id).await?;
        let endpoint = self.registry.get(&routing_key)?;

        // take the handler now so a missing one fails before any side effect
        let handler = endpoint
            .handler()
            .ok_or_else(|| DispatchError::NoHandlerConfigured(routing_key.to_table_key()))?;

        if let Some(recorder) = &self.recorder
            && recorder.record(&message, &request.peer_id)
        {
            debug!(
                object_id = %message.object_id,
                kind = %message.kind,
                "Tracked message for correlation"
            );
        }

        self.spawn_forward(handler, routing_key.clone(), message.clone());

        Ok(Accepted {
            routing_key,
            message,
        })
    }

    fn spawn_forward(
        &self,
        handler: Arc<dyn IncomingRequestHandler>,
        routing_key: RoutingKey,
        message: ProtocolMessage,
    ) {
        let stats = self.stats.clone();
        let reports = self.reports.clone();
        let kind = message.kind;
        let object_id = message.object_id.clone();

        tokio::spawn(async move {
            let result = handler.handle(message).await;
            match &result {
                Ok(resp) => {
                    stats.forwards_succeeded.fetch_add(1, Ordering::Relaxed);
                    debug!(routing_key = %routing_key, %kind, object_id = %object_id, status = resp.status, "Forward completed");
                }
                Err(e) => {
                    stats.forwards_failed.fetch_add(1, Ordering::Relaxed);
                    warn!(routing_key = %routing_key, %kind, object_id = %object_id, code = e.code(), error = %e, "Forward failed");
                }
            }
            if let Some(reports) = reports {
                // receiver may be gone during shutdown
                let _ = reports.send(ForwardReport {
                    routing_key,
                    kind,
                    object_id,
                    result,
                });
            }
        });
    }
}
