//! Dispatch Error Types
//!
//! Every failure kind stays distinguishable for logs and counters, while the
//! transport boundary collapses all of them into one status code.

use thiserror::Error;

use crate::protocol::MessageKind;

/// Pipeline stage at which a dispatch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    Classify,
    Resolve,
    Lookup,
    Forward,
}

impl DispatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStage::Classify => "classify",
            DispatchStage::Resolve => "resolve",
            DispatchStage::Lookup => "lookup",
            DispatchStage::Forward => "forward",
        }
    }
}

impl std::fmt::Display for DispatchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatch error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("No stored object correlates with {kind} {object_id}")]
    CorrelationNotFound { kind: MessageKind, object_id: String },

    #[error("Correlation lookup failed: {0}")]
    CorrelationLookupFailed(String),

    #[error("Routing key could not be resolved: {0}")]
    UnresolvedRoutingKey(String),

    #[error("No endpoint registered for {0}")]
    EndpointNotFound(String),

    #[error("Endpoint {0} has no incoming request handler")]
    NoHandlerConfigured(String),
}

impl DispatchError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        DispatchError::MalformedMessage(msg.into())
    }

    /// Stable error code for logs and counters
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::MalformedMessage(_) => "MALFORMED_MESSAGE",
            DispatchError::CorrelationNotFound { .. } => "CORRELATION_NOT_FOUND",
            DispatchError::CorrelationLookupFailed(_) => "CORRELATION_LOOKUP_FAILED",
            DispatchError::UnresolvedRoutingKey(_) => "UNRESOLVED_ROUTING_KEY",
            DispatchError::EndpointNotFound(_) => "ENDPOINT_NOT_FOUND",
            DispatchError::NoHandlerConfigured(_) => "NO_HANDLER_CONFIGURED",
        }
    }

    pub fn stage(&self) -> DispatchStage {
        match self {
            DispatchError::MalformedMessage(_) => DispatchStage::Classify,
            DispatchError::CorrelationNotFound { .. }
            | DispatchError::CorrelationLookupFailed(_)
            | DispatchError::UnresolvedRoutingKey(_) => DispatchStage::Resolve,
            DispatchError::EndpointNotFound(_) => DispatchStage::Lookup,
            DispatchError::NoHandlerConfigured(_) => DispatchStage::Forward,
        }
    }

    /// HTTP status returned to the caller. Identical for every kind.
    pub fn http_status(&self) -> u16 {
        500
    }
}

/// Errors raised on the peer side of a forward
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("No incoming request handler configured")]
    NoHandlerConfigured,

    #[error("Invalid endpoint url: {0}")]
    InvalidUrl(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Peer rejected request with status {status}")]
    Rejected { status: u16 },
}

impl EndpointError {
    pub fn code(&self) -> &'static str {
        match self {
            EndpointError::NoHandlerConfigured => "NO_HANDLER_CONFIGURED",
            EndpointError::InvalidUrl(_) => "INVALID_URL",
            EndpointError::Transport(_) => "TRANSPORT_ERROR",
            EndpointError::Rejected { .. } => "PEER_REJECTED",
        }
    }
}

impl From<reqwest::Error> for EndpointError {
    fn from(e: reqwest::Error) -> Self {
        EndpointError::Transport(e.to_string())
    }
}
