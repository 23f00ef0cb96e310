//! Peer Endpoint
//!
//! A [`PeerEndpoint`] wraps one peer base URL and a single replaceable
//! [`IncomingRequestHandler`]. Whoever owns peer connectivity creates the
//! endpoint and installs its handler; the registry only holds an `Arc`.

pub mod http;

pub use http::HttpForwarder;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::EndpointError;
use crate::protocol::ProtocolMessage;

/// What a peer answered to a forwarded message
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeerResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl PeerResponse {
    pub fn accepted() -> Self {
        Self {
            status: 202,
            body: None,
        }
    }
}

/// Capability invoked when a message is routed to a peer
#[async_trait]
pub trait IncomingRequestHandler: Send + Sync {
    async fn handle(&self, message: ProtocolMessage) -> Result<PeerResponse, EndpointError>;
}

/// Adapts an async closure into an [`IncomingRequestHandler`]
pub struct FnHandler<F>(F);

/// Build a handler from `Fn(ProtocolMessage) -> impl Future<Output = Result<..>>`
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(ProtocolMessage) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PeerResponse, EndpointError>> + Send + 'static,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> IncomingRequestHandler for FnHandler<F>
where
    F: Fn(ProtocolMessage) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PeerResponse, EndpointError>> + Send + 'static,
{
    async fn handle(&self, message: ProtocolMessage) -> Result<PeerResponse, EndpointError> {
        (self.0)(message).await
    }
}

/// One outbound peer connection
pub struct PeerEndpoint {
    url: Url,
    /// Single slot: setting a handler replaces the previous one
    handler: RwLock<Option<Arc<dyn IncomingRequestHandler>>>,
}

impl PeerEndpoint {
    pub fn new(url: &str) -> Result<Self, EndpointError> {
        let url = Url::parse(url).map_err(|e| EndpointError::InvalidUrl(format!("{}: {}", url, e)))?;
        Ok(Self::from_url(url))
    }

    pub fn from_url(url: Url) -> Self {
        Self {
            url,
            handler: RwLock::new(None),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Install `handler`, discarding whichever one was active
    pub fn set_incoming_request_handler<H>(&self, handler: H)
    where
        H: IncomingRequestHandler + 'static,
    {
        self.set_shared_handler(Arc::new(handler));
    }

    pub fn set_shared_handler(&self, handler: Arc<dyn IncomingRequestHandler>) {
        *self.handler.write() = Some(handler);
    }

    pub fn clear_incoming_request_handler(&self) {
        *self.handler.write() = None;
    }

    /// Snapshot of the active handler.
    ///
    /// The lock is released before the caller can await on the handler.
    pub fn handler(&self) -> Option<Arc<dyn IncomingRequestHandler>> {
        self.handler.read().clone()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.read().is_some()
    }

    pub async fn handle_incoming_request(
        &self,
        message: ProtocolMessage,
    ) -> Result<PeerResponse, EndpointError> {
        let handler = self.handler().ok_or(EndpointError::NoHandlerConfigured)?;
        handler.handle(message).await
    }
}

impl fmt::Debug for PeerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerEndpoint")
            .field("url", &self.url.as_str())
            .field("has_handler", &self.has_handler())
            .finish()
    }
}
