//! HTTP forwarder
//!
//! [`IncomingRequestHandler`] that re-issues a routed message to the peer's
//! FSPIOP API under its base URL.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::Method;
use tracing::debug;
use url::Url;

use super::{IncomingRequestHandler, PeerResponse};
use crate::error::EndpointError;
use crate::protocol::{MessageKind, ProtocolMessage};

/// Headers copied onto the outbound request besides `fspiop-*`
const PASSTHROUGH_HEADERS: [&str; 3] = ["content-type", "accept", "date"];

pub struct HttpForwarder {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpForwarder {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, EndpointError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EndpointError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Target url for `message`, e.g. `{base}/quotes/{id}/error`
    pub fn target_url(&self, message: &ProtocolMessage) -> Result<Url, EndpointError> {
        self.base_url
            .join(&message.relative_path())
            .map_err(|e| EndpointError::InvalidUrl(e.to_string()))
    }
}

/// `Url::join` replaces the last segment unless the base ends in `/`
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn method_for(kind: MessageKind) -> Method {
    match kind {
        MessageKind::QuotePost | MessageKind::TransferPost => Method::POST,
        MessageKind::QuoteGet | MessageKind::TransferGet => Method::GET,
        MessageKind::QuotePut
        | MessageKind::QuoteError
        | MessageKind::TransferPut
        | MessageKind::TransferError => Method::PUT,
    }
}

fn is_forwarded_header(name: &str) -> bool {
    name.starts_with("fspiop-") || PASSTHROUGH_HEADERS.contains(&name)
}

#[async_trait]
impl IncomingRequestHandler for HttpForwarder {
    async fn handle(&self, message: ProtocolMessage) -> Result<PeerResponse, EndpointError> {
        let url = self.target_url(&message)?;
        let method = method_for(message.kind);
        debug!(%url, %method, object_id = %message.object_id, "Forwarding to peer");

        let mut request = self.client.request(method.clone(), url);
        for (name, value) in &message.headers {
            if is_forwarded_header(name) {
                request = request.header(name.as_str(), value.as_str());
            }
        }
        if method != Method::GET {
            request = request.json(&message.body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EndpointError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(PeerResponse {
            status: status.as_u16(),
            body: None,
        })
    }
}
