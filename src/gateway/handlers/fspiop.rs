//! FSPIOP message routes
//!
//! `POST /{peer_id}/quotes`, `PUT|GET /{peer_id}/quotes/{id}`,
//! `PUT /{peer_id}/quotes/{id}/error` and the same shapes for transfers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use super::super::state::AppState;
use crate::dispatcher::InboundRequest;

/// Header names are already lower case; values that are not visible ASCII
/// are dropped.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Empty bodies (GET) decode to `{}`; undecodable bodies become `null` and are
/// rejected by classification.
fn decode_body(body: &Bytes) -> Value {
    if body.is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Request body is not JSON");
        Value::Null
    })
}

/// Single entry point for every FSPIOP route
pub async fn route_message(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let peer_id = params.get("peer_id").cloned().unwrap_or_default();
    tracing::debug!(peer_id = %peer_id, %method, path = uri.path(), "Received request");

    let request = InboundRequest {
        peer_id,
        method,
        path: uri.path().to_string(),
        headers: collect_headers(&headers),
        body: decode_body(&body),
    };

    let outcome = state.dispatcher.dispatch(request).await;

    match outcome.body {
        Some(body) => (outcome.status, Json(body)).into_response(),
        None => outcome.status.into_response(),
    }
}
