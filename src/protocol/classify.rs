//! Message Classifier
//!
//! Pure functions mapping `(path, method, body)` to a [`ProtocolMessage`].
//! The path decides the candidate kind; the body must then pass that kind's
//! discriminator or the message is rejected as malformed.

use std::borrow::Cow;
use std::collections::BTreeMap;

use axum::http::Method;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::Value;

use super::message::{MessageKind, ProtocolMessage};
use super::models::{
    ErrorInformationObject, QuotesIdPutResponse, QuotesPostRequest, TransfersIdPutResponse,
    TransfersPostRequest,
};
use crate::error::DispatchError;

/// Result of classification: the participant segment plus the message
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub peer_id: String,
    pub message: ProtocolMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resource {
    Quotes,
    Transfers,
}

impl Resource {
    fn parse(segment: &str) -> Option<Self> {
        match segment {
            "quotes" => Some(Resource::Quotes),
            "transfers" => Some(Resource::Transfers),
            _ => None,
        }
    }
}

/// Decide the message kind from path shape and method.
///
/// Returns the kind and, for id-addressed routes, the id taken from the path.
fn kind_for_route<'a>(
    resource: Resource,
    rest: &[&'a str],
    method: &Method,
) -> Result<(MessageKind, Option<&'a str>), DispatchError> {
    use MessageKind::*;

    let kind = match (resource, rest, method) {
        (Resource::Quotes, [], m) if m == Method::POST => (QuotePost, None),
        (Resource::Quotes, [id], m) if m == Method::PUT => (QuotePut, Some(*id)),
        (Resource::Quotes, [id], m) if m == Method::GET => (QuoteGet, Some(*id)),
        (Resource::Quotes, [id, "error"], m) if m == Method::PUT => (QuoteError, Some(*id)),
        (Resource::Transfers, [], m) if m == Method::POST => (TransferPost, None),
        (Resource::Transfers, [id], m) if m == Method::PUT => (TransferPut, Some(*id)),
        (Resource::Transfers, [id], m) if m == Method::GET => (TransferGet, Some(*id)),
        (Resource::Transfers, [id, "error"], m) if m == Method::PUT => {
            (TransferError, Some(*id))
        }
        _ => {
            return Err(DispatchError::malformed(format!(
                "unsupported route: {} {:?}/{}",
                method,
                resource,
                rest.join("/")
            )));
        }
    };
    Ok(kind)
}

fn check_body<'de, T: Deserialize<'de>>(
    kind: MessageKind,
    body: &'de Value,
) -> Result<T, DispatchError> {
    T::deserialize(body)
        .map_err(|e| DispatchError::malformed(format!("{} body rejected: {}", kind, e)))
}

/// Run the discriminator for `kind`, returning the object id carried in the
/// body (only POST bodies carry one).
fn discriminate(kind: MessageKind, body: &Value) -> Result<Option<String>, DispatchError> {
    match kind {
        MessageKind::QuotePost => {
            let quote: QuotesPostRequest = check_body(kind, body)?;
            Ok(Some(quote.quote_id))
        }
        MessageKind::TransferPost => {
            let transfer: TransfersPostRequest = check_body(kind, body)?;
            Ok(Some(transfer.transfer_id))
        }
        MessageKind::QuotePut => {
            check_body::<QuotesIdPutResponse>(kind, body)?;
            Ok(None)
        }
        MessageKind::TransferPut => {
            check_body::<TransfersIdPutResponse>(kind, body)?;
            Ok(None)
        }
        MessageKind::QuoteError | MessageKind::TransferError => {
            check_body::<ErrorInformationObject>(kind, body)?;
            Ok(None)
        }
        // GET requests carry no body worth checking
        MessageKind::QuoteGet | MessageKind::TransferGet => Ok(None),
    }
}

/// Split on `/` first, then decode, so an encoded `/` stays inside its segment
fn decode_segment(segment: &str) -> Result<Cow<'_, str>, DispatchError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map_err(|e| DispatchError::malformed(format!("path segment {} is not UTF-8: {}", segment, e)))
}

/// Classify an inbound request.
///
/// `path` is the full request path including the leading participant
/// segment, e.g. `/alice/quotes/{id}/error`. Segments may be
/// percent-encoded; the participant and object id are returned decoded.
pub fn classify(
    path: &str,
    method: &Method,
    headers: BTreeMap<String, String>,
    body: Value,
) -> Result<Classified, DispatchError> {
    let decoded = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(decode_segment)
        .collect::<Result<Vec<_>, _>>()?;
    let segments: Vec<&str> = decoded.iter().map(|s| s.as_ref()).collect();

    let (peer_id, resource, rest) = match segments.as_slice() {
        [peer_id, resource, rest @ ..] => {
            let resource = Resource::parse(resource).ok_or_else(|| {
                DispatchError::malformed(format!("unknown resource in path {}", path))
            })?;
            (*peer_id, resource, rest)
        }
        _ => return Err(DispatchError::malformed(format!("path too short: {}", path))),
    };

    let (kind, path_id) = kind_for_route(resource, rest, method)?;
    let body_id = discriminate(kind, &body)?;

    let object_id = match (path_id, body_id) {
        (Some(id), _) => id.to_string(),
        (None, Some(id)) => id,
        (None, None) => {
            return Err(DispatchError::malformed(format!("{} without object id", kind)));
        }
    };
    if object_id.trim().is_empty() {
        return Err(DispatchError::malformed(format!("{} with empty object id", kind)));
    }

    Ok(Classified {
        peer_id: peer_id.to_string(),
        message: ProtocolMessage::new(object_id, kind, headers, body),
    })
}
