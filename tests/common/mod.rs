#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

use fspiop_router::gateway::{build_router, state::AppState};
use fspiop_router::{
    Dispatcher, EndpointRegistry, InMemoryObjectStore, PeerEndpoint, PeerResponse,
    ProtocolMessage, RoutingKey, handler_fn,
};

pub struct TestApp {
    pub router: Router,
    pub registry: Arc<EndpointRegistry>,
    pub store: Arc<InMemoryObjectStore>,
}

impl TestApp {
    /// Router over an empty registry, tracking accepted messages
    pub fn new() -> Self {
        let registry = Arc::new(EndpointRegistry::new());
        let store = Arc::new(InMemoryObjectStore::new());
        let dispatcher =
            Dispatcher::new(registry.clone(), store.clone()).with_recorder(store.clone());
        let state = AppState::new(Arc::new(dispatcher));
        Self {
            router: build_router(Arc::new(state)),
            registry,
            store,
        }
    }

    /// Register a recording endpoint under `participant`/`currency`
    pub fn register(
        &self,
        participant: &str,
        currency: &str,
    ) -> mpsc::UnboundedReceiver<ProtocolMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        let endpoint = PeerEndpoint::new(&format!("http://localhost:7781/{}", participant)).unwrap();
        endpoint.set_incoming_request_handler(handler_fn(move |msg: ProtocolMessage| {
            let _ = tx.send(msg);
            async { Ok(PeerResponse::accepted()) }
        }));
        self.registry.set(
            &RoutingKey::new(participant, currency).unwrap(),
            Arc::new(endpoint),
        );
        rx
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> StatusCode {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("fspiop-source", "alice")
            .header(
                "content-type",
                "application/vnd.interoperability.quotes+json;version=1.0",
            );
        let req = match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(req).await.unwrap().status()
    }
}

/// Wait for the next forwarded message
pub async fn received(rx: &mut mpsc::UnboundedReceiver<ProtocolMessage>) -> ProtocolMessage {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("endpoint handler not invoked")
        .expect("channel closed")
}

pub fn quote_post(quote_id: &str, currency: &str) -> Value {
    json!({
        "amount": { "amount": "100", "currency": currency },
        "amountType": "SEND",
        "transferCurrency": currency,
        "payee": { "partyIdInfo": { "partyIdType": "1", "partyIdentifier": "1" } },
        "payer": { "partyIdInfo": { "partyIdType": "1", "partyIdentifier": "1" } },
        "quoteId": quote_id,
        "transactionId": uuid::Uuid::new_v4().to_string(),
        "transactionType": { "initiator": "Payee", "initiatorType": "test", "scenario": "refund" }
    })
}

pub fn quote_put() -> Value {
    json!({
        "condition": "f5sqb7tBTWPd5Y8BDFdMm9BJR_MNI4isf8p8n4D5pHA",
        "expiration": "2016-05-24T08:38:08.699-04:00",
        "ilpPacket": "testpacket",
        "transferAmount": { "amount": "100", "currency": "USD" }
    })
}

pub fn transfer_post(transfer_id: &str, currency: &str) -> Value {
    json!({
        "transferId": transfer_id,
        "payerFsp": "alice",
        "payeeFsp": "bob",
        "amount": { "amount": "100", "currency": currency },
        "ilpPacket": "testpacket",
        "condition": "f5sqb7tBTWPd5Y8BDFdMm9BJR_MNI4isf8p8n4D5pHA",
        "expiration": "2016-05-24T08:38:08.699-04:00"
    })
}

pub fn transfer_put() -> Value {
    json!({
        "fulfilment": "WLctttbu2HvTsa1XWvUoGRcQozHsqeu9Ahl2JW9Bsu8",
        "completedTimestamp": "2016-05-24T08:38:08.699-04:00",
        "transferState": "COMMITTED"
    })
}

pub fn error_message() -> Value {
    json!({ "errorInformation": { "errorCode": "3100", "errorDescription": "test" } })
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
