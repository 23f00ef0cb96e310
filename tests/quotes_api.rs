mod common;

use axum::http::{Method, StatusCode};
use common::*;
use fspiop_router::{MessageKind, ObjectType, StoredObjectRef};

fn store_quote(app: &TestApp, quote_id: &str, currency: &str) {
    app.store.insert_quote(
        quote_id,
        StoredObjectRef::new("test-peer2", quote_post(quote_id, currency)),
    );
}

// ============================================================================
// POST /{peer}/quotes
// ============================================================================

#[tokio::test]
async fn post_quote_returns_202() {
    let app = TestApp::new();
    let _rx = app.register("alice", "USD");

    let status = app
        .send(Method::POST, "/alice/quotes", Some(quote_post(&new_id(), "USD")))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn post_quote_gives_endpoint_a_quote_post_message() {
    let app = TestApp::new();
    let mut rx = app.register("alice", "USD");
    let quote_id = new_id();

    let status = app
        .send(Method::POST, "/alice/quotes", Some(quote_post(&quote_id, "USD")))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let msg = received(&mut rx).await;
    assert_eq!(msg.kind, MessageKind::QuotePost);
    assert_eq!(msg.object_type(), ObjectType::Quote);
    assert_eq!(msg.object_id, quote_id);
    assert_eq!(msg.headers.get("fspiop-source").map(String::as_str), Some("alice"));
}

#[tokio::test]
async fn post_quote_returns_500_without_endpoint() {
    let app = TestApp::new();
    let status = app
        .send(Method::POST, "/alice/quotes", Some(quote_post(&new_id(), "USD")))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn post_quote_uses_amount_currency_to_pick_usd_endpoint() {
    let app = TestApp::new();
    let mut usd = app.register("alice", "USD");
    let mut xof = app.register("alice", "XOF");

    let status = app
        .send(Method::POST, "/alice/quotes", Some(quote_post(&new_id(), "USD")))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    received(&mut usd).await;
    tokio::task::yield_now().await;
    assert!(xof.try_recv().is_err());
}

#[tokio::test]
async fn post_quote_with_malformed_body_returns_500() {
    let app = TestApp::new();
    let mut rx = app.register("alice", "USD");
    let mut body = quote_post(&new_id(), "USD");
    body.as_object_mut().unwrap().remove("transactionType");

    let status = app.send(Method::POST, "/alice/quotes", Some(body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(rx.try_recv().is_err());
}

// ============================================================================
// PUT /{peer}/quotes/{id}
// ============================================================================

#[tokio::test]
async fn put_quote_returns_202_and_keeps_object_id() {
    let app = TestApp::new();
    let mut rx = app.register("alice", "USD");
    let quote_id = new_id();
    store_quote(&app, &quote_id, "USD");

    let status = app
        .send(Method::PUT, &format!("/alice/quotes/{}", quote_id), Some(quote_put()))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let msg = received(&mut rx).await;
    assert_eq!(msg.kind, MessageKind::QuotePut);
    assert_eq!(msg.object_id, quote_id);
}

#[tokio::test]
async fn put_quote_returns_500_without_endpoint() {
    let app = TestApp::new();
    let quote_id = new_id();
    store_quote(&app, &quote_id, "USD");

    let status = app
        .send(Method::PUT, &format!("/alice/quotes/{}", quote_id), Some(quote_put()))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn put_quote_correlates_with_a_quote_posted_earlier() {
    let app = TestApp::new();
    let mut alice = app.register("alice", "USD");
    let mut bob = app.register("bob", "USD");
    let quote_id = new_id();

    // the request is tracked on its way through
    let status = app
        .send(Method::POST, "/bob/quotes", Some(quote_post(&quote_id, "USD")))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    received(&mut bob).await;

    let status = app
        .send(Method::PUT, &format!("/alice/quotes/{}", quote_id), Some(quote_put()))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(received(&mut alice).await.object_id, quote_id);
}

// ============================================================================
// GET /{peer}/quotes/{id}
// ============================================================================

#[tokio::test]
async fn get_quote_returns_202_with_quote_get_message() {
    let app = TestApp::new();
    let mut rx = app.register("alice", "USD");
    let quote_id = new_id();
    store_quote(&app, &quote_id, "USD");

    let status = app
        .send(Method::GET, &format!("/alice/quotes/{}", quote_id), None)
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(received(&mut rx).await.kind, MessageKind::QuoteGet);
}

#[tokio::test]
async fn get_quote_returns_500_for_unknown_quote() {
    let app = TestApp::new();
    let _rx = app.register("alice", "USD");

    let status = app
        .send(Method::GET, &format!("/alice/quotes/{}", new_id()), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// PUT /{peer}/quotes/{id}/error
// ============================================================================

#[tokio::test]
async fn put_quote_error_gives_endpoint_the_error() {
    let app = TestApp::new();
    let mut rx = app.register("alice", "USD");
    let quote_id = new_id();
    store_quote(&app, &quote_id, "USD");

    let status = app
        .send(
            Method::PUT,
            &format!("/alice/quotes/{}/error", quote_id),
            Some(error_message()),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let msg = received(&mut rx).await;
    assert_eq!(msg.kind, MessageKind::QuoteError);
    assert_eq!(msg.object_type(), ObjectType::QuoteError);
    assert_eq!(msg.object_id, quote_id);
    assert_eq!(msg.body, error_message());
}

#[tokio::test]
async fn put_quote_error_uses_stored_quote_currency() {
    let app = TestApp::new();
    let mut usd = app.register("alice", "USD");
    let mut xof = app.register("alice", "XOF");
    let quote_id = new_id();
    store_quote(&app, &quote_id, "XOF");

    let status = app
        .send(
            Method::PUT,
            &format!("/alice/quotes/{}/error", quote_id),
            Some(error_message()),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    received(&mut xof).await;
    tokio::task::yield_now().await;
    assert!(usd.try_recv().is_err());
}

#[tokio::test]
async fn put_quote_error_returns_500_without_correlation() {
    let app = TestApp::new();
    let mut rx = app.register("alice", "USD");

    let status = app
        .send(
            Method::PUT,
            &format!("/alice/quotes/{}/error", new_id()),
            Some(error_message()),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(rx.try_recv().is_err());
}

// ============================================================================
// Percent-encoded paths
// ============================================================================

#[tokio::test]
async fn post_quote_accepts_percent_encoded_participant() {
    let app = TestApp::new();
    let mut rx = app.register("test-peer1", "USD");

    let status = app
        .send(
            Method::POST,
            "/test%2Dpeer1/quotes",
            Some(quote_post(&new_id(), "USD")),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(received(&mut rx).await.kind, MessageKind::QuotePost);
}

#[tokio::test]
async fn put_quote_error_correlates_percent_encoded_id() {
    let app = TestApp::new();
    let mut rx = app.register("alice", "USD");
    store_quote(&app, "quote 1", "USD");

    let status = app
        .send(Method::PUT, "/alice/quotes/quote%201/error", Some(error_message()))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(received(&mut rx).await.object_id, "quote 1");
}
