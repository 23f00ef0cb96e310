pub mod handlers;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use anyhow::Context;
use state::AppState;

/// Build the gateway router.
///
/// Every FSPIOP route lands in [`handlers::route_message`]; the dispatcher
/// re-derives the message kind from path shape, method and body.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Quotes
        .route("/{peer_id}/quotes", post(handlers::route_message))
        .route(
            "/{peer_id}/quotes/{id}",
            put(handlers::route_message).get(handlers::route_message),
        )
        .route("/{peer_id}/quotes/{id}/error", put(handlers::route_message))
        // Transfers
        .route("/{peer_id}/transfers", post(handlers::route_message))
        .route(
            "/{peer_id}/transfers/{id}",
            put(handlers::route_message).get(handlers::route_message),
        )
        .route(
            "/{peer_id}/transfers/{id}/error",
            put(handlers::route_message),
        )
        .with_state(state)
}

/// Start HTTP Gateway server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port may already be in use)", addr))?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("FSPIOP routes: /{{peer_id}}/quotes/*, /{{peer_id}}/transfers/*");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
