//! fspiop_router - FSPIOP routing gateway
//!
//! ```text
//! ┌──────────┐    ┌────────────┐    ┌──────────┐    ┌──────────────┐
//! │ Gateway  │───▶│ Dispatcher │───▶│ Registry │───▶│ PeerEndpoint │──▶ peer
//! │ (axum)   │    │ (classify, │    │ (p, ccy) │    │ (forwarder)  │
//! └──────────┘    │  resolve)  │    └──────────┘    └──────────────┘
//!                 └────────────┘
//! ```
//!
//! Usage: `fspiop_router [--env dev] [--port 7780]`

use fspiop_router::bootstrap::{build_state, drain_reports};
use fspiop_router::config::AppConfig;
use fspiop_router::gateway::run_server;
use fspiop_router::logging::init_logging;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        config.gateway.port = port;
    }
    let _log_guard = init_logging(&config.logging);

    tracing::info!(
        env = %env,
        peers = config.peers.len(),
        track_requests = config.track_requests,
        "Starting fspiop_router"
    );

    let (state, reports) = build_state(&config)?;
    tokio::spawn(drain_reports(reports));

    run_server(&config.gateway.host, config.gateway.port, state).await
}
