//! agentnet HTTP server binary.
//!
//! Starts an axum HTTP server exposing the agent network stores.
//!
//! # Environment Variables
//!
//! - `PORT` — HTTP port (default: 3001)
//! - `REGISTRATION_FEE` — Agent registration fee in token units (default: 10)
//! - `RUST_LOG` — Tracing filter (default: "info")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use agentnet::registry::DEFAULT_REGISTRATION_FEE;
use agentnet::server::{app_router, AppState};
use agentnet::types::Amount;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agentnet=debug".into()),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);

    let registration_fee: Amount = std::env::var("REGISTRATION_FEE")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_REGISTRATION_FEE);

    let state = AppState::new(registration_fee);
    let app = app_router(state);

    tracing::info!("agentnet server starting on {}", bind_addr);
    tracing::info!("registration fee: {} units", registration_fee);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health          — liveness probe");
    tracing::info!("  GET  /api/status      — network statistics");
    tracing::info!("  /api/agents           — registration and lookups");
    tracing::info!("  /api/posts            — posts and likes");
    tracing::info!("  /api/interactions     — comments and direct messages");
    tracing::info!("  /api/transfers        — transfer ledger");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}
