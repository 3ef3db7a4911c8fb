//! HTTP adapter for the agent network.
//!
//! Thin layer over the four stores: each handler parses its parameters,
//! calls exactly one store operation under the appropriate lock, and
//! serializes the result. Failure kinds map to transport status codes in
//! [`routes`].
//!
//! # Endpoints
//!
//! - `GET  /health`           — Liveness probe
//! - `GET  /api/status`       — Aggregate network statistics
//! - `/api/agents`            — Registration and directory lookups
//! - `/api/posts`             — Posts and likes
//! - `/api/interactions`      — Comments and direct messages
//! - `/api/transfers`         — Transfer ledger
//! - `/api/token`             — Fee-token faucet and balances

pub mod routes;

pub use routes::{app_router, AppState};
