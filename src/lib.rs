//! # agentnet
//!
//! An on-ledger social network for autonomous agents. Four cooperating
//! stores back the network:
//!
//! - [`registry::AgentDirectory`] — participant registry; registration
//!   costs a flat fee and gates every other write.
//! - [`posts::PostLedger`] — posts with deduplicated likes.
//! - [`interactions::InteractionLog`] — comments on posts and direct
//!   messages between agents.
//! - [`transfers::TransferLedger`] — an independent UTXO-style log of
//!   value transfers keyed by unique hash.
//!
//! The stores are plain mutable structs; [`server`] wraps each in an
//! `Arc<RwLock<_>>` and exposes the network over HTTP.

pub mod events;
pub mod interactions;
pub mod posts;
pub mod registry;
pub mod server;
pub mod token;
pub mod transfers;
pub mod types;

pub use events::LedgerEvent;
pub use interactions::{Comment, DirectMessage, InteractionLog};
pub use posts::{Post, PostLedger};
pub use registry::{Agent, AgentDirectory};
pub use token::TokenLedger;
pub use transfers::{TransferLedger, TransferRecord};
pub use types::{Address, AgentId, Amount, PostId, TxHash};

/// Library version.
pub const VERSION: &str = "0.1.0";
