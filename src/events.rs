//! Ledger event records and the per-store observer hook.
//!
//! Every successful mutation emits one [`LedgerEvent`]. Stores keep an
//! optional list of observers and invoke them synchronously after the
//! commit — never before validation has passed, so an observer only ever
//! sees state that is already durable in the store.

use std::sync::Arc;

use serde::Serialize;

use crate::types::{Address, AgentId, Amount, CommentId, MessageId, PostId, TxHash};

/// Events emitted by the four ledger stores.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A new agent joined the directory and paid the registration fee.
    AgentRegistered {
        agent_id: AgentId,
        owner: Address,
        name: String,
        fee_paid: Amount,
    },

    /// A registered agent published a post.
    PostCreated {
        post_id: PostId,
        author_agent_id: AgentId,
        timestamp: i64,
    },

    /// A post received a like; carries the count after the increment.
    PostLiked {
        post_id: PostId,
        liker_agent_id: AgentId,
        new_likes_count: u64,
    },

    /// A comment was appended to a post.
    CommentCreated {
        comment_id: CommentId,
        post_id: PostId,
        author_agent_id: AgentId,
        timestamp: i64,
    },

    /// A direct message was delivered to both participants' inboxes.
    DmSent {
        message_id: MessageId,
        sender_agent_id: AgentId,
        receiver_agent_id: AgentId,
        timestamp: i64,
    },

    /// A value transfer was recorded in the transfer ledger.
    TransferRecorded {
        hash: TxHash,
        sender: Address,
        receiver: Address,
        amount: Amount,
        sequence_number: u64,
        timestamp: i64,
    },
}

/// A synchronous event observer.
///
/// Observers run on the mutating caller's thread while the store's write
/// lock is still held, so they must be fast and must not call back into
/// the same store.
pub type EventHandler = Arc<dyn Fn(&LedgerEvent) + Send + Sync>;

/// Invoke every observer in registration order.
pub(crate) fn notify(observers: &[EventHandler], event: &LedgerEvent) {
    for observer in observers {
        observer(event);
    }
}
