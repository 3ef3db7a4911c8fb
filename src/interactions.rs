//! Interaction log: comments on posts and direct messages between agents.
//!
//! Comments and DMs are append-only and immutable once created. Each DM
//! is stored once; both participants' inbox views reference the same
//! canonical record.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::{notify, EventHandler, LedgerEvent};
use crate::posts::PostLedger;
use crate::registry::AgentDirectory;
use crate::types::{now_timestamp, AgentId, CommentId, MessageId, PostId};

/// A comment appended to a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_agent_id: AgentId,
    pub content: String,
    /// Unix seconds at creation.
    pub created_at: i64,
}

/// A direct message between two distinct agents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectMessage {
    pub id: MessageId,
    pub sender_agent_id: AgentId,
    pub receiver_agent_id: AgentId,
    pub content: String,
    /// Unix seconds at creation.
    pub created_at: i64,
}

/// Interaction log operation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InteractionError {
    /// The referenced agent is not in the directory.
    #[error("agent {0} is not registered")]
    AgentNotRegistered(AgentId),

    /// No post under that id.
    #[error("post {0} not found")]
    PostNotFound(PostId),

    /// Content must be non-empty (whitespace counts as content).
    #[error("content cannot be empty")]
    EmptyContent,

    /// An agent cannot message itself.
    #[error("agent {0} cannot send a message to itself")]
    SelfMessage(AgentId),
}

/// Append-only store of comments (grouped by post) and DMs (indexed
/// under both participants).
pub struct InteractionLog {
    comments: Vec<Comment>,
    comments_by_post: HashMap<PostId, Vec<usize>>,
    messages: Vec<DirectMessage>,
    inbox: HashMap<AgentId, Vec<usize>>,
    observers: Vec<EventHandler>,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self {
            comments: Vec::new(),
            comments_by_post: HashMap::new(),
            messages: Vec::new(),
            inbox: HashMap::new(),
            observers: Vec::new(),
        }
    }

    /// Register an observer invoked after each successful mutation.
    pub fn subscribe(&mut self, observer: EventHandler) {
        self.observers.push(observer);
    }

    /// Append a comment on `post_id` authored by `author_agent_id`.
    ///
    /// Checks, in order: the author must be registered, the post must
    /// exist, the content must be non-empty. Emits
    /// [`LedgerEvent::CommentCreated`].
    pub fn comment_on_post(
        &mut self,
        post_id: PostId,
        author_agent_id: AgentId,
        content: impl Into<String>,
        directory: &AgentDirectory,
        posts: &PostLedger,
    ) -> Result<Comment, InteractionError> {
        if !directory.exists(author_agent_id) {
            return Err(InteractionError::AgentNotRegistered(author_agent_id));
        }
        if !posts.contains(post_id) {
            return Err(InteractionError::PostNotFound(post_id));
        }
        let content = content.into();
        if content.is_empty() {
            return Err(InteractionError::EmptyContent);
        }

        let comment = Comment {
            id: self.comments.len() as CommentId + 1,
            post_id,
            author_agent_id,
            content,
            created_at: now_timestamp(),
        };
        let index = self.comments.len();
        self.comments.push(comment.clone());
        self.comments_by_post.entry(post_id).or_default().push(index);
        tracing::debug!(comment_id = comment.id, post_id, author = author_agent_id, "comment created");

        notify(
            &self.observers,
            &LedgerEvent::CommentCreated {
                comment_id: comment.id,
                post_id,
                author_agent_id,
                timestamp: comment.created_at,
            },
        );
        Ok(comment)
    }

    /// Deliver a direct message from `sender_agent_id` to
    /// `receiver_agent_id`.
    ///
    /// Checks, in order: sender registered, receiver registered, sender
    /// distinct from receiver, content non-empty. The message is stored
    /// once and indexed under both participants' inboxes. Emits
    /// [`LedgerEvent::DmSent`].
    pub fn send_dm(
        &mut self,
        sender_agent_id: AgentId,
        receiver_agent_id: AgentId,
        content: impl Into<String>,
        directory: &AgentDirectory,
    ) -> Result<DirectMessage, InteractionError> {
        if !directory.exists(sender_agent_id) {
            return Err(InteractionError::AgentNotRegistered(sender_agent_id));
        }
        if !directory.exists(receiver_agent_id) {
            return Err(InteractionError::AgentNotRegistered(receiver_agent_id));
        }
        if sender_agent_id == receiver_agent_id {
            return Err(InteractionError::SelfMessage(sender_agent_id));
        }
        let content = content.into();
        if content.is_empty() {
            return Err(InteractionError::EmptyContent);
        }

        let message = DirectMessage {
            id: self.messages.len() as MessageId + 1,
            sender_agent_id,
            receiver_agent_id,
            content,
            created_at: now_timestamp(),
        };
        let index = self.messages.len();
        self.messages.push(message.clone());
        // Sender != receiver is guaranteed above, so each inbox gains the
        // message exactly once.
        self.inbox.entry(sender_agent_id).or_default().push(index);
        self.inbox.entry(receiver_agent_id).or_default().push(index);
        tracing::debug!(
            message_id = message.id,
            sender = sender_agent_id,
            receiver = receiver_agent_id,
            "direct message sent"
        );

        notify(
            &self.observers,
            &LedgerEvent::DmSent {
                message_id: message.id,
                sender_agent_id,
                receiver_agent_id,
                timestamp: message.created_at,
            },
        );
        Ok(message)
    }

    /// Comments on `post_id` in creation order. Unknown posts yield an
    /// empty list.
    pub fn get_comments_for_post(&self, post_id: PostId) -> Vec<&Comment> {
        self.comments_by_post
            .get(&post_id)
            .map(|indices| indices.iter().map(|&i| &self.comments[i]).collect())
            .unwrap_or_default()
    }

    pub fn get_comments_count(&self, post_id: PostId) -> usize {
        self.comments_by_post.get(&post_id).map_or(0, Vec::len)
    }

    /// Messages where `agent_id` is sender or receiver, in creation
    /// order. Unknown agents yield an empty list.
    pub fn get_dms_for_agent(&self, agent_id: AgentId) -> Vec<&DirectMessage> {
        self.inbox
            .get(&agent_id)
            .map(|indices| indices.iter().map(|&i| &self.messages[i]).collect())
            .unwrap_or_default()
    }

    pub fn get_dms_count(&self, agent_id: AgentId) -> usize {
        self.inbox.get(&agent_id).map_or(0, Vec::len)
    }

    pub fn get_total_comments(&self) -> usize {
        self.comments.len()
    }

    /// Global message count; each DM counts once even though it appears
    /// in two inbox views.
    pub fn get_total_direct_messages(&self) -> usize {
        self.messages.len()
    }
}

impl Default for InteractionLog {
    fn default() -> Self {
        Self::new()
    }
}
