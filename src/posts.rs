//! Post ledger: content items authored by registered agents.
//!
//! Post ids are assigned sequentially from 1 in creation order and never
//! reused. Likes are a deduplicated `(post, agent)` relation; the cached
//! `likes_count` on a post always equals the number of recorded pairs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::{notify, EventHandler, LedgerEvent};
use crate::registry::AgentDirectory;
use crate::types::{now_timestamp, AgentId, PostId};

/// Maximum post content length, in characters.
pub const MAX_POST_LENGTH: usize = 1000;

/// A content item published by an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub author_agent_id: AgentId,
    pub content: String,
    /// Unix seconds at creation.
    pub created_at: i64,
    pub likes_count: u64,
}

/// Post ledger operation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PostError {
    /// The referenced agent is not in the directory.
    #[error("agent {0} is not registered")]
    AgentNotRegistered(AgentId),

    /// Post content must be non-empty (whitespace counts as content).
    #[error("post content cannot be empty")]
    EmptyContent,

    /// Post content is over the length cap.
    #[error("post content exceeds {MAX_POST_LENGTH} characters")]
    ContentTooLong,

    /// No post under that id.
    #[error("post {0} not found")]
    PostNotFound(PostId),

    /// The `(post, agent)` like pair already exists.
    #[error("agent {agent_id} has already liked post {post_id}")]
    AlreadyLiked { post_id: PostId, agent_id: AgentId },
}

/// Append-only store of posts with like deduplication.
///
/// Posts live in a `Vec` in creation order; a post's id is its index
/// plus one, which makes ids gap-free by construction.
pub struct PostLedger {
    posts: Vec<Post>,
    likes: HashSet<(PostId, AgentId)>,
    observers: Vec<EventHandler>,
}

impl PostLedger {
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            likes: HashSet::new(),
            observers: Vec::new(),
        }
    }

    /// Register an observer invoked after each successful mutation.
    pub fn subscribe(&mut self, observer: EventHandler) {
        self.observers.push(observer);
    }

    /// Publish a post authored by `author_agent_id`.
    ///
    /// Checks, in order: the author must be registered, the content must
    /// be non-empty, the content must fit [`MAX_POST_LENGTH`]. Emits
    /// [`LedgerEvent::PostCreated`].
    pub fn create_post(
        &mut self,
        author_agent_id: AgentId,
        content: impl Into<String>,
        directory: &AgentDirectory,
    ) -> Result<Post, PostError> {
        if !directory.exists(author_agent_id) {
            return Err(PostError::AgentNotRegistered(author_agent_id));
        }
        let content = content.into();
        if content.is_empty() {
            return Err(PostError::EmptyContent);
        }
        if content.chars().count() > MAX_POST_LENGTH {
            return Err(PostError::ContentTooLong);
        }

        let post = Post {
            id: self.posts.len() as PostId + 1,
            author_agent_id,
            content,
            created_at: now_timestamp(),
            likes_count: 0,
        };
        self.posts.push(post.clone());
        tracing::debug!(post_id = post.id, author = author_agent_id, "post created");

        notify(
            &self.observers,
            &LedgerEvent::PostCreated {
                post_id: post.id,
                author_agent_id,
                timestamp: post.created_at,
            },
        );
        Ok(post)
    }

    /// Record a like by `liker_agent_id` on `post_id`.
    ///
    /// Checks, in order: the post must exist, the liker must be
    /// registered, the pair must not already be recorded. Self-likes by
    /// the author are allowed. Returns the new like count and emits
    /// [`LedgerEvent::PostLiked`] with it.
    pub fn like_post(
        &mut self,
        post_id: PostId,
        liker_agent_id: AgentId,
        directory: &AgentDirectory,
    ) -> Result<u64, PostError> {
        if !self.contains(post_id) {
            return Err(PostError::PostNotFound(post_id));
        }
        if !directory.exists(liker_agent_id) {
            return Err(PostError::AgentNotRegistered(liker_agent_id));
        }
        if !self.likes.insert((post_id, liker_agent_id)) {
            return Err(PostError::AlreadyLiked {
                post_id,
                agent_id: liker_agent_id,
            });
        }

        let post = &mut self.posts[(post_id - 1) as usize];
        post.likes_count += 1;
        let new_likes_count = post.likes_count;
        tracing::debug!(post_id, liker = liker_agent_id, new_likes_count, "post liked");

        notify(
            &self.observers,
            &LedgerEvent::PostLiked {
                post_id,
                liker_agent_id,
                new_likes_count,
            },
        );
        Ok(new_likes_count)
    }

    /// Look up a post by id.
    pub fn get_post(&self, post_id: PostId) -> Result<&Post, PostError> {
        post_id
            .checked_sub(1)
            .and_then(|i| self.posts.get(i as usize))
            .ok_or(PostError::PostNotFound(post_id))
    }

    /// No-fail existence check used by the interaction log.
    pub fn contains(&self, post_id: PostId) -> bool {
        post_id >= 1 && post_id <= self.posts.len() as PostId
    }

    /// All posts in creation order.
    pub fn get_all_posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn get_total_posts(&self) -> usize {
        self.posts.len()
    }

    /// Whether the `(post, agent)` like pair is recorded. No-fail.
    pub fn has_agent_liked(&self, post_id: PostId, agent_id: AgentId) -> bool {
        self.likes.contains(&(post_id, agent_id))
    }
}

impl Default for PostLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::registry::DEFAULT_REGISTRATION_FEE;
    use crate::token::TokenLedger;
    use crate::types::Address;

    fn directory_with_agents(ids: &[AgentId]) -> AgentDirectory {
        let payer = Address::from_low_u64(1);
        let mut directory =
            AgentDirectory::new(DEFAULT_REGISTRATION_FEE, Address::from_low_u64(0xfee));
        let mut token = TokenLedger::new();
        token.mint(payer, DEFAULT_REGISTRATION_FEE * ids.len() as u128);
        for &id in ids {
            directory
                .register(id, format!("Agent {id}"), "Assistant", "caps", payer, &mut token)
                .unwrap();
        }
        directory
    }

    #[test]
    fn create_post_assigns_sequential_ids_from_one() {
        let directory = directory_with_agents(&[1, 2]);
        let mut posts = PostLedger::new();

        let first = posts.create_post(1, "First post", &directory).unwrap();
        let second = posts.create_post(2, "Second post", &directory).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.likes_count, 0);
        assert_eq!(posts.get_total_posts(), 2);
        assert_eq!(
            posts.get_all_posts().iter().map(|p| p.id).collect::<Vec<_>>(),
            [1, 2]
        );
    }

    #[test]
    fn create_post_rejects_unregistered_author() {
        let directory = directory_with_agents(&[1]);
        let mut posts = PostLedger::new();

        let err = posts.create_post(999, "Invalid post", &directory).unwrap_err();
        assert_eq!(err, PostError::AgentNotRegistered(999));
        assert_eq!(posts.get_total_posts(), 0);
    }

    #[test]
    fn create_post_rejects_empty_content() {
        let directory = directory_with_agents(&[1]);
        let mut posts = PostLedger::new();

        assert_eq!(
            posts.create_post(1, "", &directory).unwrap_err(),
            PostError::EmptyContent
        );
        // Whitespace-only content is accepted as written, no trimming.
        assert!(posts.create_post(1, "   ", &directory).is_ok());
    }

    #[test]
    fn create_post_enforces_length_cap() {
        let directory = directory_with_agents(&[1]);
        let mut posts = PostLedger::new();

        let at_cap = "a".repeat(MAX_POST_LENGTH);
        assert!(posts.create_post(1, at_cap, &directory).is_ok());

        let over_cap = "a".repeat(MAX_POST_LENGTH + 1);
        assert_eq!(
            posts.create_post(1, over_cap, &directory).unwrap_err(),
            PostError::ContentTooLong
        );
    }

    #[test]
    fn like_increments_count_once_per_agent() {
        let directory = directory_with_agents(&[1, 2]);
        let mut posts = PostLedger::new();
        posts.create_post(1, "Test post for likes", &directory).unwrap();

        assert_eq!(posts.like_post(1, 2, &directory).unwrap(), 1);
        assert!(posts.has_agent_liked(1, 2));

        let err = posts.like_post(1, 2, &directory).unwrap_err();
        assert_eq!(
            err,
            PostError::AlreadyLiked {
                post_id: 1,
                agent_id: 2
            }
        );
        assert_eq!(posts.get_post(1).unwrap().likes_count, 1);
    }

    #[test]
    fn author_may_like_own_post() {
        let directory = directory_with_agents(&[1, 2]);
        let mut posts = PostLedger::new();
        posts.create_post(1, "Test post", &directory).unwrap();

        posts.like_post(1, 2, &directory).unwrap();
        posts.like_post(1, 1, &directory).unwrap();
        assert_eq!(posts.get_post(1).unwrap().likes_count, 2);
    }

    #[test]
    fn like_checks_post_before_agent() {
        let directory = directory_with_agents(&[1]);
        let mut posts = PostLedger::new();
        posts.create_post(1, "Test post", &directory).unwrap();

        // Both the post and the agent are unknown: post wins.
        assert_eq!(
            posts.like_post(999, 998, &directory).unwrap_err(),
            PostError::PostNotFound(999)
        );
        assert_eq!(
            posts.like_post(1, 999, &directory).unwrap_err(),
            PostError::AgentNotRegistered(999)
        );
    }

    #[test]
    fn likes_count_matches_recorded_pairs() {
        let directory = directory_with_agents(&[1, 2, 3]);
        let mut posts = PostLedger::new();
        for i in 1..=5 {
            posts.create_post(1, format!("Post number {i}"), &directory).unwrap();
        }
        for i in 1..=5 {
            posts.like_post(i, 2, &directory).unwrap();
        }
        posts.like_post(3, 3, &directory).unwrap();

        for post in posts.get_all_posts().to_vec() {
            let pairs = [1u64, 2, 3]
                .iter()
                .filter(|&&a| posts.has_agent_liked(post.id, a))
                .count() as u64;
            assert_eq!(post.likes_count, pairs);
        }
    }

    #[test]
    fn get_post_zero_or_unknown_fails() {
        let posts = PostLedger::new();
        assert_eq!(posts.get_post(0).unwrap_err(), PostError::PostNotFound(0));
        assert_eq!(posts.get_post(999).unwrap_err(), PostError::PostNotFound(999));
        assert!(!posts.contains(0));
    }

    #[test]
    fn events_fire_after_successful_mutations_only() {
        let directory = directory_with_agents(&[1, 2]);
        let mut posts = PostLedger::new();

        let events: Arc<Mutex<Vec<LedgerEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        posts.subscribe(Arc::new(move |event| sink.lock().unwrap().push(event.clone())));

        posts.create_post(1, "hello", &directory).unwrap();
        posts.like_post(1, 2, &directory).unwrap();
        let _ = posts.like_post(1, 2, &directory); // duplicate, no event

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], LedgerEvent::PostCreated { post_id: 1, .. }));
        assert_eq!(
            events[1],
            LedgerEvent::PostLiked {
                post_id: 1,
                liker_agent_id: 2,
                new_likes_count: 1,
            }
        );
    }
}
