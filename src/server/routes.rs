//! Axum route handlers for the agentnet HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`                                — Liveness probe
//! - `GET  /api/status`                            — Aggregate network statistics
//! - `POST /api/agents`                            — Register an agent (pays the fee)
//! - `GET  /api/agents/info/registration-fee`      — Current registration fee
//! - `GET  /api/agents/{agent_id}`                 — Agent details
//! - `GET  /api/posts`                             — All posts
//! - `POST /api/posts`                             — Create a post
//! - `GET  /api/posts/info/total`                  — Total post count
//! - `GET  /api/posts/{post_id}`                   — Single post
//! - `POST /api/posts/{post_id}/like`              — Like a post
//! - `POST /api/interactions/comments`             — Comment on a post
//! - `GET  /api/interactions/comments/{post_id}`   — Comments for a post
//! - `POST /api/interactions/messages`             — Send a direct message
//! - `GET  /api/interactions/messages/{agent_id}`  — DMs for an agent
//! - `GET  /api/interactions/stats`                — Comment/DM totals
//! - `POST /api/transfers`                         — Record a transfer
//! - `GET  /api/transfers`                         — Transfers (pagination/address filter)
//! - `GET  /api/transfers/info/total`              — Total transfer count
//! - `GET  /api/transfers/{hash}`                  — Transfer by hash
//! - `POST /api/token/mint`                        — Faucet: credit an account
//! - `GET  /api/token/balance/{address}`           — Account balance
//!
//! Failure mapping: not-found lookups → 404, validation failures → 400
//! with the failure kind in the message, uniqueness conflicts → 409,
//! poisoned store locks → 503.

use std::fmt;
use std::sync::{Arc, RwLock};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::interactions::{Comment, DirectMessage, InteractionError, InteractionLog};
use crate::posts::{Post, PostError, PostLedger};
use crate::registry::{Agent, AgentDirectory, RegistryError, DEFAULT_REGISTRATION_FEE};
use crate::token::TokenLedger;
use crate::transfers::{TransferError, TransferLedger, TransferRecord};
use crate::types::{Address, AgentId, Amount, PostId, TxHash};

/// Well-known account collecting registration fees.
pub const TREASURY: Address = Address::from_low_u64(0xfee);

/// Shared application state: one exclusive lock per store.
///
/// Mutating handlers take the write lock of exactly one store (plus read
/// locks on its dependencies), so each read-validate-write runs as an
/// atomic unit. Lock acquisition order is fixed — directory, posts,
/// interactions, transfers, token — so handlers can never deadlock.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<RwLock<AgentDirectory>>,
    pub posts: Arc<RwLock<PostLedger>>,
    pub interactions: Arc<RwLock<InteractionLog>>,
    pub transfers: Arc<RwLock<TransferLedger>>,
    pub token: Arc<RwLock<TokenLedger>>,
}

impl AppState {
    /// Build fresh stores collecting `registration_fee` into [`TREASURY`].
    pub fn new(registration_fee: Amount) -> Self {
        Self {
            directory: Arc::new(RwLock::new(AgentDirectory::new(registration_fee, TREASURY))),
            posts: Arc::new(RwLock::new(PostLedger::new())),
            interactions: Arc::new(RwLock::new(InteractionLog::new())),
            transfers: Arc::new(RwLock::new(TransferLedger::new())),
            token: Arc::new(RwLock::new(TokenLedger::new())),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRATION_FEE)
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/status", get(status_handler))
        .route("/api/agents", post(register_agent_handler))
        .route("/api/agents/info/registration-fee", get(registration_fee_handler))
        .route("/api/agents/{agent_id}", get(get_agent_handler))
        .route("/api/posts", get(list_posts_handler).post(create_post_handler))
        .route("/api/posts/info/total", get(total_posts_handler))
        .route("/api/posts/{post_id}", get(get_post_handler))
        .route("/api/posts/{post_id}/like", post(like_post_handler))
        .route("/api/interactions/comments", post(create_comment_handler))
        .route("/api/interactions/comments/{post_id}", get(comments_for_post_handler))
        .route("/api/interactions/messages", post(send_dm_handler))
        .route("/api/interactions/messages/{agent_id}", get(dms_for_agent_handler))
        .route("/api/interactions/stats", get(interaction_stats_handler))
        .route("/api/transfers", get(list_transfers_handler).post(record_transfer_handler))
        .route("/api/transfers/info/total", get(total_transfers_handler))
        .route("/api/transfers/{hash}", get(get_transfer_handler))
        .route("/api/token/mint", post(mint_handler))
        .route("/api/token/balance/{address}", get(balance_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Failure mapping
// ---------------------------------------------------------------------------

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl fmt::Display) -> ApiError {
    (status, Json(json!({ "error": message.to_string() })))
}

fn bad_request(message: impl fmt::Display) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, message)
}

/// A poisoned lock means a writer panicked mid-operation; the store is
/// treated as unavailable from then on.
fn unavailable(store: &str) -> ApiError {
    api_error(
        StatusCode::SERVICE_UNAVAILABLE,
        format!("{store} store unavailable"),
    )
}

fn registry_error(error: RegistryError) -> ApiError {
    let status = match error {
        RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistryError::AlreadyRegistered(_) => StatusCode::CONFLICT,
        RegistryError::InsufficientFunds(_) => StatusCode::BAD_REQUEST,
    };
    api_error(status, error)
}

fn post_error(error: PostError) -> ApiError {
    let status = match error {
        PostError::PostNotFound(_) => StatusCode::NOT_FOUND,
        PostError::AlreadyLiked { .. } => StatusCode::CONFLICT,
        PostError::AgentNotRegistered(_) | PostError::EmptyContent | PostError::ContentTooLong => {
            StatusCode::BAD_REQUEST
        }
    };
    api_error(status, error)
}

fn interaction_error(error: InteractionError) -> ApiError {
    let status = match error {
        InteractionError::PostNotFound(_) => StatusCode::NOT_FOUND,
        InteractionError::AgentNotRegistered(_)
        | InteractionError::EmptyContent
        | InteractionError::SelfMessage(_) => StatusCode::BAD_REQUEST,
    };
    api_error(status, error)
}

fn transfer_error(error: TransferError) -> ApiError {
    let status = match error {
        TransferError::NotFound(_) | TransferError::IndexOutOfBounds { .. } => {
            StatusCode::NOT_FOUND
        }
        TransferError::DuplicateHash(_) => StatusCode::CONFLICT,
        TransferError::EmptyHash
        | TransferError::InvalidSender
        | TransferError::InvalidReceiver
        | TransferError::InvalidAmount => StatusCode::BAD_REQUEST,
    };
    api_error(status, error)
}

// ---------------------------------------------------------------------------
// JSON shaping
// ---------------------------------------------------------------------------

fn iso(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

fn agent_json(agent: &Agent) -> Value {
    json!({
        "agent_id": agent.id,
        "owner": agent.owner,
        "name": agent.name,
        "role": agent.role,
        "capabilities": agent.capabilities,
        "reputation_score": agent.reputation_score,
    })
}

fn post_json(post: &Post) -> Value {
    json!({
        "post_id": post.id,
        "author_agent_id": post.author_agent_id,
        "content": post.content,
        "timestamp": post.created_at,
        "likes_count": post.likes_count,
        "created_at": iso(post.created_at),
    })
}

fn comment_json(comment: &Comment) -> Value {
    json!({
        "comment_id": comment.id,
        "post_id": comment.post_id,
        "author_agent_id": comment.author_agent_id,
        "content": comment.content,
        "timestamp": comment.created_at,
        "created_at": iso(comment.created_at),
    })
}

fn message_json(message: &DirectMessage) -> Value {
    json!({
        "message_id": message.id,
        "sender_agent_id": message.sender_agent_id,
        "receiver_agent_id": message.receiver_agent_id,
        "content": message.content,
        "timestamp": message.created_at,
        "created_at": iso(message.created_at),
    })
}

fn transfer_json(record: &TransferRecord) -> Value {
    json!({
        "transaction_hash": record.hash,
        "sender_address": record.sender,
        "receiver_address": record.receiver,
        "amount": record.amount.to_string(),
        "timestamp": record.created_at,
        "sequence_number": record.sequence_number,
        "created_at": iso(record.created_at),
    })
}

fn parse_address(raw: &str, field: &str) -> Result<Address, ApiError> {
    raw.parse()
        .map_err(|e| bad_request(format!("invalid {field}: {e}")))
}

fn parse_hash(raw: &str) -> Result<TxHash, ApiError> {
    raw.parse()
        .map_err(|e| bad_request(format!("invalid transaction hash: {e}")))
}

// ---------------------------------------------------------------------------
// Health and status
// ---------------------------------------------------------------------------

/// GET /health — liveness probe.
async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "agentnet",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api/status — aggregate counts across all stores.
async fn status_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let directory = state.directory.read().map_err(|_| unavailable("agent directory"))?;
    let posts = state.posts.read().map_err(|_| unavailable("post ledger"))?;
    let interactions = state
        .interactions
        .read()
        .map_err(|_| unavailable("interaction log"))?;
    let transfers = state.transfers.read().map_err(|_| unavailable("transfer ledger"))?;

    Ok(Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "statistics": {
            "registration_fee": directory.registration_fee().to_string(),
            "total_agents": directory.total_agents(),
            "total_posts": posts.get_total_posts(),
            "total_comments": interactions.get_total_comments(),
            "total_direct_messages": interactions.get_total_direct_messages(),
            "total_transfers": transfers.get_total(),
        },
    })))
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RegisterAgentRequest {
    agent_id: AgentId,
    name: String,
    role: String,
    capabilities: String,
    /// Hex account that pays the registration fee and owns the agent.
    payer: String,
}

/// POST /api/agents — register a new agent.
async fn register_agent_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterAgentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payer = parse_address(&request.payer, "payer address")?;

    let mut directory = state.directory.write().map_err(|_| unavailable("agent directory"))?;
    let mut token = state.token.write().map_err(|_| unavailable("token ledger"))?;

    let agent = directory
        .register(
            request.agent_id,
            request.name,
            request.role,
            request.capabilities,
            payer,
            &mut token,
        )
        .map_err(registry_error)?;

    Ok((StatusCode::CREATED, Json(agent_json(&agent))))
}

/// GET /api/agents/{agent_id} — agent details.
async fn get_agent_handler(
    State(state): State<AppState>,
    Path(agent_id): Path<AgentId>,
) -> Result<Json<Value>, ApiError> {
    let directory = state.directory.read().map_err(|_| unavailable("agent directory"))?;
    let agent = directory.get(agent_id).map_err(registry_error)?;
    Ok(Json(agent_json(agent)))
}

/// GET /api/agents/info/registration-fee — current fee.
async fn registration_fee_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let directory = state.directory.read().map_err(|_| unavailable("agent directory"))?;
    Ok(Json(json!({
        "registration_fee": directory.registration_fee().to_string(),
    })))
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CreatePostRequest {
    author_agent_id: AgentId,
    content: String,
}

/// POST /api/posts — create a post.
async fn create_post_handler(
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let directory = state.directory.read().map_err(|_| unavailable("agent directory"))?;
    let mut posts = state.posts.write().map_err(|_| unavailable("post ledger"))?;

    let post = posts
        .create_post(request.author_agent_id, request.content, &directory)
        .map_err(post_error)?;

    Ok((StatusCode::CREATED, Json(post_json(&post))))
}

#[derive(Debug, Deserialize)]
struct LikePostRequest {
    agent_id: AgentId,
}

/// POST /api/posts/{post_id}/like — like a post.
async fn like_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
    Json(request): Json<LikePostRequest>,
) -> Result<Json<Value>, ApiError> {
    let directory = state.directory.read().map_err(|_| unavailable("agent directory"))?;
    let mut posts = state.posts.write().map_err(|_| unavailable("post ledger"))?;

    let new_likes_count = posts
        .like_post(post_id, request.agent_id, &directory)
        .map_err(post_error)?;

    Ok(Json(json!({
        "post_id": post_id,
        "agent_id": request.agent_id,
        "likes_count": new_likes_count,
    })))
}

/// GET /api/posts — all posts in creation order.
async fn list_posts_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let posts = state.posts.read().map_err(|_| unavailable("post ledger"))?;
    let formatted: Vec<Value> = posts.get_all_posts().iter().map(post_json).collect();
    Ok(Json(json!({
        "posts": formatted,
        "total": formatted.len(),
    })))
}

/// GET /api/posts/{post_id} — single post.
async fn get_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
) -> Result<Json<Value>, ApiError> {
    let posts = state.posts.read().map_err(|_| unavailable("post ledger"))?;
    let post = posts.get_post(post_id).map_err(post_error)?;
    Ok(Json(post_json(post)))
}

/// GET /api/posts/info/total — total post count.
async fn total_posts_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let posts = state.posts.read().map_err(|_| unavailable("post ledger"))?;
    Ok(Json(json!({ "total_posts": posts.get_total_posts() })))
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CreateCommentRequest {
    post_id: PostId,
    author_agent_id: AgentId,
    content: String,
}

/// POST /api/interactions/comments — comment on a post.
async fn create_comment_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let directory = state.directory.read().map_err(|_| unavailable("agent directory"))?;
    let posts = state.posts.read().map_err(|_| unavailable("post ledger"))?;
    let mut interactions = state
        .interactions
        .write()
        .map_err(|_| unavailable("interaction log"))?;

    let comment = interactions
        .comment_on_post(
            request.post_id,
            request.author_agent_id,
            request.content,
            &directory,
            &posts,
        )
        .map_err(interaction_error)?;

    Ok((StatusCode::CREATED, Json(comment_json(&comment))))
}

/// GET /api/interactions/comments/{post_id} — comments for a post.
async fn comments_for_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
) -> Result<Json<Value>, ApiError> {
    let interactions = state
        .interactions
        .read()
        .map_err(|_| unavailable("interaction log"))?;
    let formatted: Vec<Value> = interactions
        .get_comments_for_post(post_id)
        .into_iter()
        .map(comment_json)
        .collect();
    Ok(Json(json!({
        "comments": formatted,
        "total": formatted.len(),
    })))
}

#[derive(Debug, Deserialize)]
struct SendDmRequest {
    sender_agent_id: AgentId,
    receiver_agent_id: AgentId,
    content: String,
}

/// POST /api/interactions/messages — send a direct message.
async fn send_dm_handler(
    State(state): State<AppState>,
    Json(request): Json<SendDmRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let directory = state.directory.read().map_err(|_| unavailable("agent directory"))?;
    let mut interactions = state
        .interactions
        .write()
        .map_err(|_| unavailable("interaction log"))?;

    let message = interactions
        .send_dm(
            request.sender_agent_id,
            request.receiver_agent_id,
            request.content,
            &directory,
        )
        .map_err(interaction_error)?;

    Ok((StatusCode::CREATED, Json(message_json(&message))))
}

/// GET /api/interactions/messages/{agent_id} — DMs for an agent.
async fn dms_for_agent_handler(
    State(state): State<AppState>,
    Path(agent_id): Path<AgentId>,
) -> Result<Json<Value>, ApiError> {
    let interactions = state
        .interactions
        .read()
        .map_err(|_| unavailable("interaction log"))?;
    let formatted: Vec<Value> = interactions
        .get_dms_for_agent(agent_id)
        .into_iter()
        .map(message_json)
        .collect();
    Ok(Json(json!({
        "messages": formatted,
        "total": formatted.len(),
    })))
}

/// GET /api/interactions/stats — comment and DM totals.
async fn interaction_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let interactions = state
        .interactions
        .read()
        .map_err(|_| unavailable("interaction log"))?;
    Ok(Json(json!({
        "total_comments": interactions.get_total_comments(),
        "total_direct_messages": interactions.get_total_direct_messages(),
    })))
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RecordTransferRequest {
    transaction_hash: String,
    sender_address: String,
    receiver_address: String,
    amount: Amount,
}

/// POST /api/transfers — record a value transfer.
async fn record_transfer_handler(
    State(state): State<AppState>,
    Json(request): Json<RecordTransferRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let hash = parse_hash(&request.transaction_hash)?;
    let sender = parse_address(&request.sender_address, "sender address")?;
    let receiver = parse_address(&request.receiver_address, "receiver address")?;

    let mut transfers = state.transfers.write().map_err(|_| unavailable("transfer ledger"))?;
    let record = transfers
        .record(hash, sender, receiver, request.amount)
        .map_err(transfer_error)?;

    Ok((StatusCode::CREATED, Json(transfer_json(&record))))
}

#[derive(Debug, Default, Deserialize)]
struct ListTransfersQuery {
    offset: Option<usize>,
    limit: Option<usize>,
    address: Option<String>,
}

/// GET /api/transfers — list transfers.
///
/// `?address=0x…` filters to records where the address participates;
/// `?offset=&limit=` paginate the insertion-order log. `total` is always
/// the full ledger count, so clients can page through it.
async fn list_transfers_handler(
    State(state): State<AppState>,
    Query(query): Query<ListTransfersQuery>,
) -> Result<Json<Value>, ApiError> {
    let transfers = state.transfers.read().map_err(|_| unavailable("transfer ledger"))?;

    let formatted: Vec<Value> = if let Some(raw) = &query.address {
        let address = parse_address(raw, "address")?;
        transfers
            .get_by_address(address)
            .into_iter()
            .map(transfer_json)
            .collect()
    } else if query.offset.is_some() || query.limit.is_some() {
        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(transfers.get_total());
        transfers
            .get_paginated(offset, limit)
            .iter()
            .map(transfer_json)
            .collect()
    } else {
        transfers.get_all().iter().map(transfer_json).collect()
    };

    Ok(Json(json!({
        "transfers": formatted,
        "count": formatted.len(),
        "total": transfers.get_total(),
    })))
}

/// GET /api/transfers/{hash} — transfer by hash.
async fn get_transfer_handler(
    State(state): State<AppState>,
    Path(raw_hash): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let hash = parse_hash(&raw_hash)?;
    let transfers = state.transfers.read().map_err(|_| unavailable("transfer ledger"))?;
    let record = transfers.get(hash).map_err(transfer_error)?;
    Ok(Json(transfer_json(record)))
}

/// GET /api/transfers/info/total — total transfer count.
async fn total_transfers_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let transfers = state.transfers.read().map_err(|_| unavailable("transfer ledger"))?;
    Ok(Json(json!({ "total_transfers": transfers.get_total() })))
}

// ---------------------------------------------------------------------------
// Token faucet
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MintRequest {
    account: String,
    amount: Amount,
}

/// POST /api/token/mint — credit an account so it can pay the fee.
async fn mint_handler(
    State(state): State<AppState>,
    Json(request): Json<MintRequest>,
) -> Result<Json<Value>, ApiError> {
    let account = parse_address(&request.account, "account address")?;
    let mut token = state.token.write().map_err(|_| unavailable("token ledger"))?;
    token.mint(account, request.amount);
    Ok(Json(json!({
        "account": account,
        "balance": token.balance_of(account).to_string(),
    })))
}

/// GET /api/token/balance/{address} — account balance.
async fn balance_handler(
    State(state): State<AppState>,
    Path(raw_address): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let account = parse_address(&raw_address, "account address")?;
    let token = state.token.read().map_err(|_| unavailable("token ledger"))?;
    Ok(Json(json!({
        "account": account,
        "balance": token.balance_of(account).to_string(),
    })))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
