//! Marketplace HTTP API
//!
//! Exposes every query and mutation of the task lifecycle and agent
//! registry:
//! - Post and query tasks
//! - Claim tasks and submit work
//! - Verify or reject submissions
//! - Register agents, track reputation and earnings, rotate api keys

use crate::node::{AgoraNode, NodeStats};
use agora_market::MarketError;
use agora_types::{
    Agent, AgentId, RewardAmount, Task, TaskId, TaskKind, VerificationCriteria, WalletAddress,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Clone)]
struct AppState {
    node: AgoraNode,
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response Types - Task Operations
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    pub kind: TaskKind,
    /// Reward in USDC
    pub reward: f64,
    /// Poster wallet address (0x-hex)
    pub poster_wallet: String,
    pub verification_criteria: Option<VerificationCriteria>,
    /// Optional deadline (unix seconds)
    pub deadline: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    /// Task id (hex)
    pub task_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimTaskRequest {
    /// Claiming agent id (hex)
    pub agent_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitWorkRequest {
    /// Submitting agent id (hex)
    pub agent_id: String,
    /// Arbitrary work payload
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitWorkResponse {
    pub success: bool,
    /// Submission record id (hex)
    pub submission_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifySubmissionRequest {
    pub approved: bool,
    pub score: Option<f64>,
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
}

/// Task record as served over the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: TaskKind,
    pub reward: f64,
    pub currency: String,
    pub chain: String,
    pub poster_wallet: String,
    pub claimed_by: Option<String>,
    pub claimed_at: Option<i64>,
    pub submitted_at: Option<i64>,
    pub submitted_data: Option<serde_json::Value>,
    pub status: String,
    pub verification_criteria: VerificationCriteria,
    pub deadline: Option<i64>,
    pub created_at: i64,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.to_hex(),
            title: task.title,
            description: task.description,
            kind: task.kind,
            reward: task.reward.to_usdc(),
            currency: task.currency,
            chain: task.chain,
            poster_wallet: task.poster_wallet.to_string(),
            claimed_by: task.claimed_by.map(|id| id.to_hex()),
            claimed_at: task.claimed_at,
            submitted_at: task.submitted_at,
            submitted_data: task.submitted_data,
            status: task.status.to_string(),
            verification_criteria: task.verification_criteria,
            deadline: task.deadline,
            created_at: task.created_at,
        }
    }
}

// ============================================================================
// Request/Response Types - Agent Operations
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterAgentRequest {
    pub name: String,
    /// Wallet address (0x-hex)
    pub wallet: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterAgentResponse {
    /// Agent id (hex)
    pub agent_id: String,
    /// Issued credential
    pub api_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateReputationRequest {
    pub rating: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddEarningsRequest {
    /// Amount in USDC
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegenerateKeyResponse {
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct TopAgentsQuery {
    pub limit: Option<usize>,
}

/// Agent record as served over the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct AgentView {
    pub id: String,
    pub name: String,
    pub wallet: String,
    pub skills: Vec<String>,
    pub reputation: f64,
    pub completed_tasks: u64,
    pub total_earned: f64,
    pub is_active: bool,
    pub api_key: String,
    pub created_at: i64,
}

impl From<Agent> for AgentView {
    fn from(agent: Agent) -> Self {
        Self {
            id: agent.id.to_hex(),
            name: agent.name,
            wallet: agent.wallet.to_string(),
            skills: agent.skills,
            reputation: agent.reputation,
            completed_tasks: agent.completed_tasks,
            total_earned: agent.total_earned.to_usdc(),
            is_active: agent.is_active,
            api_key: agent.api_key,
            created_at: agent.created_at,
        }
    }
}

// ============================================================================
// Server
// ============================================================================

pub fn start_api_server(node: AgoraNode, host: String, port: u16) -> JoinHandle<()> {
    let state = AppState { node };

    let app = Router::new()
        .route("/health", get(health))
        .route("/status", get(get_status))
        .route("/tasks", post(create_task))
        .route("/tasks/open", get(get_open_tasks))
        .route("/tasks/poster/:wallet", get(get_tasks_by_poster))
        .route("/tasks/agent/:id", get(get_tasks_by_agent))
        .route("/tasks/:id", get(get_task))
        .route("/tasks/:id/claim", post(claim_task))
        .route("/tasks/:id/submit", post(submit_work))
        .route("/tasks/:id/verify", post(verify_submission))
        .route("/agents", post(register_agent))
        .route("/agents/top", get(get_top_agents))
        .route("/agents/wallet/:wallet", get(get_agent_by_wallet))
        .route("/agents/:id", get(get_agent))
        .route("/agents/:id/reputation", post(update_reputation))
        .route("/agents/:id/earnings", post(add_earnings))
        .route("/agents/:id/regenerate-key", post(regenerate_api_key))
        .with_state(Arc::new(state));

    let addr = format!("{}:{}", host, port);
    info!("📡 Starting API server on {}", addr);

    tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind API server");

        axum::serve(listener, app).await.expect("API server failed");
    })
}

fn market_error(err: MarketError) -> ApiError {
    let status = match &err {
        MarketError::TaskNotFound(_) | MarketError::AgentNotFound(_) => StatusCode::NOT_FOUND,
        MarketError::InvalidState { .. } => StatusCode::CONFLICT,
        MarketError::NotAuthorized { .. } => StatusCode::FORBIDDEN,
        MarketError::DuplicateWallet(_) => StatusCode::CONFLICT,
        MarketError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn parse_task_id(s: &str) -> Result<TaskId, ApiError> {
    TaskId::from_hex(s).map_err(|e| bad_request(e.to_string()))
}

fn parse_agent_id(s: &str) -> Result<AgentId, ApiError> {
    AgentId::from_hex(s).map_err(|e| bad_request(e.to_string()))
}

fn parse_wallet(s: &str) -> Result<WalletAddress, ApiError> {
    WalletAddress::new(s).map_err(|e| bad_request(e.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> &'static str {
    "OK"
}

async fn get_status(State(state): State<Arc<AppState>>) -> Result<Json<NodeStats>, StatusCode> {
    match state.node.get_stats().await {
        Ok(stats) => Ok(Json(stats)),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<CreateTaskResponse>, ApiError> {
    let poster_wallet = parse_wallet(&req.poster_wallet)?;

    let task_id = state
        .node
        .tasks
        .create_task(
            req.title,
            req.description,
            req.kind,
            RewardAmount::from_usdc(req.reward),
            poster_wallet,
            req.verification_criteria,
            req.deadline,
        )
        .await
        .map_err(market_error)?;

    Ok(Json(CreateTaskResponse {
        task_id: task_id.to_hex(),
    }))
}

async fn get_open_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TaskView>>, ApiError> {
    let tasks = state
        .node
        .tasks
        .get_open_tasks()
        .await
        .map_err(market_error)?;
    Ok(Json(tasks.into_iter().map(TaskView::from).collect()))
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TaskView>, ApiError> {
    let task_id = parse_task_id(&id)?;
    match state.node.tasks.get_task(&task_id).await.map_err(market_error)? {
        Some(task) => Ok(Json(task.into())),
        None => Err(market_error(MarketError::TaskNotFound(task_id))),
    }
}

async fn claim_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ClaimTaskRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let agent_id = parse_agent_id(&req.agent_id)?;

    state
        .node
        .tasks
        .claim_task(&task_id, &agent_id)
        .await
        .map_err(market_error)?;

    Ok(Json(MutationResponse {
        success: true,
        message: "Task claimed".to_string(),
    }))
}

async fn submit_work(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SubmitWorkRequest>,
) -> Result<Json<SubmitWorkResponse>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let agent_id = parse_agent_id(&req.agent_id)?;

    let submission_id = state
        .node
        .tasks
        .submit_work(&task_id, &agent_id, req.data)
        .await
        .map_err(market_error)?;

    Ok(Json(SubmitWorkResponse {
        success: true,
        submission_id: submission_id.to_hex(),
    }))
}

async fn verify_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<VerifySubmissionRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let task_id = parse_task_id(&id)?;

    state
        .node
        .tasks
        .verify_submission(&task_id, req.approved, req.score, req.feedback)
        .await
        .map_err(market_error)?;

    let message = if req.approved {
        "Submission verified"
    } else {
        "Submission rejected"
    };
    Ok(Json(MutationResponse {
        success: true,
        message: message.to_string(),
    }))
}

async fn get_tasks_by_poster(
    State(state): State<Arc<AppState>>,
    Path(wallet): Path<String>,
) -> Result<Json<Vec<TaskView>>, ApiError> {
    let poster = parse_wallet(&wallet)?;
    let tasks = state
        .node
        .tasks
        .get_tasks_by_poster(&poster)
        .await
        .map_err(market_error)?;
    Ok(Json(tasks.into_iter().map(TaskView::from).collect()))
}

async fn get_tasks_by_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TaskView>>, ApiError> {
    let agent_id = parse_agent_id(&id)?;
    let tasks = state
        .node
        .tasks
        .get_tasks_by_agent(&agent_id)
        .await
        .map_err(market_error)?;
    Ok(Json(tasks.into_iter().map(TaskView::from).collect()))
}

async fn register_agent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterAgentRequest>,
) -> Result<Json<RegisterAgentResponse>, ApiError> {
    let wallet = parse_wallet(&req.wallet)?;

    let agent_id = state
        .node
        .agents
        .register_agent(req.name, wallet, req.skills)
        .await
        .map_err(market_error)?;

    let agent = state
        .node
        .agents
        .get_agent(&agent_id)
        .await
        .map_err(market_error)?
        .ok_or_else(|| market_error(MarketError::AgentNotFound(agent_id)))?;

    Ok(Json(RegisterAgentResponse {
        agent_id: agent_id.to_hex(),
        api_key: agent.api_key,
    }))
}

async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AgentView>, ApiError> {
    let agent_id = parse_agent_id(&id)?;
    match state
        .node
        .agents
        .get_agent(&agent_id)
        .await
        .map_err(market_error)?
    {
        Some(agent) => Ok(Json(agent.into())),
        None => Err(market_error(MarketError::AgentNotFound(agent_id))),
    }
}

async fn get_agent_by_wallet(
    State(state): State<Arc<AppState>>,
    Path(wallet): Path<String>,
) -> Result<Json<AgentView>, ApiError> {
    let wallet = parse_wallet(&wallet)?;
    match state
        .node
        .agents
        .get_agent_by_wallet(&wallet)
        .await
        .map_err(market_error)?
    {
        Some(agent) => Ok(Json(agent.into())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No agent registered for wallet {}", wallet),
            }),
        )),
    }
}

async fn update_reputation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateReputationRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let agent_id = parse_agent_id(&id)?;

    state
        .node
        .agents
        .update_reputation(&agent_id, req.rating)
        .await
        .map_err(market_error)?;

    Ok(Json(MutationResponse {
        success: true,
        message: "Reputation updated".to_string(),
    }))
}

async fn add_earnings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddEarningsRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let agent_id = parse_agent_id(&id)?;

    state
        .node
        .agents
        .add_earnings(&agent_id, RewardAmount::from_usdc(req.amount))
        .await
        .map_err(market_error)?;

    Ok(Json(MutationResponse {
        success: true,
        message: "Earnings added".to_string(),
    }))
}

async fn get_top_agents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopAgentsQuery>,
) -> Result<Json<Vec<AgentView>>, ApiError> {
    let agents = state
        .node
        .agents
        .get_top_agents(params.limit)
        .await
        .map_err(market_error)?;
    Ok(Json(agents.into_iter().map(AgentView::from).collect()))
}

async fn regenerate_api_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RegenerateKeyResponse>, ApiError> {
    let agent_id = parse_agent_id(&id)?;

    let api_key = state
        .node
        .agents
        .regenerate_api_key(&agent_id)
        .await
        .map_err(market_error)?;

    Ok(Json(RegenerateKeyResponse { api_key }))
}
