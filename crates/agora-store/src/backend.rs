use agora_types::{
    Agent, AgentId, Payment, Submission, SubmissionId, Task, TaskId, TaskStatus, WalletAddress,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Store backend error: {0}")]
    BackendError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Seam between the marketplace handlers and the hosting document database.
///
/// Each method is a single indexed read or a single-record write; the memory
/// backend is the default implementation, a hosted database adapter would be
/// another. List queries return newest-first and respect `limit`.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    // ---- tasks ----

    /// Insert a new task record.
    async fn insert_task(&self, task: &Task) -> Result<()>;

    /// Fetch a task by id.
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>>;

    /// Replace an existing task record, keeping indexes consistent.
    async fn update_task(&self, task: &Task) -> Result<()>;

    /// Tasks with the given status via the `by_status` index.
    async fn tasks_by_status(&self, status: TaskStatus, limit: usize) -> Result<Vec<Task>>;

    /// Tasks created by a poster via the `by_poster` index.
    async fn tasks_by_poster(&self, poster: &WalletAddress, limit: usize) -> Result<Vec<Task>>;

    /// Tasks claimed by an agent via the `by_claimer` index.
    async fn tasks_by_claimer(&self, agent: &AgentId, limit: usize) -> Result<Vec<Task>>;

    // ---- agents ----

    /// Insert a new agent record.
    async fn insert_agent(&self, agent: &Agent) -> Result<()>;

    /// Fetch an agent by id.
    async fn get_agent(&self, id: &AgentId) -> Result<Option<Agent>>;

    /// Fetch an agent by wallet via the `by_wallet` index.
    async fn get_agent_by_wallet(&self, wallet: &WalletAddress) -> Result<Option<Agent>>;

    /// Replace an existing agent record.
    async fn update_agent(&self, agent: &Agent) -> Result<()>;

    /// Agents with reputation > 0, descending, via the `by_reputation` index.
    async fn top_agents_by_reputation(&self, limit: usize) -> Result<Vec<Agent>>;

    // ---- submissions ----

    /// Insert a new submission record.
    async fn insert_submission(&self, submission: &Submission) -> Result<()>;

    /// Fetch a submission by id.
    async fn get_submission(&self, id: &SubmissionId) -> Result<Option<Submission>>;

    /// Submissions for a task via the `by_task` index, oldest first.
    async fn submissions_by_task(&self, task: &TaskId) -> Result<Vec<Submission>>;

    /// Submissions by an agent via the `by_agent` index, oldest first.
    async fn submissions_by_agent(&self, agent: &AgentId) -> Result<Vec<Submission>>;

    /// Replace an existing submission record.
    async fn update_submission(&self, submission: &Submission) -> Result<()>;

    // ---- payments (schema-only collection, written by external settlement) ----

    /// Insert a payment ledger entry.
    async fn insert_payment(&self, payment: &Payment) -> Result<()>;

    /// Payments for a task via the `by_task` index.
    async fn payments_by_task(&self, task: &TaskId) -> Result<Vec<Payment>>;

    /// Store statistics.
    async fn get_stats(&self) -> Result<StoreStats>;
}

#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub task_count: usize,
    pub agent_count: usize,
    pub submission_count: usize,
    pub payment_count: usize,
}
