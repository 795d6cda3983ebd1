use agora_store::StoreError;
use agora_types::{AgentId, TaskId, TaskStatus, WalletAddress};
use thiserror::Error;

/// Marketplace error types
#[derive(Error, Debug)]
pub enum MarketError {
    /// Referenced task absent
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// Referenced agent absent
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    /// Action attempted outside its allowed status
    #[error("Invalid state: task {task} is {status}, cannot {action}")]
    InvalidState {
        task: TaskId,
        status: TaskStatus,
        action: &'static str,
    },

    /// Submitting agent does not match the claimer
    #[error("Not authorized: agent {agent} did not claim task {task}")]
    NotAuthorized { task: TaskId, agent: AgentId },

    /// Wallet already registered
    #[error("Agent with wallet {0} already exists")]
    DuplicateWallet(WalletAddress),

    /// Store backend failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for marketplace operations
pub type Result<T> = std::result::Result<T, MarketError>;
