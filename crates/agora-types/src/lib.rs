//! Core record types for the Agora task marketplace: identifiers, amounts,
//! wallet addresses and the four persisted record shapes (tasks, agents,
//! submissions, payments).

pub mod agent;
pub mod amount;
pub mod error;
pub mod id;
pub mod payment;
pub mod submission;
pub mod task;
pub mod wallet;

pub use agent::Agent;
pub use amount::{RewardAmount, USDC_BASE_UNIT, USDC_DECIMALS};
pub use error::TypeError;
pub use id::{AgentId, PaymentId, SubmissionId, TaskId};
pub use payment::{Payment, PaymentStatus};
pub use submission::Submission;
pub use task::{
    Task, TaskKind, TaskStatus, VerificationCriteria, TASK_CHAIN, TASK_CURRENCY,
};
pub use wallet::WalletAddress;
