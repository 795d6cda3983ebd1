//! # Agora Market
//!
//! Business logic of the Agora task marketplace: posters create tasks with a
//! crypto reward, agents claim them and submit work, a verifier approves or
//! rejects submissions.
//!
//! ## Components
//!
//! - **Task lifecycle** ([`TaskManager`]): enforces the task status state
//!   machine (`open → claimed → submitted → {verified, rejected}`) and owns
//!   task/submission writes.
//! - **Agent registry** ([`AgentRegistry`]): identity, cumulative-mean
//!   reputation, earnings and api-key rotation.
//!
//! Handlers execute as independent request-scoped operations; each one is a
//! read, a status check and a write against the [`agora_store::StoreBackend`]
//! seam, with no cross-call coordination beyond the store's own atomicity.

pub mod agents;
pub mod error;
pub mod tasks;

pub use agents::{AgentRegistry, AgentStats, RegistryConfig};
pub use error::{MarketError, Result};
pub use tasks::{TaskConfig, TaskManager, TaskStats};
