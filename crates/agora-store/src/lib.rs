//! Document store seam for the Agora marketplace.
//!
//! The hosted database the service runs against is an external collaborator;
//! [`StoreBackend`] is the boundary the handlers talk to, and
//! [`MemoryBackend`] is the in-process implementation used for development
//! and tests. It maintains the same secondary indexes the hosted schema
//! declares: `by_status`, `by_poster`, `by_claimer` on tasks, `by_wallet`
//! and `by_reputation` on agents, `by_task` and `by_agent` on submissions,
//! `by_task` on payments.

pub mod backend;
pub mod memory;

pub use backend::{Result, StoreBackend, StoreError, StoreStats};
pub use memory::MemoryBackend;
