use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{PaymentId, RewardAmount, TaskId, WalletAddress};

/// Escrow ledger entry status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Escrow,
    Released,
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Escrow => "escrow",
            PaymentStatus::Released => "released",
            PaymentStatus::Refunded => "refunded",
        };
        write!(f, "{}", s)
    }
}

/// Escrow/release/refund ledger entry.
///
/// Schema-only: no handler in this repository writes payments; settlement
/// is executed by an external collaborator against the same store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub task_id: TaskId,
    pub from: WalletAddress,
    pub to: WalletAddress,
    pub amount: RewardAmount,
    pub tx_hash: Option<String>,
    pub status: PaymentStatus,
    pub created_at: i64,
}

impl Payment {
    pub fn new(
        task_id: TaskId,
        from: WalletAddress,
        to: WalletAddress,
        amount: RewardAmount,
    ) -> Self {
        let mut content = Vec::new();
        content.extend_from_slice(task_id.as_bytes());
        content.extend_from_slice(from.as_str().as_bytes());
        content.extend_from_slice(to.as_str().as_bytes());

        Self {
            id: PaymentId::generate(&content),
            task_id,
            from,
            to,
            amount,
            tx_hash: None,
            status: PaymentStatus::Pending,
            created_at: Utc::now().timestamp(),
        }
    }
}
