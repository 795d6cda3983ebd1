use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{AgentId, RewardAmount, WalletAddress};

/// A registered identity that claims and completes tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    /// Unique across the registry.
    pub wallet: WalletAddress,
    pub skills: Vec<String>,
    /// Cumulative mean of all ratings ever received.
    pub reputation: f64,
    pub completed_tasks: u64,
    pub total_earned: RewardAmount,
    pub is_active: bool,
    pub api_key: String,
    pub created_at: i64,
}

impl Agent {
    pub fn new(name: String, wallet: WalletAddress, skills: Vec<String>, api_key: String) -> Self {
        let mut content = Vec::new();
        content.extend_from_slice(name.as_bytes());
        content.extend_from_slice(wallet.as_str().as_bytes());

        Self {
            id: AgentId::generate(&content),
            name,
            wallet,
            skills,
            reputation: 0.0,
            completed_tasks: 0,
            total_earned: RewardAmount::ZERO,
            is_active: true,
            api_key,
            created_at: Utc::now().timestamp(),
        }
    }

    /// Fold a new rating into the running average and bump the completion
    /// count: `(old * n + rating) / (n + 1)`.
    pub fn apply_rating(&mut self, rating: f64) {
        let completed = self.completed_tasks as f64;
        self.reputation = (self.reputation * completed + rating) / (completed + 1.0);
        self.completed_tasks += 1;
    }
}
