use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypeError;
use crate::{AgentId, RewardAmount, TaskId, WalletAddress};

/// Currency label stamped on every task at creation.
pub const TASK_CURRENCY: &str = "USDC";
/// Chain label stamped on every task at creation.
pub const TASK_CHAIN: &str = "polygon";

/// Closed set of task categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Research,
    Code,
    Data,
    Content,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskKind::Research => "research",
            TaskKind::Code => "code",
            TaskKind::Data => "data",
            TaskKind::Content => "content",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for TaskKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "research" => Ok(TaskKind::Research),
            "code" => Ok(TaskKind::Code),
            "data" => Ok(TaskKind::Data),
            "content" => Ok(TaskKind::Content),
            other => Err(TypeError::UnknownTaskKind(other.to_string())),
        }
    }
}

/// Task lifecycle status.
///
/// `Disputed` is reserved in the schema; no operation currently transitions
/// into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Open,
    Claimed,
    Submitted,
    Verified,
    Rejected,
    Disputed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::Rejected)
    }

    /// Transition relation enforced by claim and submit. Verification is
    /// allowed from any status and does not consult this relation.
    pub fn can_transition_to(&self, next: &Self) -> bool {
        use TaskStatus::*;
        match (self, next) {
            (Open, Claimed) => true,
            (Claimed, Submitted) => true,
            (Submitted, Verified) => true,
            (Submitted, Rejected) => true,

            // Terminal states cannot transition
            (Verified, _) | (Rejected, _) => false,

            _ => false,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Open => "open",
            TaskStatus::Claimed => "claimed",
            TaskStatus::Submitted => "submitted",
            TaskStatus::Verified => "verified",
            TaskStatus::Rejected => "rejected",
            TaskStatus::Disputed => "disputed",
        };
        write!(f, "{}", s)
    }
}

/// Structured verification criteria attached to a task. All sub-fields are
/// optional; an empty value is the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u64>,
}

/// A postable unit of work with a reward, kind and status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub kind: TaskKind,
    pub reward: RewardAmount,
    pub currency: String,
    pub chain: String,
    /// Poster identity; mirrors the poster wallet.
    pub poster_id: WalletAddress,
    pub poster_wallet: WalletAddress,
    pub claimed_by: Option<AgentId>,
    pub claimed_at: Option<i64>,
    pub submitted_at: Option<i64>,
    pub submitted_data: Option<serde_json::Value>,
    pub status: TaskStatus,
    pub verification_criteria: VerificationCriteria,
    pub deadline: Option<i64>,
    pub created_at: i64,
}

impl Task {
    pub fn new(
        title: String,
        description: String,
        kind: TaskKind,
        reward: RewardAmount,
        poster_wallet: WalletAddress,
        verification_criteria: Option<VerificationCriteria>,
        deadline: Option<i64>,
    ) -> Self {
        let mut content = Vec::new();
        content.extend_from_slice(title.as_bytes());
        content.extend_from_slice(poster_wallet.as_str().as_bytes());
        content.extend_from_slice(&reward.to_base_units().to_le_bytes());

        Self {
            id: TaskId::generate(&content),
            title,
            description,
            kind,
            reward,
            currency: TASK_CURRENCY.to_string(),
            chain: TASK_CHAIN.to_string(),
            poster_id: poster_wallet.clone(),
            poster_wallet,
            claimed_by: None,
            claimed_at: None,
            submitted_at: None,
            submitted_data: None,
            status: TaskStatus::Open,
            verification_criteria: verification_criteria.unwrap_or_default(),
            deadline,
            created_at: Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet() -> WalletAddress {
        WalletAddress::new("0x1111111111111111111111111111111111111111").unwrap()
    }

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new(
            "Label images".to_string(),
            "Label 100 images".to_string(),
            TaskKind::Data,
            RewardAmount::from_usdc(25.0),
            wallet(),
            None,
            None,
        );

        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.currency, "USDC");
        assert_eq!(task.chain, "polygon");
        assert_eq!(task.poster_id, task.poster_wallet);
        assert_eq!(task.verification_criteria, VerificationCriteria::default());
        assert!(task.claimed_by.is_none());
    }

    #[test]
    fn test_status_transitions() {
        use TaskStatus::*;
        assert!(Open.can_transition_to(&Claimed));
        assert!(Claimed.can_transition_to(&Submitted));
        assert!(Submitted.can_transition_to(&Verified));
        assert!(Submitted.can_transition_to(&Rejected));

        assert!(!Open.can_transition_to(&Submitted));
        assert!(!Claimed.can_transition_to(&Open));
        assert!(!Verified.can_transition_to(&Open));
        assert!(!Rejected.can_transition_to(&Claimed));
    }

    #[test]
    fn test_terminal_states() {
        assert!(TaskStatus::Verified.is_terminal());
        assert!(TaskStatus::Rejected.is_terminal());
        assert!(!TaskStatus::Open.is_terminal());
        assert!(!TaskStatus::Disputed.is_terminal());
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [TaskKind::Research, TaskKind::Code, TaskKind::Data, TaskKind::Content] {
            assert_eq!(kind.to_string().parse::<TaskKind>().unwrap(), kind);
        }
        assert!("video".parse::<TaskKind>().is_err());
    }
}
