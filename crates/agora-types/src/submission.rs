use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{AgentId, SubmissionId, TaskId};

/// A record of work product tied to one task/agent pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub task_id: TaskId,
    pub agent_id: AgentId,
    pub data: serde_json::Value,
    pub verified: bool,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub created_at: i64,
}

impl Submission {
    pub fn new(task_id: TaskId, agent_id: AgentId, data: serde_json::Value) -> Self {
        let mut content = Vec::new();
        content.extend_from_slice(task_id.as_bytes());
        content.extend_from_slice(agent_id.as_bytes());

        Self {
            id: SubmissionId::generate(&content),
            task_id,
            agent_id,
            data,
            verified: false,
            score: None,
            feedback: None,
            created_at: Utc::now().timestamp(),
        }
    }
}
