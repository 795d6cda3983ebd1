//! Task lifecycle handlers.
//!
//! Every operation is a single-record read, a status check, and a
//! single-record write against the store:
//!
//! ```text
//! open --claim--> claimed --submit--> submitted --verify(approved)--> verified
//!                                               --verify(!approved)--> rejected
//! ```
//!
//! Verification is the exception to the transition relation: it applies to
//! any existing task regardless of prior status, acting as a verifier
//! override. `disputed` is reserved in the schema and never entered.

use crate::error::{MarketError, Result};
use agora_store::StoreBackend;
use agora_types::{
    AgentId, RewardAmount, Submission, SubmissionId, Task, TaskId, TaskKind, TaskStatus,
    VerificationCriteria, WalletAddress,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration for the task lifecycle layer
#[derive(Debug, Clone)]
pub struct TaskConfig {
    /// Maximum records returned by list queries
    pub list_limit: usize,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self { list_limit: 50 }
    }
}

/// Task manager enforces the task status state machine and owns the single
/// source of truth for task state.
pub struct TaskManager {
    config: TaskConfig,
    store: Arc<dyn StoreBackend>,
}

impl TaskManager {
    pub fn new(config: TaskConfig, store: Arc<dyn StoreBackend>) -> Self {
        Self { config, store }
    }

    /// Post a new task. Currency and chain are fixed platform constants;
    /// the poster wallet doubles as the poster identity.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_task(
        &self,
        title: String,
        description: String,
        kind: TaskKind,
        reward: RewardAmount,
        poster_wallet: WalletAddress,
        verification_criteria: Option<VerificationCriteria>,
        deadline: Option<i64>,
    ) -> Result<TaskId> {
        let task = Task::new(
            title,
            description,
            kind,
            reward,
            poster_wallet,
            verification_criteria,
            deadline,
        );
        let task_id = task.id;

        self.store.insert_task(&task).await?;

        info!(
            task_id = %task_id,
            kind = %task.kind,
            reward = %task.reward,
            poster = %task.poster_wallet.short(),
            "📋 Task posted"
        );

        Ok(task_id)
    }

    /// Reserve an open task for an agent.
    pub async fn claim_task(&self, task_id: &TaskId, agent_id: &AgentId) -> Result<()> {
        let mut task = self
            .store
            .get_task(task_id)
            .await?
            .ok_or(MarketError::TaskNotFound(*task_id))?;

        if !task.status.can_transition_to(&TaskStatus::Claimed) {
            return Err(MarketError::InvalidState {
                task: *task_id,
                status: task.status,
                action: "claim",
            });
        }

        task.status = TaskStatus::Claimed;
        task.claimed_by = Some(*agent_id);
        task.claimed_at = Some(Utc::now().timestamp());
        self.store.update_task(&task).await?;

        info!(
            task_id = %task_id,
            agent_id = %agent_id,
            "👷 Task claimed"
        );

        Ok(())
    }

    /// Submit work product for a claimed task. Records the payload on the
    /// task and inserts a submission record with `verified = false`.
    ///
    /// A submission insert failing after the task patch is not rolled back;
    /// there is no cross-write compensation.
    pub async fn submit_work(
        &self,
        task_id: &TaskId,
        agent_id: &AgentId,
        data: serde_json::Value,
    ) -> Result<SubmissionId> {
        let mut task = self
            .store
            .get_task(task_id)
            .await?
            .ok_or(MarketError::TaskNotFound(*task_id))?;

        if task.claimed_by != Some(*agent_id) {
            return Err(MarketError::NotAuthorized {
                task: *task_id,
                agent: *agent_id,
            });
        }

        if !task.status.can_transition_to(&TaskStatus::Submitted) {
            return Err(MarketError::InvalidState {
                task: *task_id,
                status: task.status,
                action: "submit",
            });
        }

        task.status = TaskStatus::Submitted;
        task.submitted_at = Some(Utc::now().timestamp());
        task.submitted_data = Some(data.clone());
        self.store.update_task(&task).await?;

        let submission = Submission::new(*task_id, *agent_id, data);
        let submission_id = submission.id;
        self.store.insert_submission(&submission).await?;

        info!(
            task_id = %task_id,
            agent_id = %agent_id,
            submission_id = %submission_id,
            "📦 Work submitted"
        );

        Ok(submission_id)
    }

    /// Approve or reject a task's submitted work.
    ///
    /// Deliberately does not check the prior status: a verifier can rule on
    /// a task in any state. The oldest submission for the task is patched
    /// with the outcome; if the task has no submission record, that update
    /// is skipped.
    pub async fn verify_submission(
        &self,
        task_id: &TaskId,
        approved: bool,
        score: Option<f64>,
        feedback: Option<String>,
    ) -> Result<()> {
        let mut task = self
            .store
            .get_task(task_id)
            .await?
            .ok_or(MarketError::TaskNotFound(*task_id))?;

        task.status = if approved {
            TaskStatus::Verified
        } else {
            TaskStatus::Rejected
        };
        self.store.update_task(&task).await?;

        let submissions = self.store.submissions_by_task(task_id).await?;
        if let Some(mut submission) = submissions.into_iter().next() {
            submission.verified = approved;
            submission.score = score;
            submission.feedback = feedback;
            self.store.update_submission(&submission).await?;
        } else {
            debug!(task_id = %task_id, "No submission record to patch");
        }

        if approved {
            info!(task_id = %task_id, score = ?score, "✅ Submission verified");
        } else {
            info!(task_id = %task_id, score = ?score, "❌ Submission rejected");
        }

        Ok(())
    }

    /// Open tasks, newest first.
    pub async fn get_open_tasks(&self) -> Result<Vec<Task>> {
        Ok(self
            .store
            .tasks_by_status(TaskStatus::Open, self.config.list_limit)
            .await?)
    }

    /// Fetch a single task.
    pub async fn get_task(&self, task_id: &TaskId) -> Result<Option<Task>> {
        Ok(self.store.get_task(task_id).await?)
    }

    /// Tasks created by a poster, newest first.
    pub async fn get_tasks_by_poster(&self, poster: &WalletAddress) -> Result<Vec<Task>> {
        Ok(self
            .store
            .tasks_by_poster(poster, self.config.list_limit)
            .await?)
    }

    /// Tasks claimed by an agent, newest first.
    pub async fn get_tasks_by_agent(&self, agent: &AgentId) -> Result<Vec<Task>> {
        Ok(self
            .store
            .tasks_by_claimer(agent, self.config.list_limit)
            .await?)
    }

    /// Get statistics
    pub async fn get_stats(&self) -> Result<TaskStats> {
        let mut stats = TaskStats::default();
        for (status, slot) in [
            (TaskStatus::Open, &mut stats.open),
            (TaskStatus::Claimed, &mut stats.claimed),
            (TaskStatus::Submitted, &mut stats.submitted),
            (TaskStatus::Verified, &mut stats.verified),
            (TaskStatus::Rejected, &mut stats.rejected),
        ] {
            *slot = self.store.tasks_by_status(status, usize::MAX).await?.len() as u64;
        }
        Ok(stats)
    }
}

/// Task lifecycle statistics
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TaskStats {
    pub open: u64,
    pub claimed: u64,
    pub submitted: u64,
    pub verified: u64,
    pub rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_store::MemoryBackend;

    fn wallet(n: u8) -> WalletAddress {
        WalletAddress::new(&format!("0x{:040x}", n)).unwrap()
    }

    fn setup() -> TaskManager {
        TaskManager::new(TaskConfig::default(), Arc::new(MemoryBackend::new()))
    }

    async fn post_task(manager: &TaskManager) -> TaskId {
        manager
            .create_task(
                "Summarize papers".to_string(),
                "Summarize 10 arxiv papers".to_string(),
                TaskKind::Research,
                RewardAmount::from_usdc(50.0),
                wallet(1),
                None,
                None,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_task_is_open() {
        let manager = setup();
        let task_id = post_task(&manager).await;

        let task = manager.get_task(&task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.currency, "USDC");
        assert_eq!(task.chain, "polygon");
    }

    #[tokio::test]
    async fn test_claim_open_task() {
        let manager = setup();
        let task_id = post_task(&manager).await;
        let agent = AgentId::generate(b"agent");

        manager.claim_task(&task_id, &agent).await.unwrap();

        let task = manager.get_task(&task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Claimed);
        assert_eq!(task.claimed_by, Some(agent));
        assert!(task.claimed_at.is_some());
    }

    #[tokio::test]
    async fn test_double_claim_keeps_first_claimer() {
        let manager = setup();
        let task_id = post_task(&manager).await;
        let first = AgentId::generate(b"first");
        let second = AgentId::generate(b"second");

        manager.claim_task(&task_id, &first).await.unwrap();
        let err = manager.claim_task(&task_id, &second).await.unwrap_err();
        assert!(matches!(err, MarketError::InvalidState { .. }));

        let task = manager.get_task(&task_id).await.unwrap().unwrap();
        assert_eq!(task.claimed_by, Some(first));
    }

    #[tokio::test]
    async fn test_claim_missing_task() {
        let manager = setup();
        let missing = TaskId::generate(b"missing");
        let agent = AgentId::generate(b"agent");

        let err = manager.claim_task(&missing, &agent).await.unwrap_err();
        assert!(matches!(err, MarketError::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn test_submit_work_records_submission() {
        let manager = setup();
        let task_id = post_task(&manager).await;
        let agent = AgentId::generate(b"agent");

        manager.claim_task(&task_id, &agent).await.unwrap();
        let submission_id = manager
            .submit_work(&task_id, &agent, serde_json::json!({"result": "done"}))
            .await
            .unwrap();

        let task = manager.get_task(&task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Submitted);
        assert!(task.submitted_at.is_some());
        assert_eq!(
            task.submitted_data,
            Some(serde_json::json!({"result": "done"}))
        );

        let submission = manager
            .store
            .get_submission(&submission_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!submission.verified);
    }

    #[tokio::test]
    async fn test_submit_by_non_claimer_rejected() {
        let manager = setup();
        let task_id = post_task(&manager).await;
        let claimer = AgentId::generate(b"claimer");
        let intruder = AgentId::generate(b"intruder");

        manager.claim_task(&task_id, &claimer).await.unwrap();
        let err = manager
            .submit_work(&task_id, &intruder, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::NotAuthorized { .. }));

        let task = manager.get_task(&task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Claimed);
    }

    #[tokio::test]
    async fn test_submit_unclaimed_task_rejected() {
        let manager = setup();
        let task_id = post_task(&manager).await;
        let agent = AgentId::generate(b"agent");

        // Unclaimed task has no claimer, so the authorization check fires
        // before the status check.
        let err = manager
            .submit_work(&task_id, &agent, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::NotAuthorized { .. }));
    }

    #[tokio::test]
    async fn test_verify_approves_and_patches_submission() {
        let manager = setup();
        let task_id = post_task(&manager).await;
        let agent = AgentId::generate(b"agent");

        manager.claim_task(&task_id, &agent).await.unwrap();
        let submission_id = manager
            .submit_work(&task_id, &agent, serde_json::json!({"ok": true}))
            .await
            .unwrap();

        manager
            .verify_submission(&task_id, true, Some(4.5), Some("solid".to_string()))
            .await
            .unwrap();

        let task = manager.get_task(&task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Verified);

        let submission = manager
            .store
            .get_submission(&submission_id)
            .await
            .unwrap()
            .unwrap();
        assert!(submission.verified);
        assert_eq!(submission.score, Some(4.5));
        assert_eq!(submission.feedback.as_deref(), Some("solid"));
    }

    #[tokio::test]
    async fn test_verify_rejection() {
        let manager = setup();
        let task_id = post_task(&manager).await;
        let agent = AgentId::generate(b"agent");

        manager.claim_task(&task_id, &agent).await.unwrap();
        manager
            .submit_work(&task_id, &agent, serde_json::json!({}))
            .await
            .unwrap();

        manager
            .verify_submission(&task_id, false, Some(1.0), None)
            .await
            .unwrap();

        let task = manager.get_task(&task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Rejected);
    }

    #[tokio::test]
    async fn test_verify_accepts_any_prior_status() {
        // Verification intentionally skips the transition relation; ruling
        // on an open task with no submission succeeds.
        let manager = setup();
        let task_id = post_task(&manager).await;

        manager
            .verify_submission(&task_id, true, None, None)
            .await
            .unwrap();

        let task = manager.get_task(&task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Verified);
    }

    #[tokio::test]
    async fn test_open_tasks_cap_and_filter() {
        let manager = setup();
        for _ in 0..55 {
            post_task(&manager).await;
        }
        let agent = AgentId::generate(b"agent");
        let claimed_id = post_task(&manager).await;
        manager.claim_task(&claimed_id, &agent).await.unwrap();

        let open = manager.get_open_tasks().await.unwrap();
        assert_eq!(open.len(), 50);
        assert!(open.iter().all(|t| t.status == TaskStatus::Open));
    }

    #[tokio::test]
    async fn test_tasks_by_poster_and_agent() {
        let manager = setup();
        let task_id = post_task(&manager).await;
        let agent = AgentId::generate(b"agent");
        manager.claim_task(&task_id, &agent).await.unwrap();

        let by_poster = manager.get_tasks_by_poster(&wallet(1)).await.unwrap();
        assert_eq!(by_poster.len(), 1);

        let by_agent = manager.get_tasks_by_agent(&agent).await.unwrap();
        assert_eq!(by_agent.len(), 1);
        assert_eq!(by_agent[0].id, task_id);
    }

    #[tokio::test]
    async fn test_stats_counts_by_status() {
        let manager = setup();
        let a = post_task(&manager).await;
        let _b = post_task(&manager).await;
        let agent = AgentId::generate(b"agent");
        manager.claim_task(&a, &agent).await.unwrap();

        let stats = manager.get_stats().await.unwrap();
        assert_eq!(stats.open, 1);
        assert_eq!(stats.claimed, 1);
        assert_eq!(stats.submitted, 0);
    }
}
