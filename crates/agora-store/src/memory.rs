use crate::backend::{Result, StoreBackend, StoreError, StoreStats};
use agora_types::{
    Agent, AgentId, Payment, PaymentId, Submission, SubmissionId, Task, TaskId, TaskStatus,
    WalletAddress,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory store backend for development and tests.
///
/// Index vectors hold ids in insertion order; newest-first queries iterate
/// them in reverse. All maps guarding one collection share a single lock so
/// a record write and its index updates are atomic as a unit, mirroring the
/// per-call atomicity of the hosted database.
pub struct MemoryBackend {
    tasks: Arc<RwLock<TaskTable>>,
    agents: Arc<RwLock<AgentTable>>,
    submissions: Arc<RwLock<SubmissionTable>>,
    payments: Arc<RwLock<PaymentTable>>,
}

#[derive(Default)]
struct TaskTable {
    records: HashMap<TaskId, Task>,
    by_status: HashMap<TaskStatus, Vec<TaskId>>,
    by_poster: HashMap<WalletAddress, Vec<TaskId>>,
    by_claimer: HashMap<AgentId, Vec<TaskId>>,
}

#[derive(Default)]
struct AgentTable {
    records: HashMap<AgentId, Agent>,
    by_wallet: HashMap<WalletAddress, AgentId>,
}

#[derive(Default)]
struct SubmissionTable {
    records: HashMap<SubmissionId, Submission>,
    by_task: HashMap<TaskId, Vec<SubmissionId>>,
    by_agent: HashMap<AgentId, Vec<SubmissionId>>,
}

#[derive(Default)]
struct PaymentTable {
    records: HashMap<PaymentId, Payment>,
    by_task: HashMap<TaskId, Vec<PaymentId>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(TaskTable::default())),
            agents: Arc::new(RwLock::new(AgentTable::default())),
            submissions: Arc::new(RwLock::new(SubmissionTable::default())),
            payments: Arc::new(RwLock::new(PaymentTable::default())),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn insert_task(&self, task: &Task) -> Result<()> {
        let mut table = self.tasks.write().await;

        if table.records.contains_key(&task.id) {
            return Err(StoreError::AlreadyExists(task.id.to_string()));
        }

        table
            .by_status
            .entry(task.status)
            .or_default()
            .push(task.id);
        table
            .by_poster
            .entry(task.poster_id.clone())
            .or_default()
            .push(task.id);
        if let Some(claimer) = task.claimed_by {
            table.by_claimer.entry(claimer).or_default().push(task.id);
        }
        table.records.insert(task.id, task.clone());

        Ok(())
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        let table = self.tasks.read().await;
        Ok(table.records.get(id).cloned())
    }

    async fn update_task(&self, task: &Task) -> Result<()> {
        let mut table = self.tasks.write().await;

        let old = table
            .records
            .get(&task.id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(task.id.to_string()))?;

        if old.status != task.status {
            if let Some(ids) = table.by_status.get_mut(&old.status) {
                ids.retain(|id| id != &task.id);
            }
            table
                .by_status
                .entry(task.status)
                .or_default()
                .push(task.id);
        }

        if old.claimed_by != task.claimed_by {
            if let Some(prev) = old.claimed_by {
                if let Some(ids) = table.by_claimer.get_mut(&prev) {
                    ids.retain(|id| id != &task.id);
                }
            }
            if let Some(claimer) = task.claimed_by {
                table.by_claimer.entry(claimer).or_default().push(task.id);
            }
        }

        table.records.insert(task.id, task.clone());
        Ok(())
    }

    async fn tasks_by_status(&self, status: TaskStatus, limit: usize) -> Result<Vec<Task>> {
        let table = self.tasks.read().await;
        let ids = match table.by_status.get(&status) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };
        Ok(ids
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| table.records.get(id).cloned())
            .collect())
    }

    async fn tasks_by_poster(&self, poster: &WalletAddress, limit: usize) -> Result<Vec<Task>> {
        let table = self.tasks.read().await;
        let ids = match table.by_poster.get(poster) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };
        Ok(ids
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| table.records.get(id).cloned())
            .collect())
    }

    async fn tasks_by_claimer(&self, agent: &AgentId, limit: usize) -> Result<Vec<Task>> {
        let table = self.tasks.read().await;
        let ids = match table.by_claimer.get(agent) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };
        Ok(ids
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| table.records.get(id).cloned())
            .collect())
    }

    async fn insert_agent(&self, agent: &Agent) -> Result<()> {
        let mut table = self.agents.write().await;

        if table.records.contains_key(&agent.id) {
            return Err(StoreError::AlreadyExists(agent.id.to_string()));
        }
        if table.by_wallet.contains_key(&agent.wallet) {
            return Err(StoreError::AlreadyExists(agent.wallet.to_string()));
        }

        table.by_wallet.insert(agent.wallet.clone(), agent.id);
        table.records.insert(agent.id, agent.clone());
        Ok(())
    }

    async fn get_agent(&self, id: &AgentId) -> Result<Option<Agent>> {
        let table = self.agents.read().await;
        Ok(table.records.get(id).cloned())
    }

    async fn get_agent_by_wallet(&self, wallet: &WalletAddress) -> Result<Option<Agent>> {
        let table = self.agents.read().await;
        Ok(table
            .by_wallet
            .get(wallet)
            .and_then(|id| table.records.get(id))
            .cloned())
    }

    async fn update_agent(&self, agent: &Agent) -> Result<()> {
        let mut table = self.agents.write().await;

        if !table.records.contains_key(&agent.id) {
            return Err(StoreError::NotFound(agent.id.to_string()));
        }

        table.records.insert(agent.id, agent.clone());
        Ok(())
    }

    async fn top_agents_by_reputation(&self, limit: usize) -> Result<Vec<Agent>> {
        let table = self.agents.read().await;
        let mut agents: Vec<Agent> = table
            .records
            .values()
            .filter(|a| a.reputation > 0.0)
            .cloned()
            .collect();
        agents.sort_by(|a, b| {
            b.reputation
                .partial_cmp(&a.reputation)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        agents.truncate(limit);
        Ok(agents)
    }

    async fn insert_submission(&self, submission: &Submission) -> Result<()> {
        let mut table = self.submissions.write().await;

        if table.records.contains_key(&submission.id) {
            return Err(StoreError::AlreadyExists(submission.id.to_string()));
        }

        table
            .by_task
            .entry(submission.task_id)
            .or_default()
            .push(submission.id);
        table
            .by_agent
            .entry(submission.agent_id)
            .or_default()
            .push(submission.id);
        table.records.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn get_submission(&self, id: &SubmissionId) -> Result<Option<Submission>> {
        let table = self.submissions.read().await;
        Ok(table.records.get(id).cloned())
    }

    async fn submissions_by_task(&self, task: &TaskId) -> Result<Vec<Submission>> {
        let table = self.submissions.read().await;
        let ids = match table.by_task.get(task) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };
        Ok(ids
            .iter()
            .filter_map(|id| table.records.get(id).cloned())
            .collect())
    }

    async fn submissions_by_agent(&self, agent: &AgentId) -> Result<Vec<Submission>> {
        let table = self.submissions.read().await;
        let ids = match table.by_agent.get(agent) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };
        Ok(ids
            .iter()
            .filter_map(|id| table.records.get(id).cloned())
            .collect())
    }

    async fn update_submission(&self, submission: &Submission) -> Result<()> {
        let mut table = self.submissions.write().await;

        if !table.records.contains_key(&submission.id) {
            return Err(StoreError::NotFound(submission.id.to_string()));
        }

        table.records.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<()> {
        let mut table = self.payments.write().await;

        if table.records.contains_key(&payment.id) {
            return Err(StoreError::AlreadyExists(payment.id.to_string()));
        }

        table
            .by_task
            .entry(payment.task_id)
            .or_default()
            .push(payment.id);
        table.records.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn payments_by_task(&self, task: &TaskId) -> Result<Vec<Payment>> {
        let table = self.payments.read().await;
        let ids = match table.by_task.get(task) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };
        Ok(ids
            .iter()
            .filter_map(|id| table.records.get(id).cloned())
            .collect())
    }

    async fn get_stats(&self) -> Result<StoreStats> {
        let tasks = self.tasks.read().await;
        let agents = self.agents.read().await;
        let submissions = self.submissions.read().await;
        let payments = self.payments.read().await;

        Ok(StoreStats {
            task_count: tasks.records.len(),
            agent_count: agents.records.len(),
            submission_count: submissions.records.len(),
            payment_count: payments.records.len(),
        })
    }
}
