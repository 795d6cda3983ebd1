use crate::config::NodeConfig;
use agora_market::{
    AgentRegistry, AgentStats, RegistryConfig, TaskConfig, TaskManager, TaskStats,
};
use agora_store::{MemoryBackend, StoreBackend};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// The assembled marketplace service: store plus the two handler layers.
#[derive(Clone)]
pub struct AgoraNode {
    pub config: Arc<NodeConfig>,
    pub store: Arc<dyn StoreBackend>,
    pub tasks: Arc<TaskManager>,
    pub agents: Arc<AgentRegistry>,
    started_at: Instant,
}

impl AgoraNode {
    pub fn new(config: NodeConfig) -> Result<Self> {
        let store: Arc<dyn StoreBackend> = Arc::new(MemoryBackend::new());

        let task_config = TaskConfig {
            list_limit: config.market.list_limit,
        };
        let registry_config = RegistryConfig {
            default_top_limit: config.market.top_agents_limit,
        };

        let tasks = Arc::new(TaskManager::new(task_config, store.clone()));
        let agents = Arc::new(AgentRegistry::new(registry_config, store.clone()));

        info!(name = %config.node.name, "🚀 Node assembled");

        Ok(Self {
            config: Arc::new(config),
            store,
            tasks,
            agents,
            started_at: Instant::now(),
        })
    }

    pub async fn get_stats(&self) -> Result<NodeStats> {
        let store = self.store.get_stats().await?;
        let tasks = self.tasks.get_stats().await?;
        let agents = self.agents.get_stats().await?;

        Ok(NodeStats {
            name: self.config.node.name.clone(),
            uptime_secs: self.started_at.elapsed().as_secs(),
            task_count: store.task_count,
            submission_count: store.submission_count,
            payment_count: store.payment_count,
            tasks,
            agents,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeStats {
    pub name: String,
    pub uptime_secs: u64,
    pub task_count: usize,
    pub submission_count: usize,
    pub payment_count: usize,
    pub tasks: TaskStats,
    pub agents: AgentStats,
}
