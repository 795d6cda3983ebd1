//! Agent registry: identity and reputation bookkeeping.

use crate::error::{MarketError, Result};
use agora_store::{StoreBackend, StoreError};
use agora_types::{Agent, AgentId, RewardAmount, WalletAddress};
use rand::Rng;
use std::sync::Arc;
use tracing::info;

const API_KEY_PREFIX: &str = "ag_";
const API_KEY_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const API_KEY_RUN_LEN: usize = 13;

/// Configuration for the agent registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Default result size for top-agent queries
    pub default_top_limit: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_top_limit: 10,
        }
    }
}

/// Agent registry handles registration, reputation and earnings.
pub struct AgentRegistry {
    config: RegistryConfig,
    store: Arc<dyn StoreBackend>,
}

impl AgentRegistry {
    pub fn new(config: RegistryConfig, store: Arc<dyn StoreBackend>) -> Self {
        Self { config, store }
    }

    /// Register a new agent. Wallets are unique across the registry; the
    /// existence check and the insert run against the same store, which
    /// additionally enforces wallet uniqueness on insert.
    pub async fn register_agent(
        &self,
        name: String,
        wallet: WalletAddress,
        skills: Vec<String>,
    ) -> Result<AgentId> {
        if self.store.get_agent_by_wallet(&wallet).await?.is_some() {
            return Err(MarketError::DuplicateWallet(wallet));
        }

        let agent = Agent::new(name, wallet.clone(), skills, generate_api_key());
        let agent_id = agent.id;

        self.store.insert_agent(&agent).await.map_err(|e| match e {
            StoreError::AlreadyExists(_) => MarketError::DuplicateWallet(wallet.clone()),
            other => MarketError::Store(other),
        })?;

        info!(
            agent_id = %agent_id,
            wallet = %wallet.short(),
            name = %agent.name,
            "🤖 Agent registered"
        );

        Ok(agent_id)
    }

    /// Fetch an agent by id.
    pub async fn get_agent(&self, agent_id: &AgentId) -> Result<Option<Agent>> {
        Ok(self.store.get_agent(agent_id).await?)
    }

    /// Fetch an agent by wallet.
    pub async fn get_agent_by_wallet(&self, wallet: &WalletAddress) -> Result<Option<Agent>> {
        Ok(self.store.get_agent_by_wallet(wallet).await?)
    }

    /// Fold a new rating into the agent's cumulative average and bump the
    /// completed-task count. Ratings are not bounds-checked.
    pub async fn update_reputation(&self, agent_id: &AgentId, rating: f64) -> Result<()> {
        let mut agent = self
            .store
            .get_agent(agent_id)
            .await?
            .ok_or(MarketError::AgentNotFound(*agent_id))?;

        agent.apply_rating(rating);
        self.store.update_agent(&agent).await?;

        info!(
            agent_id = %agent_id,
            rating = rating,
            reputation = agent.reputation,
            completed = agent.completed_tasks,
            "⭐ Reputation updated"
        );

        Ok(())
    }

    /// Add to an agent's cumulative earnings.
    pub async fn add_earnings(&self, agent_id: &AgentId, amount: RewardAmount) -> Result<()> {
        let mut agent = self
            .store
            .get_agent(agent_id)
            .await?
            .ok_or(MarketError::AgentNotFound(*agent_id))?;

        agent.total_earned = agent.total_earned.saturating_add(amount);
        self.store.update_agent(&agent).await?;

        info!(
            agent_id = %agent_id,
            amount = %amount,
            total_earned = %agent.total_earned,
            "💰 Earnings added"
        );

        Ok(())
    }

    /// Agents with reputation > 0, descending.
    pub async fn get_top_agents(&self, limit: Option<usize>) -> Result<Vec<Agent>> {
        let limit = limit.unwrap_or(self.config.default_top_limit);
        Ok(self.store.top_agents_by_reputation(limit).await?)
    }

    /// Issue a fresh api key, invalidating the previous one immediately.
    pub async fn regenerate_api_key(&self, agent_id: &AgentId) -> Result<String> {
        let mut agent = self
            .store
            .get_agent(agent_id)
            .await?
            .ok_or(MarketError::AgentNotFound(*agent_id))?;

        let new_key = generate_api_key();
        agent.api_key = new_key.clone();
        self.store.update_agent(&agent).await?;

        info!(agent_id = %agent_id, "🔑 Api key regenerated");

        Ok(new_key)
    }

    /// Get statistics
    pub async fn get_stats(&self) -> Result<AgentStats> {
        let store_stats = self.store.get_stats().await?;
        let rated = self.store.top_agents_by_reputation(usize::MAX).await?;

        Ok(AgentStats {
            total_agents: store_stats.agent_count as u64,
            rated_agents: rated.len() as u64,
        })
    }
}

/// Opaque agent credential: fixed prefix plus two random base-36 runs,
/// the format issued by the original platform.
fn generate_api_key() -> String {
    let mut rng = rand::thread_rng();
    let mut key = String::with_capacity(API_KEY_PREFIX.len() + 2 * API_KEY_RUN_LEN);
    key.push_str(API_KEY_PREFIX);
    for _ in 0..2 * API_KEY_RUN_LEN {
        let idx = rng.gen_range(0..API_KEY_CHARSET.len());
        key.push(API_KEY_CHARSET[idx] as char);
    }
    key
}

/// Agent registry statistics
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AgentStats {
    pub total_agents: u64,
    pub rated_agents: u64,
}
