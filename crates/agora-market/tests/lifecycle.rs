//! End-to-end marketplace flows: poster posts, agent claims and submits,
//! verifier rules, registry bookkeeping follows.

use agora_market::{
    AgentRegistry, MarketError, RegistryConfig, TaskConfig, TaskManager,
};
use agora_store::{MemoryBackend, StoreBackend};
use agora_types::{RewardAmount, TaskKind, TaskStatus, VerificationCriteria, WalletAddress};
use std::sync::Arc;

fn wallet(n: u8) -> WalletAddress {
    WalletAddress::new(&format!("0x{:040x}", n)).unwrap()
}

fn setup() -> (Arc<MemoryBackend>, TaskManager, AgentRegistry) {
    let store = Arc::new(MemoryBackend::new());
    let tasks = TaskManager::new(TaskConfig::default(), store.clone());
    let agents = AgentRegistry::new(RegistryConfig::default(), store.clone());
    (store, tasks, agents)
}

#[tokio::test]
async fn test_full_happy_path() {
    let (store, tasks, agents) = setup();
    let poster = wallet(1);

    let agent_id = agents
        .register_agent(
            "labeler".to_string(),
            wallet(2),
            vec!["data".to_string()],
        )
        .await
        .unwrap();

    let criteria = VerificationCriteria {
        format: Some("jsonl".to_string()),
        min_count: Some(100),
        ..Default::default()
    };
    let task_id = tasks
        .create_task(
            "Label images".to_string(),
            "Label 100 street-scene images".to_string(),
            TaskKind::Data,
            RewardAmount::from_usdc(40.0),
            poster.clone(),
            Some(criteria),
            None,
        )
        .await
        .unwrap();

    // Agent discovers the task among open ones
    let open = tasks.get_open_tasks().await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, task_id);

    tasks.claim_task(&task_id, &agent_id).await.unwrap();
    tasks
        .submit_work(
            &task_id,
            &agent_id,
            serde_json::json!({"labels_url": "ipfs://bafy..."}),
        )
        .await
        .unwrap();

    tasks
        .verify_submission(&task_id, true, Some(5.0), Some("complete".to_string()))
        .await
        .unwrap();

    // Verifier outcome reflected on task and submission
    let task = tasks.get_task(&task_id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Verified);
    let subs = store.submissions_by_task(&task_id).await.unwrap();
    assert_eq!(subs.len(), 1);
    assert!(subs[0].verified);
    assert_eq!(subs[0].score, Some(5.0));

    // Registry bookkeeping follows out-of-band
    agents.update_reputation(&agent_id, 5.0).await.unwrap();
    agents
        .add_earnings(&agent_id, RewardAmount::from_usdc(40.0))
        .await
        .unwrap();

    let agent = agents.get_agent(&agent_id).await.unwrap().unwrap();
    assert_eq!(agent.reputation, 5.0);
    assert_eq!(agent.completed_tasks, 1);
    assert_eq!(agent.total_earned, RewardAmount::from_usdc(40.0));

    // Task no longer listed open; shows up under poster and agent
    assert!(tasks.get_open_tasks().await.unwrap().is_empty());
    assert_eq!(tasks.get_tasks_by_poster(&poster).await.unwrap().len(), 1);
    assert_eq!(tasks.get_tasks_by_agent(&agent_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejection_path() {
    let (store, tasks, agents) = setup();

    let agent_id = agents
        .register_agent("coder".to_string(), wallet(2), vec![])
        .await
        .unwrap();
    let task_id = tasks
        .create_task(
            "Fix flaky test".to_string(),
            "CI fails intermittently".to_string(),
            TaskKind::Code,
            RewardAmount::from_usdc(15.0),
            wallet(1),
            None,
            None,
        )
        .await
        .unwrap();

    tasks.claim_task(&task_id, &agent_id).await.unwrap();
    tasks
        .submit_work(&task_id, &agent_id, serde_json::json!({"pr": 42}))
        .await
        .unwrap();
    tasks
        .verify_submission(&task_id, false, Some(1.0), Some("does not fix it".to_string()))
        .await
        .unwrap();

    let task = tasks.get_task(&task_id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Rejected);

    let subs = store.submissions_by_task(&task_id).await.unwrap();
    assert!(!subs[0].verified);
    assert_eq!(subs[0].feedback.as_deref(), Some("does not fix it"));

    // Rejected is terminal for claim/submit
    let other = agents
        .register_agent("other".to_string(), wallet(3), vec![])
        .await
        .unwrap();
    assert!(matches!(
        tasks.claim_task(&task_id, &other).await.unwrap_err(),
        MarketError::InvalidState { .. }
    ));
    assert!(matches!(
        tasks
            .submit_work(&task_id, &agent_id, serde_json::json!({}))
            .await
            .unwrap_err(),
        MarketError::InvalidState { .. }
    ));
}

#[tokio::test]
async fn test_resubmission_not_permitted_after_first() {
    let (_store, tasks, agents) = setup();

    let agent_id = agents
        .register_agent("agent".to_string(), wallet(2), vec![])
        .await
        .unwrap();
    let task_id = tasks
        .create_task(
            "Research".to_string(),
            "Survey".to_string(),
            TaskKind::Research,
            RewardAmount::from_usdc(5.0),
            wallet(1),
            None,
            None,
        )
        .await
        .unwrap();

    tasks.claim_task(&task_id, &agent_id).await.unwrap();
    tasks
        .submit_work(&task_id, &agent_id, serde_json::json!({"v": 1}))
        .await
        .unwrap();

    // Second submit by the same claimer fails: task already left `claimed`.
    let err = tasks
        .submit_work(&task_id, &agent_id, serde_json::json!({"v": 2}))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::InvalidState { .. }));
}

#[tokio::test]
async fn test_leaderboard_reflects_ratings() {
    let (_store, _tasks, agents) = setup();

    let strong = agents
        .register_agent("strong".to_string(), wallet(1), vec![])
        .await
        .unwrap();
    let weak = agents
        .register_agent("weak".to_string(), wallet(2), vec![])
        .await
        .unwrap();
    agents
        .register_agent("unrated".to_string(), wallet(3), vec![])
        .await
        .unwrap();

    agents.update_reputation(&strong, 5.0).await.unwrap();
    agents.update_reputation(&strong, 4.0).await.unwrap();
    agents.update_reputation(&weak, 2.0).await.unwrap();

    let top = agents.get_top_agents(Some(10)).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].id, strong);
    assert_eq!(top[0].reputation, 4.5);
    assert_eq!(top[1].id, weak);
}
