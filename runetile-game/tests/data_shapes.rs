use std::collections::BTreeMap;
use std::hash::Hasher;

use runetile_game::{
    DailyDifficulty, PlayerStats, QuestRecord, RewardPolicy, Task, TaskCategory,
    generate_all_daily_tasks,
};
use serde::Deserialize;
use serde_json::Value;
use twox_hash::XxHash64;

#[derive(Deserialize)]
struct Fixture {
    name: String,
    stats: PlayerStats,
    quests: Vec<QuestRecord>,
}

fn load_policy() -> RewardPolicy {
    RewardPolicy::from_json(include_str!("../../assets/data/reward_policy.json")).unwrap()
}

fn load_players() -> Vec<Fixture> {
    serde_json::from_str(include_str!("../../assets/data/players.json")).unwrap()
}

fn snapshot_hash(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

#[test]
fn shipped_policy_matches_compiled_default() {
    let policy = load_policy();
    policy.validate().unwrap();
    assert_eq!(policy, RewardPolicy::default());

    let shipped = serde_json::to_vec(&policy).unwrap();
    let compiled = serde_json::to_vec(&RewardPolicy::default()).unwrap();
    assert_eq!(snapshot_hash(&shipped), snapshot_hash(&compiled));
}

#[test]
fn partial_policy_keeps_defaults() {
    let policy = RewardPolicy::from_json(r#"{"shop":{"key_price":250}}"#).unwrap();
    assert_eq!(policy.shop.key_price, 250);
    assert_eq!(policy.boss, RewardPolicy::default().boss);

    let inverted = r#"{"quest":{"keys":1,"gold":100,"difficulty":{"easy":0,"medium":2,"hard":3}},
        "boss":{"low":{"difficulty":"easy","kills":{"min":30,"max":10},"gold_per_kill":15,"keys":0},
                "mid":{"difficulty":"medium","kills":{"min":5,"max":15},"gold_per_kill":40,"keys":0},
                "high":{"difficulty":"hard","kills":{"min":3,"max":8},"gold_per_kill":100,"keys":0},
                "elite":{"difficulty":"elite","kills":{"min":1,"max":3},"gold_per_kill":400,"keys":1}}}"#;
    assert!(RewardPolicy::from_json(inverted).is_err());
}

#[test]
fn player_fixtures_are_consistent() {
    let players = load_players();
    assert!(players.len() >= 3);
    for fixture in &players {
        assert_eq!(
            fixture.stats.overall,
            fixture.stats.total_level(),
            "{} overall drifted",
            fixture.name
        );
        assert!(!fixture.quests.is_empty(), "{} has no quests", fixture.name);
    }
}

#[test]
fn daily_snapshot_is_stable_per_date() {
    let policy = RewardPolicy::default();
    let mut snapshot = BTreeMap::new();
    for day in 1..=7 {
        let date = format!("2024-05-{day:02}");
        let tasks = generate_all_daily_tasks(&date, &policy.daily);
        let bytes = serde_json::to_vec(&tasks).unwrap();
        let again = serde_json::to_vec(&generate_all_daily_tasks(&date, &policy.daily)).unwrap();
        assert_eq!(snapshot_hash(&bytes), snapshot_hash(&again), "{date}");
        snapshot.insert(date, snapshot_hash(&bytes));
    }
    let distinct: std::collections::HashSet<_> = snapshot.values().collect();
    assert_eq!(distinct.len(), snapshot.len());
}

#[test]
fn daily_tasks_serialize_expected_shape() {
    let policy = RewardPolicy::default();
    let tasks = generate_all_daily_tasks("2024-05-01", &policy.daily);
    for (task, difficulty) in tasks.iter().zip(DailyDifficulty::ALL) {
        let value = serde_json::to_value(task).unwrap();
        assert_eq!(value["category"], Value::from("daily"));
        assert_eq!(value["id"], Value::from(format!("daily-{difficulty}-2024-05-01")));
        let rewards = value["rewards"].as_array().unwrap();
        assert!(rewards.iter().all(|reward| reward["type"].is_string()));
        assert_eq!(value["requirements"].as_array().unwrap().len(), 1);
    }
}

#[test]
fn legacy_drop_tasks_load_as_boss() {
    let json = r#"{
        "id": "drop_3,4",
        "category": "drop",
        "difficulty": "medium",
        "title": "Boss: Vorkath",
        "description": "Kill Vorkath 5 times",
        "requirements": [{"type": "boss", "name": "Vorkath", "kill_count": 5}],
        "rewards": [{"type": "gold", "amount": 200}]
    }"#;
    let task: Task = serde_json::from_str(json).unwrap();
    assert_eq!(task.category, TaskCategory::Boss);
    assert_eq!(task.rewards[0].description(), "200 Gold");
}
