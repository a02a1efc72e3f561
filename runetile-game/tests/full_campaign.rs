use runetile_game::{
    GameEngine, GameError, MemoryStore, PlayerStats, Position, ProviderError, QuestProvider,
    QuestRecord, RewardKind, SeededRandom, StatProvider, TileState, UnlockBlock,
    compute_visible_positions, generation_frontier,
};
use serde::Deserialize;

#[derive(Clone, Deserialize)]
struct Fixture {
    name: String,
    stats: PlayerStats,
    quests: Vec<QuestRecord>,
}

#[derive(Clone)]
struct Fixtures(Vec<Fixture>);

impl Fixtures {
    fn load() -> Self {
        Self(serde_json::from_str(include_str!("../../assets/data/players.json")).unwrap())
    }

    fn find(&self, player_name: &str) -> Result<&Fixture, ProviderError> {
        self.0
            .iter()
            .find(|fixture| fixture.name.eq_ignore_ascii_case(player_name))
            .ok_or_else(|| ProviderError::NotFound(player_name.to_string()))
    }
}

impl StatProvider for Fixtures {
    fn fetch_stats(&self, player_name: &str) -> Result<PlayerStats, ProviderError> {
        self.find(player_name).map(|fixture| fixture.stats)
    }
}

impl QuestProvider for Fixtures {
    fn fetch_quests(&self, player_name: &str) -> Result<Vec<QuestRecord>, ProviderError> {
        self.find(player_name).map(|fixture| fixture.quests.clone())
    }
}

fn engine(store: MemoryStore) -> GameEngine<MemoryStore, Fixtures, Fixtures> {
    let fixtures = Fixtures::load();
    GameEngine::new(store, fixtures.clone(), fixtures).with_clock(|| 1_714_521_600_000)
}

#[test]
fn progression_walk_keeps_invariants() {
    for (seed, player) in [(1_u64, "Iron Novice"), (2, "Mid Main"), (3, "Quest Cape"), (4, "Lynx Titan")] {
        let engine = engine(MemoryStore::new());
        let mut session = engine
            .start_session(player, Box::new(SeededRandom::new(seed)))
            .unwrap();
        let mut steps = 0;

        for _ in 0..60 {
            let state = session.state();
            let Some(target) = compute_visible_positions(state)
                .into_iter()
                .find(|position| session.tile_state(*position) == TileState::Locked)
            else {
                break;
            };
            if state.keys == 0 && session.purchase_keys(1).is_err() {
                break;
            }

            let keys_before = session.state().keys;
            session.unlock(&target.key()).unwrap();
            assert_eq!(session.state().keys, keys_before - 1);

            let task = session.task_at(target).cloned().unwrap();
            let (keys, gold) = (session.state().keys, session.state().gold);
            let completed = session.complete(&target.key()).unwrap();
            assert_eq!(completed, task);
            assert_eq!(
                u64::from(session.state().keys),
                u64::from(keys) + task.reward_total(RewardKind::Keys)
            );
            assert_eq!(session.state().gold, gold + task.reward_total(RewardKind::Gold));

            let state = session.state();
            assert!(state.completed_tiles.is_subset(&state.unlocked_tiles));
            assert!(state.visible_tiles.contains(Position::ORIGIN));
            for position in generation_frontier(state) {
                assert!(state.task_at(position).is_some(), "{player}: {position} lacks a task");
            }
            steps += 1;
        }
        assert!(steps >= 3, "{player} stalled after {steps} steps");
    }
}

#[test]
fn unlock_without_keys_is_rejected() {
    let engine = engine(MemoryStore::new());
    let mut session = engine
        .start_session("Iron Novice", Box::new(SeededRandom::new(9)))
        .unwrap();
    session.unlock("0,0").unwrap();
    assert_eq!(session.state().keys, 0);
    let err = session.unlock("1,0").unwrap_err();
    assert!(matches!(
        err,
        GameError::CannotUnlock {
            reason: UnlockBlock::NoKeys,
            ..
        }
    ));
    let err = session.unlock("0,0").unwrap_err();
    assert!(matches!(
        err,
        GameError::CannotUnlock {
            reason: UnlockBlock::AlreadyUnlocked,
            ..
        }
    ));
}

#[test]
fn saved_run_resumes_identically() {
    let store = MemoryStore::new();
    let first = engine(store.clone());
    let snapshot = {
        let mut session = first
            .start_session("Mid Main", Box::new(SeededRandom::new(21)))
            .unwrap();
        session.unlock("0,0").unwrap();
        session.complete("0,0").unwrap();
        session.unlock("1,0").unwrap();
        session.increment_slayer("Vannaka").unwrap();
        session.state().clone()
    };

    let second = engine(store);
    let session = second
        .start_session("mid main", Box::new(SeededRandom::new(99)))
        .unwrap();
    assert_eq!(session.state().unlocked_tiles, snapshot.unlocked_tiles);
    assert_eq!(session.state().completed_tiles, snapshot.completed_tiles);
    assert_eq!(session.state().keys, snapshot.keys);
    assert_eq!(session.state().gold, snapshot.gold);
    for (position, task) in &snapshot.tile_tasks {
        assert_eq!(session.task_at(*position), Some(task));
    }
    assert_eq!(session.roster().get("Vannaka").unwrap().tasks_completed, 1);
}

#[test]
fn switching_players_starts_a_new_run() {
    let store = MemoryStore::new();
    let engine = engine(store);
    {
        let mut session = engine
            .start_session("Mid Main", Box::new(SeededRandom::new(5)))
            .unwrap();
        session.unlock("0,0").unwrap();
    }
    let session = engine
        .start_session("Iron Novice", Box::new(SeededRandom::new(6)))
        .unwrap();
    assert_eq!(session.state().player_name, "Iron Novice");
    assert!(session.state().unlocked_tiles.is_empty());
    assert!(engine.persistence().has_existing_game("iron novice"));
    assert!(!engine.persistence().has_existing_game("Mid Main"));
}

#[test]
fn maxed_player_never_gets_skill_tasks() {
    let engine = engine(MemoryStore::new());
    let mut session = engine
        .start_session("Lynx Titan", Box::new(SeededRandom::new(31)))
        .unwrap();
    session.unlock("0,0").unwrap();
    session.complete("0,0").unwrap();
    session.unlock("1,0").unwrap();
    session.unlock("0,1").unwrap();
    let state = session.state();
    assert!(state.tile_tasks.len() > 5);
    assert!(state.tile_tasks.values().all(|task| task.skill().is_none()));
}
