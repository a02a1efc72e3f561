//! Procedural task generation for grid tiles.
//!
//! [`TaskGenerator`] picks a category, delegates to the matching
//! per-category builder and falls back to a boss task whenever a builder
//! fails. [`TaskGenerator::fill_frontier`] applies the anti-duplication
//! policy across a whole batch of newly reachable tiles.
mod boss;
mod exchange;
mod quest;
mod skill;

use smallvec::SmallVec;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::{EXCLUDE_CATEGORY_AFTER, MAX_DUPLICATE_ATTEMPTS};
use crate::grid::generation_frontier;
use crate::position::Position;
use crate::providers::{ProviderError, QuestMilestones, QuestProvider, QuestRecord};
use crate::random::RandomSource;
use crate::rewards::{FlatReward, RewardPolicy};
use crate::state::{PlayerStats, ProgressionState};
use crate::task::{Difficulty, Requirement, Task, TaskCategory, rewards};

type CategorySet = SmallVec<[TaskCategory; 4]>;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("every skill is already at the level cap")]
    AllSkillsMaxed,
    #[error("quest lookup failed: {0}")]
    Quests(#[from] ProviderError),
    #[error("{0} tasks are not produced by the tile generator")]
    UnsupportedCategory(TaskCategory),
}

pub(crate) fn task_id(category: TaskCategory, position: Position) -> String {
    format!("{category}_{position}")
}

/// The fixed first task on the origin tile.
#[must_use]
pub fn start_task(reward: &FlatReward) -> Task {
    Task {
        id: task_id(TaskCategory::Start, Position::ORIGIN),
        category: TaskCategory::Start,
        difficulty: Difficulty::Easy,
        title: "Start Your Adventure".to_string(),
        description: "Use your first key to start adventure".to_string(),
        requirements: vec![Requirement::Item {
            name: "key".to_string(),
            quantity: 1,
        }],
        rewards: rewards(reward.keys, reward.gold),
    }
}

/// Generator bound to one player's stat snapshot and quest provider.
///
/// Quest records are fetched at most once per generator; a failed fetch is
/// retried on the next quest draw.
pub struct TaskGenerator<'a> {
    policy: &'a RewardPolicy,
    stats: &'a PlayerStats,
    player_name: &'a str,
    quests: &'a dyn QuestProvider,
    quest_cache: Option<Vec<QuestRecord>>,
    milestones: QuestMilestones,
}

impl<'a> TaskGenerator<'a> {
    #[must_use]
    pub fn new(
        policy: &'a RewardPolicy,
        stats: &'a PlayerStats,
        player_name: &'a str,
        quests: &'a dyn QuestProvider,
    ) -> Self {
        Self {
            policy,
            stats,
            player_name,
            quests,
            quest_cache: None,
            milestones: QuestMilestones::default(),
        }
    }

    /// Quest milestones observed in any quest fetch so far.
    #[must_use]
    pub const fn milestones(&self) -> QuestMilestones {
        self.milestones
    }

    /// Produce one task for `position`. The origin always gets the start
    /// task; elsewhere a category is drawn uniformly from the generated set
    /// minus `excluded`, ignoring the exclusions if they cover every category.
    pub fn generate(
        &mut self,
        position: Position,
        excluded: &[TaskCategory],
        rng: &mut dyn RandomSource,
    ) -> Task {
        if position.is_origin() {
            return start_task(&self.policy.start_task);
        }
        let mut pool: CategorySet = TaskCategory::GENERATED
            .into_iter()
            .filter(|category| !excluded.contains(category))
            .collect();
        if pool.is_empty() {
            pool = TaskCategory::GENERATED.into_iter().collect();
        }
        let category = pool[rng.pick_index(pool.len())];
        match self.dispatch(category, position, rng) {
            Ok(task) => task,
            Err(err) => {
                log::warn!("{category} task at {position} failed ({err}); using a boss task");
                boss::generate(position, &self.policy.boss, rng)
            }
        }
    }

    fn dispatch(
        &mut self,
        category: TaskCategory,
        position: Position,
        rng: &mut dyn RandomSource,
    ) -> Result<Task, GeneratorError> {
        match category {
            TaskCategory::Skill => skill::generate(position, self.stats, &self.policy.skill, rng),
            TaskCategory::Quest => self.quest_task(position, rng),
            TaskCategory::Boss => Ok(boss::generate(position, &self.policy.boss, rng)),
            TaskCategory::GrandExchange => {
                Ok(exchange::generate(position, &self.policy.exchange, rng))
            }
            TaskCategory::Start | TaskCategory::Daily => {
                Err(GeneratorError::UnsupportedCategory(category))
            }
        }
    }

    fn quest_task(
        &mut self,
        position: Position,
        rng: &mut dyn RandomSource,
    ) -> Result<Task, GeneratorError> {
        let policy = self.policy;
        let records = self.quest_records()?;
        Ok(
            quest::generate(position, records, &policy.quest, rng).unwrap_or_else(|| {
                log::debug!("no quests available at {position}; using a boss task");
                boss::generate(position, &policy.boss, rng)
            }),
        )
    }

    fn quest_records(&mut self) -> Result<&[QuestRecord], GeneratorError> {
        if self.quest_cache.is_none() {
            let records = self.quests.fetch_quests(self.player_name)?;
            self.milestones = self
                .milestones
                .merge(QuestMilestones::from_records(&records));
            self.quest_cache = Some(records);
        }
        Ok(self.quest_cache.as_deref().unwrap_or_default())
    }

    /// Generate for `position`, retrying while the result duplicates an
    /// assigned task. From the fifth retry on the offending category is
    /// excluded; after the last retry the final draw is accepted.
    pub fn generate_distinct(
        &mut self,
        position: Position,
        assigned: &BTreeMap<Position, Task>,
        rng: &mut dyn RandomSource,
    ) -> Task {
        let is_duplicate = |task: &Task| assigned.values().any(|other| task.duplicates(other));
        let mut excluded = CategorySet::new();
        let mut task = self.generate(position, &excluded, rng);
        let mut retries = 0;
        while retries < MAX_DUPLICATE_ATTEMPTS && is_duplicate(&task) {
            retries += 1;
            if retries >= EXCLUDE_CATEGORY_AFTER && !excluded.contains(&task.category) {
                excluded.push(task.category);
            }
            task = self.generate(position, &excluded, rng);
        }
        if retries == MAX_DUPLICATE_ATTEMPTS && is_duplicate(&task) {
            log::debug!("accepting duplicate {} at {position}", task.title);
        }
        task
    }

    /// Assign tasks to every frontier position that lacks one, scanning in
    /// frontier order. Existing tasks are never replaced.
    #[must_use]
    pub fn fill_frontier(
        &mut self,
        state: &ProgressionState,
        rng: &mut dyn RandomSource,
    ) -> ProgressionState {
        let mut next = state.clone();
        for position in generation_frontier(state) {
            if next.tile_tasks.contains_key(&position) {
                continue;
            }
            let task = self.generate_distinct(position, &next.tile_tasks, rng);
            next.tile_tasks.insert(position, task);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::unlock;
    use crate::providers::QuestStatus;
    use crate::random::SeededRandom;
    use crate::task::RewardKind;
    use std::collections::HashSet;

    struct Quests(Result<Vec<QuestRecord>, ProviderError>);

    impl QuestProvider for Quests {
        fn fetch_quests(&self, _player_name: &str) -> Result<Vec<QuestRecord>, ProviderError> {
            self.0.clone()
        }
    }

    fn no_quests() -> Quests {
        Quests(Ok(Vec::new()))
    }

    #[test]
    fn origin_always_gets_start_task() {
        let policy = RewardPolicy::default();
        let stats = PlayerStats::default();
        let quests = no_quests();
        let mut generator = TaskGenerator::new(&policy, &stats, "p", &quests);
        let mut rng = SeededRandom::new(1);
        let task = generator.generate(Position::ORIGIN, &[], &mut rng);
        assert_eq!(task.category, TaskCategory::Start);
        assert_eq!(task.id, "start_0,0");
        assert_eq!(task.reward_total(RewardKind::Keys), 2);
        assert_eq!(task.reward_total(RewardKind::Gold), 50);
    }

    #[test]
    fn exclusions_are_respected_until_exhausted() {
        let policy = RewardPolicy::default();
        let stats = PlayerStats::default();
        let quests = no_quests();
        let mut generator = TaskGenerator::new(&policy, &stats, "p", &quests);
        let mut rng = SeededRandom::new(2);
        let excluded = [TaskCategory::Skill, TaskCategory::Quest, TaskCategory::Boss];
        for _ in 0..50 {
            let task = generator.generate(Position::new(1, 0), &excluded, &mut rng);
            assert_eq!(task.category, TaskCategory::GrandExchange);
        }
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let task = generator.generate(Position::new(1, 0), &TaskCategory::GENERATED, &mut rng);
            seen.insert(task.category);
        }
        assert!(seen.contains(&TaskCategory::Skill));
        assert!(seen.contains(&TaskCategory::GrandExchange));
    }

    #[test]
    fn quest_failure_falls_back_to_boss() {
        let policy = RewardPolicy::default();
        let stats = PlayerStats::default();
        let quests = Quests(Err(ProviderError::Unavailable("timeout".into())));
        let mut generator = TaskGenerator::new(&policy, &stats, "p", &quests);
        let mut rng = SeededRandom::new(3);
        let excluded = [
            TaskCategory::Skill,
            TaskCategory::Boss,
            TaskCategory::GrandExchange,
        ];
        let task = generator.generate(Position::new(0, 1), &excluded, &mut rng);
        assert_eq!(task.category, TaskCategory::Boss);
    }

    #[test]
    fn quest_draws_record_milestones() {
        let policy = RewardPolicy::default();
        let stats = PlayerStats::default();
        let quests = Quests(Ok(vec![
            QuestRecord {
                title: "Monkey Madness II".into(),
                status: QuestStatus::Completed,
                quest_points: 4,
                user_eligible: true,
            },
            QuestRecord {
                title: "Fairytale I - Growing Pains".into(),
                status: QuestStatus::NotStarted,
                quest_points: 2,
                user_eligible: true,
            },
        ]));
        let mut generator = TaskGenerator::new(&policy, &stats, "p", &quests);
        let mut rng = SeededRandom::new(4);
        let excluded = [
            TaskCategory::Skill,
            TaskCategory::Boss,
            TaskCategory::GrandExchange,
        ];
        let task = generator.generate(Position::new(0, 1), &excluded, &mut rng);
        assert_eq!(task.title, "Quest: Fairytale I - Growing Pains");
        assert!(generator.milestones().monkey_madness_ii);
        assert!(!generator.milestones().while_guthix_sleeps);
    }

    #[test]
    fn fill_frontier_covers_every_frontier_tile_once() {
        let policy = RewardPolicy::default();
        let stats = PlayerStats::uniform(30);
        let quests = no_quests();
        let mut generator = TaskGenerator::new(&policy, &stats, "p", &quests);
        let mut rng = SeededRandom::new(5);
        let state = ProgressionState::new("p", stats, 0, &policy);
        let state = unlock("0,0", &state).unwrap();
        let filled = generator.fill_frontier(&state, &mut rng);
        let frontier = generation_frontier(&filled);
        assert_eq!(filled.tile_tasks.len(), frontier.len());
        for position in frontier {
            let task = filled.task_at(position).unwrap();
            assert!(task.id.ends_with(&position.key()), "{} at {position}", task.id);
        }
        let again = generator.fill_frontier(&filled, &mut rng);
        assert_eq!(again.tile_tasks, filled.tile_tasks);
    }

    #[test]
    fn batches_never_repeat_a_skill() {
        let policy = RewardPolicy::default();
        let stats = PlayerStats::uniform(30);
        let quests = no_quests();
        for seed in 0..5 {
            let mut generator = TaskGenerator::new(&policy, &stats, "p", &quests);
            let mut rng = SeededRandom::new(seed);
            let state = ProgressionState::new("p", stats, 0, &policy);
            let state = unlock("0,0", &state).unwrap();
            let filled = generator.fill_frontier(&state, &mut rng);
            let skills: Vec<_> = filled.tile_tasks.values().filter_map(Task::skill).collect();
            let unique: HashSet<_> = skills.iter().collect();
            assert_eq!(skills.len(), unique.len(), "seed {seed}: {skills:?}");
        }
    }
}
