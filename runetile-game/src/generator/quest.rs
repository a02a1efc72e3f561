use crate::position::Position;
use crate::providers::QuestRecord;
use crate::random::RandomSource;
use crate::rewards::QuestRewards;
use crate::task::{Requirement, Task, TaskCategory, rewards};

use super::task_id;

/// Quest task from the available records, or `None` when the player has
/// nothing left to start.
pub(super) fn generate(
    position: Position,
    records: &[QuestRecord],
    policy: &QuestRewards,
    rng: &mut dyn RandomSource,
) -> Option<Task> {
    let available: Vec<&QuestRecord> = records.iter().filter(|q| q.is_available()).collect();
    if available.is_empty() {
        return None;
    }
    let quest = available[rng.pick_index(available.len())];

    Some(Task {
        id: task_id(TaskCategory::Quest, position),
        category: TaskCategory::Quest,
        difficulty: policy.difficulty.classify(quest.quest_points),
        title: format!("Quest: {}", quest.title),
        description: format!("Complete the quest: {}", quest.title),
        requirements: vec![Requirement::Quest {
            title: quest.title.clone(),
        }],
        rewards: rewards(policy.keys, policy.gold),
    })
}
