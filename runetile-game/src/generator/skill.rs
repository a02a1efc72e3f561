use crate::catalog::Skill;
use crate::constants::{MAX_SKILL_ATTEMPTS, MAX_SKILL_LEVEL};
use crate::position::Position;
use crate::random::RandomSource;
use crate::rewards::SkillRewards;
use crate::state::PlayerStats;
use crate::task::{Requirement, Task, TaskCategory, rewards};

use super::{GeneratorError, task_id};

/// Random trainable skill. After the bounded random attempts the first
/// non-maxed skill in hiscores order is used.
fn pick_skill(stats: &PlayerStats, rng: &mut dyn RandomSource) -> Option<Skill> {
    for _ in 0..MAX_SKILL_ATTEMPTS {
        let skill = Skill::ALL[rng.pick_index(Skill::ALL.len())];
        if stats.level(skill) < MAX_SKILL_LEVEL {
            return Some(skill);
        }
    }
    Skill::ALL
        .into_iter()
        .find(|skill| stats.level(*skill) < MAX_SKILL_LEVEL)
}

pub(super) fn generate(
    position: Position,
    stats: &PlayerStats,
    policy: &SkillRewards,
    rng: &mut dyn RandomSource,
) -> Result<Task, GeneratorError> {
    let skill = pick_skill(stats, rng).ok_or(GeneratorError::AllSkillsMaxed)?;
    let current_level = stats.level(skill);
    let increase = policy.increase_for(current_level).draw(rng);
    let target_level = current_level.saturating_add(increase).min(MAX_SKILL_LEVEL);

    Ok(Task {
        id: task_id(TaskCategory::Skill, position),
        category: TaskCategory::Skill,
        difficulty: policy.difficulty.classify(increase),
        title: format!("{} Training", skill.display_name()),
        description: format!("Train {skill} from level {current_level} to level {target_level}"),
        requirements: vec![Requirement::Skill {
            skill,
            current_level,
            target_level,
        }],
        rewards: rewards(policy.keys, policy.gold),
    })
}
