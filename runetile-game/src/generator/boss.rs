use crate::catalog::{BOSSES, Boss};
use crate::position::Position;
use crate::random::RandomSource;
use crate::rewards::BossRewards;
use crate::task::{Requirement, Task, TaskCategory, rewards};

use super::task_id;

/// Boss tasks have no external inputs and cannot fail, which makes them the
/// fallback for every other category.
pub(super) fn generate(
    position: Position,
    policy: &BossRewards,
    rng: &mut dyn RandomSource,
) -> Task {
    let boss = &BOSSES[rng.pick_index(BOSSES.len())];
    build(position, boss, policy, rng)
}

fn build(position: Position, boss: &Boss, policy: &BossRewards, rng: &mut dyn RandomSource) -> Task {
    let tier = policy.tier(boss.tier);
    let kill_count = tier.kills.draw(rng);
    let gold = u64::from(kill_count).saturating_mul(tier.gold_per_kill);
    let wilderness = if boss.wilderness { " (Wilderness)" } else { "" };
    let plural = if kill_count == 1 { "" } else { "s" };

    Task {
        id: task_id(TaskCategory::Boss, position),
        category: TaskCategory::Boss,
        difficulty: tier.difficulty,
        title: format!("Boss: {}", boss.name),
        description: format!("Kill {}{wilderness} {kill_count} time{plural}", boss.name),
        requirements: vec![Requirement::Boss {
            name: boss.name.to_string(),
            kill_count,
        }],
        rewards: rewards(tier.keys, gold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BossTier, bosses_in_tier};
    use crate::random::SeededRandom;
    use crate::task::{Difficulty, RewardKind};

    #[test]
    fn gold_scales_with_kill_count() {
        let policy = BossRewards::default();
        let mut rng = SeededRandom::new(21);
        for _ in 0..300 {
            let task = generate(Position::new(3, 3), &policy, &mut rng);
            let Some(Requirement::Boss { name, kill_count }) = task.requirements.first() else {
                panic!("boss requirement missing");
            };
            let boss = BOSSES.iter().find(|b| b.name == name.as_str()).unwrap();
            let tier = policy.tier(boss.tier);
            assert!(tier.kills.contains(*kill_count));
            assert_eq!(
                task.reward_total(RewardKind::Gold),
                u64::from(*kill_count) * tier.gold_per_kill
            );
            assert_eq!(task.reward_total(RewardKind::Keys), u64::from(tier.keys));
        }
    }

    #[test]
    fn only_elite_bosses_grant_keys() {
        let policy = BossRewards::default();
        let mut rng = SeededRandom::new(2);
        for tier in [BossTier::Low, BossTier::Mid, BossTier::High, BossTier::Elite] {
            let boss = bosses_in_tier(tier)[0];
            let task = build(Position::new(1, 0), boss, &policy, &mut rng);
            let keys = task.reward_total(RewardKind::Keys);
            assert_eq!(keys > 0, tier == BossTier::Elite, "{tier:?}");
        }
    }

    #[test]
    fn wilderness_bosses_are_flagged() {
        let policy = BossRewards::default();
        let mut rng = SeededRandom::new(4);
        let scorpia = BOSSES.iter().find(|b| b.name == "Scorpia").unwrap();
        let task = build(Position::new(0, 2), scorpia, &policy, &mut rng);
        assert!(task.description.starts_with("Kill Scorpia (Wilderness) "));
        assert_eq!(task.difficulty, Difficulty::Easy);
        assert_eq!(task.title, "Boss: Scorpia");
        assert_eq!(task.id, "boss_0,2");
    }
}
