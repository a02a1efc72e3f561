//! Progression state: the aggregate root every engine operation transforms.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::Skill;
use crate::generator::start_task;
use crate::position::{Position, TileSet};
use crate::rewards::RewardPolicy;
use crate::task::Task;

/// Hiscores snapshot: one level per skill plus the overall total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub overall: u32,
    pub attack: u32,
    pub defence: u32,
    pub strength: u32,
    pub hitpoints: u32,
    pub ranged: u32,
    pub prayer: u32,
    pub magic: u32,
    pub cooking: u32,
    pub woodcutting: u32,
    pub fletching: u32,
    pub fishing: u32,
    pub firemaking: u32,
    pub crafting: u32,
    pub smithing: u32,
    pub mining: u32,
    pub herblore: u32,
    pub agility: u32,
    pub thieving: u32,
    pub slayer: u32,
    pub farming: u32,
    pub runecraft: u32,
    pub hunter: u32,
    pub construction: u32,
}

impl Default for PlayerStats {
    /// Fresh account: level 1 everywhere except 10 Hitpoints.
    fn default() -> Self {
        Self::uniform(1).with_level(Skill::Hitpoints, 10)
    }
}

impl PlayerStats {
    /// Every skill at `level`, with a matching overall total.
    #[must_use]
    pub fn uniform(level: u32) -> Self {
        let mut stats = Self {
            overall: 0,
            attack: level,
            defence: level,
            strength: level,
            hitpoints: level,
            ranged: level,
            prayer: level,
            magic: level,
            cooking: level,
            woodcutting: level,
            fletching: level,
            fishing: level,
            firemaking: level,
            crafting: level,
            smithing: level,
            mining: level,
            herblore: level,
            agility: level,
            thieving: level,
            slayer: level,
            farming: level,
            runecraft: level,
            hunter: level,
            construction: level,
        };
        stats.overall = stats.total_level();
        stats
    }

    #[must_use]
    pub const fn level(&self, skill: Skill) -> u32 {
        match skill {
            Skill::Attack => self.attack,
            Skill::Defence => self.defence,
            Skill::Strength => self.strength,
            Skill::Hitpoints => self.hitpoints,
            Skill::Ranged => self.ranged,
            Skill::Prayer => self.prayer,
            Skill::Magic => self.magic,
            Skill::Cooking => self.cooking,
            Skill::Woodcutting => self.woodcutting,
            Skill::Fletching => self.fletching,
            Skill::Fishing => self.fishing,
            Skill::Firemaking => self.firemaking,
            Skill::Crafting => self.crafting,
            Skill::Smithing => self.smithing,
            Skill::Mining => self.mining,
            Skill::Herblore => self.herblore,
            Skill::Agility => self.agility,
            Skill::Thieving => self.thieving,
            Skill::Slayer => self.slayer,
            Skill::Farming => self.farming,
            Skill::Runecraft => self.runecraft,
            Skill::Hunter => self.hunter,
            Skill::Construction => self.construction,
        }
    }

    const fn level_mut(&mut self, skill: Skill) -> &mut u32 {
        match skill {
            Skill::Attack => &mut self.attack,
            Skill::Defence => &mut self.defence,
            Skill::Strength => &mut self.strength,
            Skill::Hitpoints => &mut self.hitpoints,
            Skill::Ranged => &mut self.ranged,
            Skill::Prayer => &mut self.prayer,
            Skill::Magic => &mut self.magic,
            Skill::Cooking => &mut self.cooking,
            Skill::Woodcutting => &mut self.woodcutting,
            Skill::Fletching => &mut self.fletching,
            Skill::Fishing => &mut self.fishing,
            Skill::Firemaking => &mut self.firemaking,
            Skill::Crafting => &mut self.crafting,
            Skill::Smithing => &mut self.smithing,
            Skill::Mining => &mut self.mining,
            Skill::Herblore => &mut self.herblore,
            Skill::Agility => &mut self.agility,
            Skill::Thieving => &mut self.thieving,
            Skill::Slayer => &mut self.slayer,
            Skill::Farming => &mut self.farming,
            Skill::Runecraft => &mut self.runecraft,
            Skill::Hunter => &mut self.hunter,
            Skill::Construction => &mut self.construction,
        }
    }

    /// Copy with one skill replaced; the overall total is recomputed.
    #[must_use]
    pub fn with_level(mut self, skill: Skill, level: u32) -> Self {
        *self.level_mut(skill) = level;
        self.overall = self.total_level();
        self
    }

    /// Sum of the individual skill levels.
    #[must_use]
    pub fn total_level(&self) -> u32 {
        Skill::ALL
            .into_iter()
            .fold(0_u32, |acc, skill| acc.saturating_add(self.level(skill)))
    }
}

/// Derived state of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileState {
    Locked,
    Unlocked,
    Completed,
}

/// Everything persisted for one player's grid run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionState {
    pub player_name: String,
    pub player_stats: PlayerStats,
    /// Unix milliseconds of the last successful stat fetch.
    #[serde(rename = "statsLastFetched", default)]
    pub stats_fetched_at: i64,
    pub keys: u32,
    pub gold: u64,
    #[serde(default)]
    pub unlocked_tiles: TileSet,
    #[serde(default)]
    pub completed_tiles: TileSet,
    #[serde(default)]
    pub visible_tiles: TileSet,
    #[serde(default)]
    pub tile_tasks: BTreeMap<Position, Task>,
    #[serde(default)]
    pub last_updated: i64,
}

impl ProgressionState {
    /// Fresh run: starting resources, the Start task on the origin, nothing
    /// unlocked yet.
    #[must_use]
    pub fn new(player_name: &str, stats: PlayerStats, now_ms: i64, policy: &RewardPolicy) -> Self {
        let mut tile_tasks = BTreeMap::new();
        tile_tasks.insert(Position::ORIGIN, start_task(&policy.start_task));
        Self {
            player_name: player_name.trim().to_string(),
            player_stats: stats,
            stats_fetched_at: now_ms,
            keys: policy.starting.keys,
            gold: policy.starting.gold,
            unlocked_tiles: TileSet::new(),
            completed_tiles: TileSet::new(),
            visible_tiles: std::iter::once(Position::ORIGIN).collect(),
            tile_tasks,
            last_updated: now_ms,
        }
    }

    #[must_use]
    pub fn task_at(&self, position: Position) -> Option<&Task> {
        self.tile_tasks.get(&position)
    }

    /// Case-insensitive owner check.
    #[must_use]
    pub fn belongs_to(&self, player_name: &str) -> bool {
        self.player_name.eq_ignore_ascii_case(player_name.trim())
    }

    /// Copy carrying a fresh stat snapshot.
    #[must_use]
    pub fn with_stats(&self, stats: PlayerStats, fetched_at: i64) -> Self {
        Self {
            player_stats: stats,
            stats_fetched_at: fetched_at,
            last_updated: fetched_at,
            ..self.clone()
        }
    }

    /// Copy with `last_updated` advanced.
    #[must_use]
    pub fn touched(mut self, now_ms: i64) -> Self {
        self.last_updated = now_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskCategory;

    #[test]
    fn default_stats_model_a_fresh_account() {
        let stats = PlayerStats::default();
        assert_eq!(stats.level(Skill::Hitpoints), 10);
        assert_eq!(stats.level(Skill::Runecraft), 1);
        assert_eq!(stats.overall, 32);
    }

    #[test]
    fn with_level_updates_one_skill_and_total() {
        let stats = PlayerStats::uniform(50).with_level(Skill::Mining, 99);
        assert_eq!(stats.level(Skill::Mining), 99);
        assert_eq!(stats.level(Skill::Fishing), 50);
        assert_eq!(stats.overall, 50 * 22 + 99);
    }

    #[test]
    fn stats_accept_partial_records() {
        let stats: PlayerStats = serde_json::from_str(r#"{"attack": 70, "overall": 900}"#).unwrap();
        assert_eq!(stats.attack, 70);
        assert_eq!(stats.overall, 900);
        assert_eq!(stats.hitpoints, 10);
    }

    #[test]
    fn new_state_seeds_origin() {
        let policy = RewardPolicy::default();
        let state = ProgressionState::new(" Zezima ", PlayerStats::default(), 1_000, &policy);
        assert_eq!(state.player_name, "Zezima");
        assert_eq!(state.keys, 1);
        assert_eq!(state.gold, 50);
        assert!(state.unlocked_tiles.is_empty());
        assert!(state.visible_tiles.contains(Position::ORIGIN));
        let start = state.task_at(Position::ORIGIN).unwrap();
        assert_eq!(start.category, TaskCategory::Start);
        assert!(state.belongs_to("zezima"));
        assert!(!state.belongs_to("lynx titan"));
    }

    #[test]
    fn state_round_trips_through_json() {
        let policy = RewardPolicy::default();
        let state = ProgressionState::new("Zezima", PlayerStats::uniform(40), 5, &policy);
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"tileTasks\":{\"0,0\""));
        assert!(json.contains("\"statsLastFetched\":5"));
        let restored: ProgressionState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}
