//! Reward policy: the single tuning surface for task parameters and payouts.
//!
//! Every generator reads its ranges and payouts from [`RewardPolicy`]. The
//! compiled-in default mirrors the live game balance; alternative policies can
//! be loaded from JSON and must pass [`RewardPolicy::validate`].
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::catalog::{BossTier, ItemTier, SLAYER_MASTERS};
use crate::daily::DailyDifficulty;
use crate::random::RandomSource;
use crate::task::Difficulty;

/// Inclusive integer range used for kill counts, level deltas and quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: u32,
    pub max: u32,
}

impl AmountRange {
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Draw a uniform value from the range.
    pub fn draw(&self, rng: &mut dyn RandomSource) -> u32 {
        rng.range_inclusive(self.min, self.max)
    }

    /// Map a pre-computed unit fraction onto the range.
    #[must_use]
    pub fn from_fraction(&self, fraction: f64) -> u32 {
        crate::numbers::fraction_in_range(fraction, self.min, self.max)
    }

    fn validate(&self, field: &'static str) -> Result<(), PolicyError> {
        if self.min > self.max {
            return Err(PolicyError::InvertedRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("{field} range is inverted (min {min} > max {max})")]
    InvertedRange {
        field: &'static str,
        min: u32,
        max: u32,
    },
    #[error("{field} weights sum to zero")]
    ZeroWeights { field: &'static str },
    #[error("slayer master {master} requires zero tasks")]
    ZeroThreshold { master: String },
    #[error("skill level bands must be non-empty and ascending")]
    SkillBands,
    #[error("failed to parse reward policy: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Kill-count range and payout for one boss tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossTierReward {
    pub difficulty: Difficulty,
    pub kills: AmountRange,
    pub gold_per_kill: u64,
    pub keys: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossRewards {
    pub low: BossTierReward,
    pub mid: BossTierReward,
    pub high: BossTierReward,
    pub elite: BossTierReward,
}

impl BossRewards {
    #[must_use]
    pub const fn tier(&self, tier: BossTier) -> &BossTierReward {
        match tier {
            BossTier::Low => &self.low,
            BossTier::Mid => &self.mid,
            BossTier::High => &self.high,
            BossTier::Elite => &self.elite,
        }
    }
}

impl Default for BossRewards {
    fn default() -> Self {
        Self {
            low: BossTierReward {
                difficulty: Difficulty::Easy,
                kills: AmountRange::new(10, 25),
                gold_per_kill: 15,
                keys: 0,
            },
            mid: BossTierReward {
                difficulty: Difficulty::Medium,
                kills: AmountRange::new(5, 15),
                gold_per_kill: 40,
                keys: 0,
            },
            high: BossTierReward {
                difficulty: Difficulty::Hard,
                kills: AmountRange::new(3, 8),
                gold_per_kill: 100,
                keys: 0,
            },
            elite: BossTierReward {
                difficulty: Difficulty::Elite,
                kills: AmountRange::new(1, 3),
                gold_per_kill: 400,
                keys: 1,
            },
        }
    }
}

/// Upper bounds (inclusive) that map a magnitude onto a difficulty tier.
/// Anything above `hard` is elite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyThresholds {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl DifficultyThresholds {
    #[must_use]
    pub const fn classify(&self, value: u32) -> Difficulty {
        if value <= self.easy {
            Difficulty::Easy
        } else if value <= self.medium {
            Difficulty::Medium
        } else if value <= self.hard {
            Difficulty::Hard
        } else {
            Difficulty::Elite
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRewards {
    pub keys: u32,
    pub gold: u64,
    /// Classified by quest points.
    pub difficulty: DifficultyThresholds,
}

impl Default for QuestRewards {
    fn default() -> Self {
        Self {
            keys: 1,
            gold: 100,
            difficulty: DifficultyThresholds {
                easy: 0,
                medium: 2,
                hard: 3,
            },
        }
    }
}

/// Level increase range applied to skills at or below `max_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBand {
    pub max_level: u32,
    pub increase: AmountRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRewards {
    pub keys: u32,
    pub gold: u64,
    pub bands: Vec<LevelBand>,
    /// Classified by level increase.
    pub difficulty: DifficultyThresholds,
}

impl SkillRewards {
    /// Increase range for a current level; levels past the last band use it.
    #[must_use]
    pub fn increase_for(&self, level: u32) -> AmountRange {
        self.bands
            .iter()
            .find(|band| level <= band.max_level)
            .or_else(|| self.bands.last())
            .map_or(AmountRange::new(1, 1), |band| band.increase)
    }
}

impl Default for SkillRewards {
    fn default() -> Self {
        Self {
            keys: 1,
            gold: 0,
            bands: vec![
                LevelBand {
                    max_level: 40,
                    increase: AmountRange::new(1, 10),
                },
                LevelBand {
                    max_level: 75,
                    increase: AmountRange::new(1, 5),
                },
                LevelBand {
                    max_level: 98,
                    increase: AmountRange::new(1, 1),
                },
            ],
            difficulty: DifficultyThresholds {
                easy: 2,
                medium: 5,
                hard: 8,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeTierReward {
    pub difficulty: Difficulty,
    pub weight: u32,
    pub quantity: AmountRange,
    pub gold: u64,
    pub keys: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRewards {
    pub cheap: ExchangeTierReward,
    pub medium: ExchangeTierReward,
    pub expensive: ExchangeTierReward,
    pub luxury: ExchangeTierReward,
}

impl ExchangeRewards {
    #[must_use]
    pub const fn tier(&self, tier: ItemTier) -> &ExchangeTierReward {
        match tier {
            ItemTier::Cheap => &self.cheap,
            ItemTier::Medium => &self.medium,
            ItemTier::Expensive => &self.expensive,
            ItemTier::Luxury => &self.luxury,
        }
    }

    /// Tier weights in [`ItemTier::ALL`] order.
    #[must_use]
    pub fn weights(&self) -> [u32; 4] {
        ItemTier::ALL.map(|tier| self.tier(tier).weight)
    }
}

impl Default for ExchangeRewards {
    fn default() -> Self {
        Self {
            cheap: ExchangeTierReward {
                difficulty: Difficulty::Easy,
                weight: 40,
                quantity: AmountRange::new(50, 100),
                gold: 50,
                keys: 0,
            },
            medium: ExchangeTierReward {
                difficulty: Difficulty::Medium,
                weight: 30,
                quantity: AmountRange::new(20, 50),
                gold: 150,
                keys: 0,
            },
            expensive: ExchangeTierReward {
                difficulty: Difficulty::Hard,
                weight: 20,
                quantity: AmountRange::new(5, 20),
                gold: 350,
                keys: 0,
            },
            luxury: ExchangeTierReward {
                difficulty: Difficulty::Elite,
                weight: 10,
                quantity: AmountRange::new(1, 5),
                gold: 600,
                keys: 1,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlayerRewards {
    pub milestone_keys: u32,
    pub milestone_gold: u64,
    /// Tasks required per master, keyed by lower-case name.
    pub thresholds: BTreeMap<String, u32>,
    /// Used for masters missing from `thresholds`.
    pub fallback_threshold: u32,
}

impl SlayerRewards {
    #[must_use]
    pub fn threshold_for(&self, master: &str) -> u32 {
        self.thresholds
            .get(&master.to_ascii_lowercase())
            .copied()
            .unwrap_or(self.fallback_threshold)
    }
}

impl Default for SlayerRewards {
    fn default() -> Self {
        let thresholds = [
            ("turael", 10),
            ("aya", 10),
            ("spria", 10),
            ("mazchna", 8),
            ("achtryn", 8),
            ("vannaka", 7),
            ("chaeldar", 6),
            ("konar", 5),
            ("nieve", 4),
            ("steve", 4),
            ("duradel", 3),
            ("kuradal", 3),
            ("krystilia", 3),
        ]
        .into_iter()
        .map(|(name, required)| (name.to_string(), required))
        .collect();
        Self {
            milestone_keys: 1,
            milestone_gold: 200,
            thresholds,
            fallback_threshold: 5,
        }
    }
}

/// Flat keys and gold, used for the start tile and new-player resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatReward {
    pub keys: u32,
    pub gold: u64,
}

/// Parameter ranges and payout for one daily difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTierReward {
    pub kills: AmountRange,
    pub levels: AmountRange,
    pub amount: AmountRange,
    pub keys: u32,
    pub gold: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRewards {
    pub easy: DailyTierReward,
    pub medium: DailyTierReward,
    pub hard: DailyTierReward,
    pub elite: DailyTierReward,
}

impl DailyRewards {
    #[must_use]
    pub const fn tier(&self, difficulty: DailyDifficulty) -> &DailyTierReward {
        match difficulty {
            DailyDifficulty::Easy => &self.easy,
            DailyDifficulty::Medium => &self.medium,
            DailyDifficulty::Hard => &self.hard,
            DailyDifficulty::Elite => &self.elite,
        }
    }
}

impl Default for DailyRewards {
    fn default() -> Self {
        Self {
            easy: DailyTierReward {
                kills: AmountRange::new(1, 3),
                levels: AmountRange::new(1, 2),
                amount: AmountRange::new(50, 100),
                keys: 1,
                gold: 50,
            },
            medium: DailyTierReward {
                kills: AmountRange::new(3, 5),
                levels: AmountRange::new(2, 3),
                amount: AmountRange::new(20, 50),
                keys: 2,
                gold: 150,
            },
            hard: DailyTierReward {
                kills: AmountRange::new(5, 10),
                levels: AmountRange::new(3, 5),
                amount: AmountRange::new(10, 30),
                keys: 3,
                gold: 350,
            },
            elite: DailyTierReward {
                kills: AmountRange::new(10, 15),
                levels: AmountRange::new(5, 7),
                amount: AmountRange::new(5, 15),
                keys: 5,
                gold: 750,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopPrices {
    pub key_price: u64,
}

impl Default for ShopPrices {
    fn default() -> Self {
        Self { key_price: 100 }
    }
}

/// Complete balance table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardPolicy {
    pub boss: BossRewards,
    pub quest: QuestRewards,
    pub skill: SkillRewards,
    pub exchange: ExchangeRewards,
    pub slayer: SlayerRewards,
    pub start_task: FlatReward,
    pub starting: FlatReward,
    pub daily: DailyRewards,
    pub shop: ShopPrices,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            boss: BossRewards::default(),
            quest: QuestRewards::default(),
            skill: SkillRewards::default(),
            exchange: ExchangeRewards::default(),
            slayer: SlayerRewards::default(),
            start_task: FlatReward { keys: 2, gold: 50 },
            starting: FlatReward { keys: 1, gold: 50 },
            daily: DailyRewards::default(),
            shop: ShopPrices::default(),
        }
    }
}

impl RewardPolicy {
    /// Parse a policy from JSON and validate it. Missing sections keep their
    /// default values.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError` if the JSON is malformed or any table is invalid.
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Validate ranges, weights and thresholds.
    ///
    /// # Errors
    ///
    /// Returns the first `PolicyError` encountered.
    pub fn validate(&self) -> Result<(), PolicyError> {
        self.boss.low.kills.validate("boss.low.kills")?;
        self.boss.mid.kills.validate("boss.mid.kills")?;
        self.boss.high.kills.validate("boss.high.kills")?;
        self.boss.elite.kills.validate("boss.elite.kills")?;

        self.exchange.cheap.quantity.validate("exchange.cheap.quantity")?;
        self.exchange.medium.quantity.validate("exchange.medium.quantity")?;
        self.exchange.expensive.quantity.validate("exchange.expensive.quantity")?;
        self.exchange.luxury.quantity.validate("exchange.luxury.quantity")?;
        if self.exchange.weights().iter().all(|weight| *weight == 0) {
            return Err(PolicyError::ZeroWeights {
                field: "exchange",
            });
        }

        self.validate_skill_bands()?;

        for (field, tier) in [
            ("daily.easy", &self.daily.easy),
            ("daily.medium", &self.daily.medium),
            ("daily.hard", &self.daily.hard),
            ("daily.elite", &self.daily.elite),
        ] {
            tier.kills.validate(field)?;
            tier.levels.validate(field)?;
            tier.amount.validate(field)?;
        }

        if self.slayer.fallback_threshold == 0 {
            return Err(PolicyError::ZeroThreshold {
                master: "<fallback>".to_string(),
            });
        }
        if let Some((master, _)) = self.slayer.thresholds.iter().find(|(_, n)| **n == 0) {
            return Err(PolicyError::ZeroThreshold {
                master: master.clone(),
            });
        }
        Ok(())
    }

    fn validate_skill_bands(&self) -> Result<(), PolicyError> {
        let bands = &self.skill.bands;
        if bands.is_empty()
            || bands
                .windows(2)
                .any(|pair| pair[0].max_level >= pair[1].max_level)
        {
            return Err(PolicyError::SkillBands);
        }
        for band in bands {
            band.increase.validate("skill.bands.increase")?;
        }
        Ok(())
    }

    /// Names of the default roster whose threshold is configured explicitly.
    #[must_use]
    pub fn configured_masters(&self) -> Vec<&'static str> {
        SLAYER_MASTERS
            .into_iter()
            .filter(|name| {
                self.slayer
                    .thresholds
                    .contains_key(&name.to_ascii_lowercase())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        let policy = RewardPolicy::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.configured_masters().len(), SLAYER_MASTERS.len());
    }

    #[test]
    fn skill_bands_shrink_with_level() {
        let skill = SkillRewards::default();
        assert_eq!(skill.increase_for(1), AmountRange::new(1, 10));
        assert_eq!(skill.increase_for(40), AmountRange::new(1, 10));
        assert_eq!(skill.increase_for(41), AmountRange::new(1, 5));
        assert_eq!(skill.increase_for(76), AmountRange::new(1, 1));
        assert_eq!(skill.increase_for(98), AmountRange::new(1, 1));
    }

    #[test]
    fn thresholds_classify_boundaries() {
        let skill = SkillRewards::default().difficulty;
        assert_eq!(skill.classify(2), Difficulty::Easy);
        assert_eq!(skill.classify(3), Difficulty::Medium);
        assert_eq!(skill.classify(8), Difficulty::Hard);
        assert_eq!(skill.classify(9), Difficulty::Elite);
        let quest = QuestRewards::default().difficulty;
        assert_eq!(quest.classify(0), Difficulty::Easy);
        assert_eq!(quest.classify(1), Difficulty::Medium);
        assert_eq!(quest.classify(3), Difficulty::Hard);
        assert_eq!(quest.classify(4), Difficulty::Elite);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let policy = RewardPolicy::from_json(r#"{"shop":{"key_price":250}}"#).unwrap();
        assert_eq!(policy.shop.key_price, 250);
        assert_eq!(policy.boss, BossRewards::default());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut policy = RewardPolicy::default();
        policy.boss.mid.kills = AmountRange::new(15, 5);
        let err = policy.validate().unwrap_err();
        assert!(matches!(
            err,
            PolicyError::InvertedRange {
                field: "boss.mid.kills",
                ..
            }
        ));
    }

    #[test]
    fn zero_weights_are_rejected() {
        let mut policy = RewardPolicy::default();
        for tier in [
            &mut policy.exchange.cheap,
            &mut policy.exchange.medium,
            &mut policy.exchange.expensive,
            &mut policy.exchange.luxury,
        ] {
            tier.weight = 0;
        }
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::ZeroWeights { .. })
        ));
    }

    #[test]
    fn unordered_bands_are_rejected() {
        let mut policy = RewardPolicy::default();
        policy.skill.bands.swap(0, 1);
        assert!(matches!(policy.validate(), Err(PolicyError::SkillBands)));
    }

    #[test]
    fn slayer_threshold_lookup_is_case_insensitive() {
        let slayer = SlayerRewards::default();
        assert_eq!(slayer.threshold_for("Duradel"), 3);
        assert_eq!(slayer.threshold_for("Unknown"), slayer.fallback_threshold);
    }
}
