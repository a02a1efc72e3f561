//! Contracts for the upstream hiscores and quest services.
//!
//! Transport lives outside the engine. Implementations only need to map a
//! player name to a stat snapshot or a quest list.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{MONKEY_MADNESS_II, WHILE_GUTHIX_SLEEPS};
use crate::constants::STAT_REFRESH_INTERVAL_MS;
use crate::state::PlayerStats;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("player `{0}` was not found")]
    NotFound(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

pub trait StatProvider {
    /// Fetch the current hiscores snapshot.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown players and `Unavailable` for transport
    /// failures.
    fn fetch_stats(&self, player_name: &str) -> Result<PlayerStats, ProviderError>;
}

pub trait QuestProvider {
    /// Fetch the player's quest list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown players and `Unavailable` for transport
    /// failures.
    fn fetch_quests(&self, player_name: &str) -> Result<Vec<QuestRecord>, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestStatus {
    NotStarted,
    Started,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRecord {
    pub title: String,
    pub status: QuestStatus,
    #[serde(default)]
    pub quest_points: u32,
    #[serde(default)]
    pub user_eligible: bool,
}

impl QuestRecord {
    /// Eligible and not yet completed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.user_eligible && self.status != QuestStatus::Completed
    }
}

/// Completion flags for the quests that reshape the slayer roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestMilestones {
    pub while_guthix_sleeps: bool,
    pub monkey_madness_ii: bool,
}

impl QuestMilestones {
    #[must_use]
    pub fn from_records(records: &[QuestRecord]) -> Self {
        let completed = |title: &str| {
            records
                .iter()
                .any(|quest| quest.title == title && quest.status == QuestStatus::Completed)
        };
        Self {
            while_guthix_sleeps: completed(WHILE_GUTHIX_SLEEPS),
            monkey_madness_ii: completed(MONKEY_MADNESS_II),
        }
    }

    /// Flags are sticky: once seen, a completion is never forgotten.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            while_guthix_sleeps: self.while_guthix_sleeps || other.while_guthix_sleeps,
            monkey_madness_ii: self.monkey_madness_ii || other.monkey_madness_ii,
        }
    }

    #[must_use]
    pub fn is_completed(&self, quest: &str) -> bool {
        match quest {
            WHILE_GUTHIX_SLEEPS => self.while_guthix_sleeps,
            MONKEY_MADNESS_II => self.monkey_madness_ii,
            _ => false,
        }
    }
}

/// Whether a snapshot fetched at `fetched_at_ms` is stale at `now_ms`.
#[must_use]
pub const fn needs_refresh(fetched_at_ms: i64, now_ms: i64) -> bool {
    now_ms.saturating_sub(fetched_at_ms) > STAT_REFRESH_INTERVAL_MS
}
