//! Generated task records bound to grid tiles and daily challenges.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::catalog::Skill;
use crate::numbers::group_thousands;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Start,
    Skill,
    Quest,
    /// Also receives legacy "drop" tasks.
    #[serde(alias = "drop")]
    Boss,
    #[serde(rename = "grandexchange")]
    GrandExchange,
    Daily,
}

impl TaskCategory {
    /// Categories the tile generator draws from.
    pub const GENERATED: [Self; 4] = [Self::Skill, Self::Quest, Self::Boss, Self::GrandExchange];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Skill => "skill",
            Self::Quest => "quest",
            Self::Boss => "boss",
            Self::GrandExchange => "grandexchange",
            Self::Daily => "daily",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Elite,
    Master,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Elite => "elite",
            Self::Master => "master",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "elite" => Ok(Self::Elite),
            "master" => Ok(Self::Master),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
    Keys,
    Gold,
    /// Reserved; no generator grants experience.
    Experience,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    #[serde(rename = "type")]
    pub kind: RewardKind,
    pub amount: u64,
}

impl Reward {
    #[must_use]
    pub const fn keys(amount: u64) -> Self {
        Self {
            kind: RewardKind::Keys,
            amount,
        }
    }

    #[must_use]
    pub const fn gold(amount: u64) -> Self {
        Self {
            kind: RewardKind::Gold,
            amount,
        }
    }

    /// Player-facing label such as `"2 Keys"` or `"1,500 Gold"`.
    #[must_use]
    pub fn description(&self) -> String {
        match self.kind {
            RewardKind::Keys => {
                let plural = if self.amount == 1 { "" } else { "s" };
                format!("{} Key{plural}", self.amount)
            }
            RewardKind::Gold => format!("{} Gold", group_thousands(self.amount)),
            RewardKind::Experience => format!("{} XP", group_thousands(self.amount)),
        }
    }
}

pub type RewardList = SmallVec<[Reward; 2]>;

/// Build a reward list from key and gold amounts, dropping zero entries.
#[must_use]
pub fn rewards(keys: u32, gold: u64) -> RewardList {
    let mut list = RewardList::new();
    if keys > 0 {
        list.push(Reward::keys(u64::from(keys)));
    }
    if gold > 0 {
        list.push(Reward::gold(gold));
    }
    list
}

/// Objective the player must meet to complete a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    Skill {
        skill: Skill,
        current_level: u32,
        target_level: u32,
    },
    SkillGain {
        skill: Skill,
        levels: u32,
    },
    Quest {
        title: String,
    },
    Boss {
        name: String,
        kill_count: u32,
    },
    Item {
        name: String,
        quantity: u32,
    },
}

/// An immutable task bound to a tile or daily slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub category: TaskCategory,
    pub difficulty: Difficulty,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub rewards: RewardList,
}

impl Task {
    /// Sum of all reward entries of one kind.
    #[must_use]
    pub fn reward_total(&self, kind: RewardKind) -> u64 {
        self.rewards
            .iter()
            .filter(|reward| reward.kind == kind)
            .fold(0u64, |acc, reward| acc.saturating_add(reward.amount))
    }

    /// Skill targeted by a skill-training requirement, if any.
    #[must_use]
    pub fn skill(&self) -> Option<Skill> {
        self.requirements.iter().find_map(|req| match req {
            Requirement::Skill { skill, .. } | Requirement::SkillGain { skill, .. } => Some(*skill),
            _ => None,
        })
    }

    /// Duplicate when both train the same skill, or share category and title.
    #[must_use]
    pub fn duplicates(&self, other: &Self) -> bool {
        if self.category == TaskCategory::Skill
            && other.category == TaskCategory::Skill
            && let (Some(mine), Some(theirs)) = (self.skill(), other.skill())
            && mine == theirs
        {
            return true;
        }
        self.category == other.category && self.title == other.title
    }
}
