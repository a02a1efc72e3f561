//! Date-seeded daily challenges.
//!
//! Every choice is derived from [`seeded_fraction`] over the string
//! `"<date>-<difficulty>"` (plus a per-choice suffix), so all players see the
//! same four tasks on a given calendar day. Only completion flags persist.
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::{BossTier, ItemTier, Skill, bosses_in_tier, daily_item_categories};
use crate::error::GameError;
use crate::grid::credit;
use crate::numbers::fraction_to_index;
use crate::random::seeded_fraction;
use crate::rewards::{DailyRewards, DailyTierReward};
use crate::state::ProgressionState;
use crate::task::{Difficulty, Requirement, Task, TaskCategory, rewards};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DailyDifficulty {
    Easy,
    Medium,
    Hard,
    Elite,
}

impl DailyDifficulty {
    pub const ALL: [Self; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Elite];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Elite => "elite",
        }
    }

    #[must_use]
    pub const fn difficulty(self) -> Difficulty {
        match self {
            Self::Easy => Difficulty::Easy,
            Self::Medium => Difficulty::Medium,
            Self::Hard => Difficulty::Hard,
            Self::Elite => Difficulty::Elite,
        }
    }

    #[must_use]
    pub const fn boss_tier(self) -> BossTier {
        match self {
            Self::Easy => BossTier::Low,
            Self::Medium => BossTier::Mid,
            Self::Hard => BossTier::High,
            Self::Elite => BossTier::Elite,
        }
    }

    #[must_use]
    pub const fn item_tier(self) -> ItemTier {
        match self {
            Self::Easy => ItemTier::Cheap,
            Self::Medium => ItemTier::Medium,
            Self::Hard => ItemTier::Expensive,
            Self::Elite => ItemTier::Luxury,
        }
    }
}

impl fmt::Display for DailyDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DailyDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.as_str() == lowered)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DailyKind {
    Boss,
    Skill,
    GrandExchange,
}

const DAILY_KINDS: [DailyKind; 3] = [DailyKind::Boss, DailyKind::Skill, DailyKind::GrandExchange];

fn seeded_element<'a, T>(items: &'a [T], seed: &str) -> Option<&'a T> {
    items.get(fraction_to_index(seeded_fraction(seed), items.len()))
}

fn plural(count: u32) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// The daily task for `difficulty` on `date` (`YYYY-MM-DD`). Identical
/// inputs always produce identical tasks.
#[must_use]
pub fn generate_daily_task(difficulty: DailyDifficulty, date: &str, policy: &DailyRewards) -> Task {
    let seed = format!("{date}-{difficulty}");
    let tier = policy.tier(difficulty);
    let kind = seeded_element(&DAILY_KINDS, &format!("{seed}-type"))
        .copied()
        .unwrap_or(DailyKind::Skill);

    let (title, description, requirement) = match kind {
        DailyKind::Boss => boss_objective(difficulty, tier, &seed),
        DailyKind::Skill => None,
        DailyKind::GrandExchange => Some(exchange_objective(difficulty, tier, &seed)),
    }
    .unwrap_or_else(|| skill_objective(tier, &seed));

    Task {
        id: format!("daily-{difficulty}-{date}"),
        category: TaskCategory::Daily,
        difficulty: difficulty.difficulty(),
        title,
        description,
        requirements: vec![requirement],
        rewards: rewards(tier.keys, tier.gold),
    }
}

type Objective = (String, String, Requirement);

fn boss_objective(difficulty: DailyDifficulty, tier: &DailyTierReward, seed: &str) -> Option<Objective> {
    let bosses = bosses_in_tier(difficulty.boss_tier());
    let boss = seeded_element(&bosses, seed)?;
    let kill_count = tier.kills.from_fraction(seeded_fraction(&format!("{seed}-count")));
    Some((
        format!("Daily Boss: {}", boss.name),
        format!("Kill {kill_count}x {}", boss.name),
        Requirement::Boss {
            name: boss.name.to_string(),
            kill_count,
        },
    ))
}

fn skill_objective(tier: &DailyTierReward, seed: &str) -> Objective {
    let skill = seeded_element(&Skill::DAILY_ORDER, seed)
        .copied()
        .unwrap_or(Skill::Attack);
    let levels = tier.levels.from_fraction(seeded_fraction(&format!("{seed}-levels")));
    let name = skill.display_name();
    (
        format!("Daily Skill: {name}"),
        format!("Gain {levels} {name} level{}", plural(levels)),
        Requirement::SkillGain { skill, levels },
    )
}

fn exchange_objective(difficulty: DailyDifficulty, tier: &DailyTierReward, seed: &str) -> Objective {
    let categories = daily_item_categories(difficulty.item_tier());
    let category = seeded_element(categories, &format!("{seed}-cat"))
        .copied()
        .unwrap_or("Logs");
    let quantity = tier.amount.from_fraction(seeded_fraction(&format!("{seed}-amount")));
    (
        format!("Daily Grand Exchange: {category}"),
        format!("Buy {quantity}x {category} from Grand Exchange"),
        Requirement::Item {
            name: category.to_string(),
            quantity,
        },
    )
}

/// All four daily tasks for `date`, easiest first.
#[must_use]
pub fn generate_all_daily_tasks(date: &str, policy: &DailyRewards) -> [Task; 4] {
    DailyDifficulty::ALL.map(|difficulty| generate_daily_task(difficulty, date, policy))
}

/// Today's local calendar date as `YYYY-MM-DD`.
#[must_use]
pub fn today_local() -> String {
    date_string(Local::now().date_naive())
}

/// Local calendar date of a unix-millisecond timestamp.
#[must_use]
pub fn local_date(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms).map_or_else(today_local, |utc| {
        date_string(utc.with_timezone(&Local).date_naive())
    })
}

#[must_use]
pub fn date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DailyFlags {
    pub easy: bool,
    pub medium: bool,
    pub hard: bool,
    pub elite: bool,
}

/// Completion flags for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallengeState {
    pub date: String,
    pub completed_tasks: DailyFlags,
}

impl DailyChallengeState {
    #[must_use]
    pub fn for_date(date: &str) -> Self {
        Self {
            date: date.to_string(),
            completed_tasks: DailyFlags::default(),
        }
    }

    /// Flags for `today`: unchanged on the same day, all cleared otherwise.
    #[must_use]
    pub fn refresh(&self, today: &str) -> Self {
        if self.date == today {
            self.clone()
        } else {
            Self::for_date(today)
        }
    }

    #[must_use]
    pub const fn is_completed(&self, difficulty: DailyDifficulty) -> bool {
        match difficulty {
            DailyDifficulty::Easy => self.completed_tasks.easy,
            DailyDifficulty::Medium => self.completed_tasks.medium,
            DailyDifficulty::Hard => self.completed_tasks.hard,
            DailyDifficulty::Elite => self.completed_tasks.elite,
        }
    }

    #[must_use]
    pub fn marked(&self, difficulty: DailyDifficulty) -> Self {
        let mut next = self.clone();
        let flag = match difficulty {
            DailyDifficulty::Easy => &mut next.completed_tasks.easy,
            DailyDifficulty::Medium => &mut next.completed_tasks.medium,
            DailyDifficulty::Hard => &mut next.completed_tasks.hard,
            DailyDifficulty::Elite => &mut next.completed_tasks.elite,
        };
        *flag = true;
        next
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        DailyDifficulty::ALL
            .into_iter()
            .filter(|difficulty| self.is_completed(*difficulty))
            .count()
    }
}

/// Result of claiming a daily challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyOutcome {
    pub state: ProgressionState,
    pub daily: DailyChallengeState,
    pub task: Task,
}

/// Claim today's `difficulty` challenge, crediting its rewards.
///
/// # Errors
///
/// Returns `DailyAlreadyCompleted` if the flag is already set for `today`.
pub fn complete_daily(
    state: &ProgressionState,
    daily: &DailyChallengeState,
    difficulty: DailyDifficulty,
    today: &str,
    policy: &DailyRewards,
) -> Result<DailyOutcome, GameError> {
    let daily = daily.refresh(today);
    if daily.is_completed(difficulty) {
        return Err(GameError::DailyAlreadyCompleted(difficulty));
    }
    let task = generate_daily_task(difficulty, today, policy);
    Ok(DailyOutcome {
        state: credit(state, &task),
        daily: daily.marked(difficulty),
        task,
    })
}
