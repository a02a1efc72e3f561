//! Slayer-master milestone counters, a secondary key source.
use serde::{Deserialize, Serialize};

use crate::catalog::{MASTER_SWAPS, SLAYER_MASTERS, master_image};
use crate::error::GameError;
use crate::providers::QuestMilestones;
use crate::rewards::SlayerRewards;
use crate::state::ProgressionState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlayerMaster {
    pub name: String,
    pub image: String,
    pub tasks_completed: u32,
    pub required_tasks: u32,
}

impl SlayerMaster {
    #[must_use]
    pub fn new(name: &str, required_tasks: u32) -> Self {
        Self {
            name: name.to_string(),
            image: master_image(name),
            tasks_completed: 0,
            required_tasks,
        }
    }

    /// Progress towards the next milestone as a percentage.
    #[must_use]
    pub fn progress_pct(&self) -> f64 {
        crate::numbers::percentage(
            usize::try_from(self.tasks_completed).unwrap_or(usize::MAX),
            usize::try_from(self.required_tasks).unwrap_or(usize::MAX),
        )
    }
}

/// Ordered list of slayer masters, persisted as a plain array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlayerRoster(Vec<SlayerMaster>);

/// Result of recording one slayer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlayerOutcome {
    pub roster: SlayerRoster,
    pub state: ProgressionState,
    pub milestone_reached: bool,
}

impl SlayerRoster {
    /// The default nine masters with thresholds from `policy`.
    #[must_use]
    pub fn from_policy(policy: &SlayerRewards) -> Self {
        Self(
            SLAYER_MASTERS
                .into_iter()
                .map(|name| SlayerMaster::new(name, policy.threshold_for(name)))
                .collect(),
        )
    }

    /// Parse a roster from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Case-insensitive lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SlayerMaster> {
        self.0
            .iter()
            .find(|master| master.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlayerMaster> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Record one completed task for `name`. Reaching the threshold resets
    /// the counter and credits the milestone reward.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSlayerMaster` if no master matches `name`.
    pub fn increment(
        &self,
        name: &str,
        state: &ProgressionState,
        policy: &SlayerRewards,
    ) -> Result<SlayerOutcome, GameError> {
        let index = self
            .0
            .iter()
            .position(|master| master.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| GameError::UnknownSlayerMaster(name.to_string()))?;

        let mut roster = self.clone().with_policy_thresholds(policy);
        let mut next = state.clone();
        let master = &mut roster.0[index];
        let count = master.tasks_completed.saturating_add(1);
        let milestone_reached = count >= master.required_tasks;
        if milestone_reached {
            master.tasks_completed = 0;
            next.keys = next.keys.saturating_add(policy.milestone_keys);
            next.gold = next.gold.saturating_add(policy.milestone_gold);
        } else {
            master.tasks_completed = count;
        }
        Ok(SlayerOutcome {
            roster,
            state: next,
            milestone_reached,
        })
    }

    /// Replace zero thresholds, which would pay a milestone on every task,
    /// with the policy threshold for that master.
    #[must_use]
    pub fn with_policy_thresholds(mut self, policy: &SlayerRewards) -> Self {
        for master in &mut self.0 {
            if master.required_tasks == 0 {
                master.required_tasks = policy.threshold_for(&master.name).max(1);
            }
        }
        self
    }

    /// Replace masters superseded by completed quests. Counters carry over;
    /// the threshold follows the replacement. Already-swapped rosters are
    /// returned unchanged.
    #[must_use]
    pub fn apply_quest_swaps(&self, milestones: QuestMilestones, policy: &SlayerRewards) -> Self {
        let mut roster = self.clone();
        for swap in MASTER_SWAPS {
            if !milestones.is_completed(swap.quest) {
                continue;
            }
            for master in &mut roster.0 {
                if master.name == swap.old {
                    master.name = swap.new.to_string();
                    master.image = master_image(swap.new);
                    master.required_tasks = policy.threshold_for(swap.new);
                }
            }
        }
        roster
    }
}

impl Default for SlayerRoster {
    fn default() -> Self {
        Self::from_policy(&SlayerRewards::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::RewardPolicy;
    use crate::state::PlayerStats;

    fn state() -> ProgressionState {
        ProgressionState::new("slayer", PlayerStats::default(), 0, &RewardPolicy::default())
    }

    #[test]
    fn default_roster_uses_policy_thresholds() {
        let roster = SlayerRoster::default();
        assert_eq!(roster.len(), 9);
        assert_eq!(roster.get("turael").unwrap().required_tasks, 10);
        assert_eq!(roster.get("Krystilia").unwrap().required_tasks, 3);
        assert_eq!(
            roster.get("Konar").unwrap().image,
            "slayer_masters/Konar_head.png"
        );
    }

    #[test]
    fn milestone_resets_counter_and_pays_out() {
        let policy = SlayerRewards::default();
        let mut roster = SlayerRoster::default();
        let mut progress = state();
        for expected in 1..3 {
            let outcome = roster.increment("Duradel", &progress, &policy).unwrap();
            assert!(!outcome.milestone_reached);
            roster = outcome.roster;
            progress = outcome.state;
            assert_eq!(roster.get("Duradel").unwrap().tasks_completed, expected);
        }
        let before = progress.clone();
        let outcome = roster.increment("duradel", &progress, &policy).unwrap();
        assert!(outcome.milestone_reached);
        assert_eq!(outcome.roster.get("Duradel").unwrap().tasks_completed, 0);
        assert_eq!(outcome.state.keys, before.keys + 1);
        assert_eq!(outcome.state.gold, before.gold + 200);
    }

    #[test]
    fn unknown_master_is_rejected() {
        let roster = SlayerRoster::default();
        let err = roster
            .increment("Mandrith", &state(), &SlayerRewards::default())
            .unwrap_err();
        assert!(matches!(err, GameError::UnknownSlayerMaster(name) if name == "Mandrith"));
    }

    #[test]
    fn quest_swaps_replace_masters_once() {
        let policy = SlayerRewards::default();
        let roster = SlayerRoster::default()
            .increment("Turael", &state(), &policy)
            .unwrap()
            .roster;
        let milestones = QuestMilestones {
            while_guthix_sleeps: true,
            monkey_madness_ii: false,
        };
        let swapped = roster.apply_quest_swaps(milestones, &policy);
        assert!(swapped.get("Turael").is_none());
        assert_eq!(swapped.get("Aya").unwrap().tasks_completed, 1);
        assert_eq!(swapped.get("Aya").unwrap().image, "slayer_masters/Aya_head.png");
        assert!(swapped.get("Achtryn").is_some());
        assert!(swapped.get("Kuradal").is_some());
        assert!(swapped.get("Nieve").is_some());
        assert_eq!(swapped.apply_quest_swaps(milestones, &policy), swapped);
    }

    #[test]
    fn zero_thresholds_fall_back_to_policy() {
        let policy = SlayerRewards::default();
        let json = r#"[{"name":"Konar","image":"slayer_masters/Konar_head.png","tasksCompleted":0,"requiredTasks":0}]"#;
        let roster = SlayerRoster::from_json(json).unwrap();

        let repaired = roster.clone().with_policy_thresholds(&policy);
        assert_eq!(repaired.get("Konar").unwrap().required_tasks, 5);

        let mut roster = roster;
        let mut progress = state();
        let mut milestones = 0;
        for _ in 0..5 {
            let outcome = roster.increment("Konar", &progress, &policy).unwrap();
            milestones += usize::from(outcome.milestone_reached);
            roster = outcome.roster;
            progress = outcome.state;
        }
        assert_eq!(milestones, 1);
        assert_eq!(progress.keys, state().keys + 1);
    }

    #[test]
    fn progress_tracks_counter_against_threshold() {
        let policy = SlayerRewards::default();
        let roster = SlayerRoster::default()
            .increment("Nieve", &state(), &policy)
            .unwrap()
            .roster;
        assert!((roster.get("Nieve").unwrap().progress_pct() - 25.0).abs() < f64::EPSILON);
        assert!(roster.get("Konar").unwrap().progress_pct().abs() < f64::EPSILON);
    }

    #[test]
    fn roster_persists_as_array() {
        let json = serde_json::to_string(&SlayerRoster::default()).unwrap();
        assert!(json.starts_with(r#"[{"name":"Turael","image":"#));
        let restored = SlayerRoster::from_json(&json).unwrap();
        assert_eq!(restored, SlayerRoster::default());
    }
}
