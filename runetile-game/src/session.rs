//! Player sessions: the engine wiring that turns pure transitions into play.
//!
//! A [`GameEngine`] owns the injected services (blob store, stat and quest
//! providers), the reward policy and a clock. [`GameEngine::start_session`]
//! resumes or creates a run and returns a [`GameSession`] whose actions each
//! compute a complete new state, refill the task frontier and then commit and
//! persist in one step. A failed action leaves the session untouched.
use anyhow::Context;

use crate::daily::{
    DailyChallengeState, DailyDifficulty, complete_daily, generate_all_daily_tasks, local_date,
};
use crate::error::{CompleteBlock, GameError};
use crate::generator::TaskGenerator;
use crate::grid;
use crate::position::Position;
use crate::providers::{ProviderError, QuestMilestones, QuestProvider, StatProvider, needs_refresh};
use crate::random::RandomSource;
use crate::rewards::RewardPolicy;
use crate::shop;
use crate::slayer::SlayerRoster;
use crate::state::{PlayerStats, ProgressionState, TileState};
use crate::storage::{BlobStore, Persistence, StorageError, export_progress, import_progress};
use crate::task::Task;

/// Unix milliseconds source.
pub type Clock = Box<dyn Fn() -> i64>;

#[must_use]
pub fn system_now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Main engine for managing player sessions
pub struct GameEngine<S, P, Q>
where
    S: BlobStore,
    P: StatProvider,
    Q: QuestProvider,
{
    persistence: Persistence<S>,
    stats: P,
    quests: Q,
    policy: RewardPolicy,
    clock: Clock,
}

impl<S, P, Q> GameEngine<S, P, Q>
where
    S: BlobStore,
    P: StatProvider,
    Q: QuestProvider,
{
    /// Engine with the default reward policy and the system clock.
    pub fn new(store: S, stats: P, quests: Q) -> Self {
        Self {
            persistence: Persistence::new(store),
            stats,
            quests,
            policy: RewardPolicy::default(),
            clock: Box::new(system_now_ms),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RewardPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub const fn policy(&self) -> &RewardPolicy {
        &self.policy
    }

    pub const fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    fn now_ms(&self) -> i64 {
        (self.clock)()
    }

    /// Local calendar date according to the engine clock.
    pub fn today(&self) -> String {
        local_date(self.now_ms())
    }

    /// Today's four daily challenges.
    pub fn daily_tasks(&self) -> [Task; 4] {
        generate_all_daily_tasks(&self.today(), &self.policy.daily)
    }

    /// Resume the saved run for `player_name`, or start a new one from a
    /// fresh stat lookup. A failed lookup falls back to the last saved
    /// snapshot for that player.
    ///
    /// # Errors
    ///
    /// Returns `Provider` when a new run is needed and neither the stat
    /// provider nor the saved-stats directory can supply stats.
    pub fn start_session(
        &self,
        player_name: &str,
        rng: Box<dyn RandomSource>,
    ) -> Result<GameSession<'_, S, P, Q>, GameError> {
        let name = player_name.trim();
        if name.is_empty() {
            return Err(ProviderError::NotFound(String::new()).into());
        }
        let today = self.today();
        let daily = self
            .persistence
            .load_daily()
            .map_or_else(|| DailyChallengeState::for_date(&today), |saved| saved.refresh(&today));

        let (state, roster, resumed) = match self.persistence.load_progress() {
            Some(saved) if saved.belongs_to(name) => {
                let roster = self.persistence.load_slayer().map_or_else(
                    || SlayerRoster::from_policy(&self.policy.slayer),
                    |saved| saved.with_policy_thresholds(&self.policy.slayer),
                );
                (saved, roster, true)
            }
            _ => {
                let (stats, fetched_at) = self.initial_stats(name)?;
                let state = ProgressionState::new(name, stats, fetched_at, &self.policy);
                (state, SlayerRoster::from_policy(&self.policy.slayer), false)
            }
        };

        let mut session = GameSession {
            engine: self,
            rng,
            state,
            roster,
            daily,
            milestones: QuestMilestones::default(),
        };
        if resumed {
            session.refresh_stats();
        }
        let filled = session.regenerate(session.state.clone());
        session.commit(filled);
        self.persistence.save_slayer(&session.roster);
        self.persistence.save_daily(&session.daily);
        Ok(session)
    }

    /// Resume whatever run is saved, without contacting any provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored run cannot be read or parsed.
    pub fn resume_saved(
        &self,
        rng: Box<dyn RandomSource>,
    ) -> anyhow::Result<Option<GameSession<'_, S, P, Q>>> {
        let Some(saved) = self
            .persistence
            .try_load_progress()
            .context("reading saved run")?
        else {
            return Ok(None);
        };
        let today = self.today();
        let daily = self
            .persistence
            .load_daily()
            .map_or_else(|| DailyChallengeState::for_date(&today), |d| d.refresh(&today));
        let roster = self.persistence.load_slayer().map_or_else(
            || SlayerRoster::from_policy(&self.policy.slayer),
            |saved| saved.with_policy_thresholds(&self.policy.slayer),
        );
        Ok(Some(GameSession {
            engine: self,
            rng,
            state: saved,
            roster,
            daily,
            milestones: QuestMilestones::default(),
        }))
    }

    fn initial_stats(&self, name: &str) -> Result<(PlayerStats, i64), GameError> {
        let now = self.now_ms();
        match self.stats.fetch_stats(name) {
            Ok(stats) => {
                self.persistence.remember_stats(name, &stats, now);
                Ok((stats, now))
            }
            Err(err) => match self.persistence.saved_stats(name) {
                Some(saved) => {
                    log::warn!("stat lookup for {name} failed ({err}); using saved snapshot");
                    Ok((saved.stats, saved.timestamp))
                }
                None => Err(err.into()),
            },
        }
    }
}

/// One player's live run.
pub struct GameSession<'e, S, P, Q>
where
    S: BlobStore,
    P: StatProvider,
    Q: QuestProvider,
{
    engine: &'e GameEngine<S, P, Q>,
    rng: Box<dyn RandomSource>,
    state: ProgressionState,
    roster: SlayerRoster,
    daily: DailyChallengeState,
    milestones: QuestMilestones,
}

impl<S, P, Q> GameSession<'_, S, P, Q>
where
    S: BlobStore,
    P: StatProvider,
    Q: QuestProvider,
{
    pub const fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub const fn roster(&self) -> &SlayerRoster {
        &self.roster
    }

    pub const fn daily(&self) -> &DailyChallengeState {
        &self.daily
    }

    /// Quest milestones seen during this session.
    pub const fn milestones(&self) -> QuestMilestones {
        self.milestones
    }

    pub fn visible_positions(&self) -> Vec<Position> {
        grid::compute_visible_positions(&self.state)
    }

    pub fn tile_state(&self, position: Position) -> TileState {
        grid::tile_state(position, &self.state)
    }

    pub fn task_at(&self, position: Position) -> Option<&Task> {
        self.state.task_at(position)
    }

    /// Fill the frontier of `state` and apply any slayer swaps unlocked by
    /// quests seen while generating.
    fn regenerate(&mut self, state: ProgressionState) -> ProgressionState {
        let engine = self.engine;
        let mut generator = TaskGenerator::new(
            &engine.policy,
            &state.player_stats,
            &state.player_name,
            &engine.quests,
        );
        let filled = generator.fill_frontier(&state, self.rng.as_mut());
        let milestones = self.milestones.merge(generator.milestones());
        if milestones != self.milestones {
            self.milestones = milestones;
            let swapped = self.roster.apply_quest_swaps(milestones, &engine.policy.slayer);
            if swapped != self.roster {
                log::debug!("quest milestones changed the slayer roster");
                self.roster = swapped;
                engine.persistence.save_slayer(&self.roster);
            }
        }
        filled
    }

    fn commit(&mut self, state: ProgressionState) {
        self.state = state.touched(self.engine.now_ms());
        self.engine.persistence.save_progress(&self.state);
    }

    /// Spend a key on `position_key` and generate tasks for the tiles it
    /// reveals.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPosition` or `CannotUnlock`.
    pub fn unlock(&mut self, position_key: &str) -> Result<&ProgressionState, GameError> {
        let next = grid::unlock(position_key, &self.state)?;
        let next = self.regenerate(next);
        self.commit(next);
        Ok(&self.state)
    }

    /// Complete the task on `position_key` and return it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPosition`, or `CannotComplete` when the tile is locked,
    /// already completed or has no task.
    pub fn complete(&mut self, position_key: &str) -> Result<Task, GameError> {
        let position: Position = position_key.parse()?;
        let task = self
            .state
            .task_at(position)
            .cloned()
            .ok_or(GameError::CannotComplete {
                position,
                reason: CompleteBlock::MissingTask,
            })?;
        let next = grid::complete_position(position, &task, &self.state)?;
        self.commit(next);
        Ok(task)
    }

    /// Buy keys at the policy's shop price.
    ///
    /// # Errors
    ///
    /// Returns `Shop` when the order is empty or unaffordable.
    pub fn purchase_keys(&mut self, key_amount: u32) -> Result<&ProgressionState, GameError> {
        let next = shop::purchase(&self.state, key_amount, self.engine.policy.shop.key_price)?;
        self.commit(next);
        Ok(&self.state)
    }

    /// Record a slayer task; returns whether a milestone paid out.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSlayerMaster` if `master` is not on the roster.
    pub fn increment_slayer(&mut self, master: &str) -> Result<bool, GameError> {
        let outcome = self
            .roster
            .increment(master, &self.state, &self.engine.policy.slayer)?;
        self.roster = outcome.roster;
        self.engine.persistence.save_slayer(&self.roster);
        self.commit(outcome.state);
        Ok(outcome.milestone_reached)
    }

    pub fn daily_tasks(&self) -> [Task; 4] {
        self.engine.daily_tasks()
    }

    /// Clear the daily flags if the calendar day has rolled over.
    pub fn refresh_daily(&mut self) -> &DailyChallengeState {
        let refreshed = self.daily.refresh(&self.engine.today());
        if refreshed != self.daily {
            self.daily = refreshed;
            self.engine.persistence.save_daily(&self.daily);
        }
        &self.daily
    }

    /// Claim today's `difficulty` challenge and return its task.
    ///
    /// # Errors
    ///
    /// Returns `DailyAlreadyCompleted` if it was already claimed today.
    pub fn complete_daily(&mut self, difficulty: DailyDifficulty) -> Result<Task, GameError> {
        let outcome = complete_daily(
            &self.state,
            &self.daily,
            difficulty,
            &self.engine.today(),
            &self.engine.policy.daily,
        )?;
        self.daily = outcome.daily;
        self.engine.persistence.save_daily(&self.daily);
        self.commit(outcome.state);
        Ok(outcome.task)
    }

    /// Refetch stats when the cached snapshot is older than the refresh
    /// interval. Returns whether new stats were applied; on failure the
    /// cached stats stay in place.
    pub fn refresh_stats(&mut self) -> bool {
        let now = self.engine.now_ms();
        if !needs_refresh(self.state.stats_fetched_at, now) {
            return false;
        }
        match self.engine.stats.fetch_stats(&self.state.player_name) {
            Ok(stats) => {
                self.engine
                    .persistence
                    .remember_stats(&self.state.player_name, &stats, now);
                let next = self.state.with_stats(stats, now);
                self.commit(next);
                true
            }
            Err(err) => {
                log::warn!(
                    "stat refresh for {} failed ({err}); keeping cached stats",
                    self.state.player_name
                );
                false
            }
        }
    }

    /// Current run as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be encoded.
    pub fn export(&self) -> Result<String, StorageError> {
        export_progress(&self.state)
    }

    /// Replace the run with an exported one.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is malformed or inconsistent; the current
    /// run is kept in that case.
    pub fn import(&mut self, json: &str) -> Result<(), StorageError> {
        let imported = import_progress(json)?;
        let next = self.regenerate(imported);
        self.commit(next);
        Ok(())
    }

    /// Erase the saved run, roster and daily flags and end the session.
    pub fn reset(self) {
        self.engine.persistence.reset();
    }
}
