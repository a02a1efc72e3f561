use anyhow::{Context, Result};
use runetile_game::constants::STAT_REFRESH_INTERVAL_MS;
use runetile_game::{
    DailyDifficulty, GameEngine, GameError, GameSession, MemoryStore, Position, ProgressionState,
    RewardKind, SeededRandom, SlayerRoster, TileState, generation_frontier,
};
use serde::Serialize;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use super::fixtures::{FixtureProviders, TesterAssets};

/// 2024-05-01T00:00:00Z
pub const SIMULATION_EPOCH_MS: i64 = 1_714_521_600_000;
/// Simulated time between two play steps.
pub const STEP_MS: i64 = 3 * 60 * 60 * 1_000;

type Engine = GameEngine<MemoryStore, FixtureProviders, FixtureProviders>;
type Session<'e> = GameSession<'e, MemoryStore, FixtureProviders, FixtureProviders>;

/// How the simulated player picks the next tile to unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockStrategy {
    /// First locked tile in visibility order.
    Frontier,
    /// Locked tile closest to the origin.
    Nearest,
    /// Locked tile whose task pays the most gold.
    Richest,
}

impl UnlockStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Frontier => "frontier",
            Self::Nearest => "nearest",
            Self::Richest => "richest",
        }
    }

    fn choose(self, session: &Session<'_>) -> Option<Position> {
        let mut locked = session
            .visible_positions()
            .into_iter()
            .filter(|position| session.tile_state(*position) == TileState::Locked);
        match self {
            Self::Frontier => locked.next(),
            Self::Nearest => {
                locked.min_by_key(|position| position.x.unsigned_abs() + position.y.unsigned_abs())
            }
            Self::Richest => locked.max_by_key(|position| {
                session
                    .task_at(*position)
                    .map_or(0, |task| task.reward_total(RewardKind::Gold))
            }),
        }
    }
}

/// Scripted play session for one fixture player.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub player: String,
    pub strategy: UnlockStrategy,
    pub max_steps: usize,
    pub buy_keys: bool,
    pub slayer_master: Option<&'static str>,
    pub claim_dailies: bool,
    pub refresh_stats: bool,
    pub check_resume: bool,
    pub offline_resume: bool,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(player: impl Into<String>, strategy: UnlockStrategy) -> Self {
        Self {
            player: player.into(),
            strategy,
            max_steps: 10,
            buy_keys: false,
            slayer_master: None,
            claim_dailies: false,
            refresh_stats: false,
            check_resume: false,
            offline_resume: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    #[must_use]
    pub const fn buying_keys(mut self) -> Self {
        self.buy_keys = true;
        self
    }

    #[must_use]
    pub const fn with_slayer(mut self, master: &'static str) -> Self {
        self.slayer_master = Some(master);
        self
    }

    #[must_use]
    pub const fn claiming_dailies(mut self) -> Self {
        self.claim_dailies = true;
        self
    }

    #[must_use]
    pub const fn refreshing_stats(mut self) -> Self {
        self.refresh_stats = true;
        self
    }

    /// Reopen the saved run after the last step, optionally with every
    /// provider down.
    #[must_use]
    pub const fn with_resume(mut self, offline: bool) -> Self {
        self.check_resume = true;
        self.offline_resume = offline;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Counters gathered while a plan runs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunMetrics {
    pub steps: usize,
    pub opening_keys: u64,
    pub opening_gold: u64,
    pub keys_bought: u64,
    pub gold_spent: u64,
    pub keys_earned: u64,
    pub gold_earned: u64,
    pub category_counts: BTreeMap<String, usize>,
    pub slayer_milestones: usize,
    pub dailies_claimed: usize,
    pub daily_rejections: usize,
    pub stat_refreshes: usize,
    pub frontier_duplicates: usize,
    pub stalled: bool,
    pub violations: Vec<String>,
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub player: String,
    pub strategy: UnlockStrategy,
    pub metrics: RunMetrics,
    pub final_state: ProgressionState,
    pub roster: SlayerRoster,
    pub resumed_identically: Option<bool>,
}

impl SimulationSummary {
    /// Share of generated tiles whose task repeats an earlier one.
    #[must_use]
    pub fn duplicate_share(&self) -> f64 {
        let tiles = self.final_state.tile_tasks.len().max(1);
        runetile_game::numbers::percentage(self.metrics.frontier_duplicates, tiles) / 100.0
    }

    /// Whether the final balances equal the opening balances plus every
    /// recorded credit and purchase, minus one key per unlock.
    #[must_use]
    pub fn ledger_balances(&self) -> bool {
        let metrics = &self.metrics;
        let unlocks = u64::try_from(self.final_state.unlocked_tiles.len()).unwrap_or(u64::MAX);
        let keys_in = metrics.opening_keys + metrics.keys_earned + metrics.keys_bought;
        let gold_in = metrics.opening_gold + metrics.gold_earned;
        keys_in.checked_sub(unlocks) == Some(u64::from(self.final_state.keys))
            && gold_in.checked_sub(metrics.gold_spent) == Some(self.final_state.gold)
    }
}

/// Drives [`GameSession`]s against fixture players.
#[derive(Debug, Clone)]
pub struct GameTester {
    assets: Arc<TesterAssets>,
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(assets: Arc<TesterAssets>, verbose: bool) -> Self {
        Self { assets, verbose }
    }

    fn engine(&self, store: MemoryStore, clock: &Rc<Cell<i64>>, offline: bool) -> Engine {
        let providers = if offline {
            self.assets.providers().offline()
        } else {
            self.assets.providers()
        };
        let clock = Rc::clone(clock);
        GameEngine::new(store, providers.clone(), providers)
            .with_policy(self.assets.policy.clone())
            .with_clock(move || clock.get())
    }

    /// Play `plan` with a stream derived from `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot start or an engine action
    /// fails unexpectedly.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let store = MemoryStore::new();
        let clock = Rc::new(Cell::new(SIMULATION_EPOCH_MS));
        let engine = self.engine(store.clone(), &clock, false);
        let rng = Box::new(SeededRandom::stream(seed, plan.player.as_bytes()));
        let mut session = engine
            .start_session(&plan.player, rng)
            .with_context(|| format!("starting session for {}", plan.player))?;

        let (opening_keys, opening_gold) = balance(session.state());
        let mut metrics = RunMetrics {
            opening_keys,
            opening_gold,
            ..RunMetrics::default()
        };
        for step in 0..plan.max_steps {
            if !self.play_step(&mut session, plan, step, &mut metrics)? {
                break;
            }
            clock.set(clock.get() + STEP_MS);
        }
        metrics.frontier_duplicates = count_duplicates(session.state());
        let final_state = session.state().clone();
        let roster = session.roster().clone();
        drop(session);

        let resumed_identically = if plan.check_resume {
            Some(self.check_resume(store, &clock, plan, &final_state)?)
        } else {
            None
        };
        if self.verbose {
            log::info!(
                "{} seed {seed}: {} steps, {} keys, {} gold",
                plan.player,
                metrics.steps,
                final_state.keys,
                final_state.gold
            );
        }
        Ok(SimulationSummary {
            seed,
            player: plan.player.clone(),
            strategy: plan.strategy,
            metrics,
            final_state,
            roster,
            resumed_identically,
        })
    }

    /// One unlock-and-complete cycle plus the plan's side activities.
    /// Returns `false` once the player can make no further progress.
    fn play_step(
        &self,
        session: &mut Session<'_>,
        plan: &SimulationPlan,
        step: usize,
        metrics: &mut RunMetrics,
    ) -> Result<bool> {
        if plan.refresh_stats && session.refresh_stats() {
            metrics.stat_refreshes += 1;
        }
        let Some(target) = plan.strategy.choose(session) else {
            metrics.stalled = true;
            return Ok(false);
        };

        if session.state().keys == 0 {
            let price = self.assets.policy.shop.key_price;
            if !plan.buy_keys || session.state().gold < price {
                metrics.stalled = true;
                return Ok(false);
            }
            session.purchase_keys(1)?;
            metrics.keys_bought += 1;
            metrics.gold_spent += price;
        }

        let keys_before = session.state().keys;
        session
            .unlock(&target.key())
            .with_context(|| format!("unlocking {target}"))?;
        if session.state().keys.saturating_add(1) != keys_before {
            metrics
                .violations
                .push(format!("step {step}: unlocking {target} did not cost one key"));
        }

        let before = balance(session.state());
        let task = session
            .complete(&target.key())
            .with_context(|| format!("completing {target}"))?;
        let after = balance(session.state());
        if after.0 - before.0 != task.reward_total(RewardKind::Keys)
            || after.1 - before.1 != task.reward_total(RewardKind::Gold)
        {
            metrics
                .violations
                .push(format!("step {step}: {} paid the wrong reward", task.id));
        }
        credit(metrics, before, after);
        *metrics
            .category_counts
            .entry(task.category.to_string())
            .or_default() += 1;

        if let Some(master) = plan.slayer_master {
            let before = balance(session.state());
            if session.increment_slayer(master)? {
                metrics.slayer_milestones += 1;
            }
            credit(metrics, before, balance(session.state()));
        }

        if plan.claim_dailies {
            session.refresh_daily();
            for difficulty in DailyDifficulty::ALL {
                let before = balance(session.state());
                match session.complete_daily(difficulty) {
                    Ok(_) => metrics.dailies_claimed += 1,
                    Err(GameError::DailyAlreadyCompleted(_)) => metrics.daily_rejections += 1,
                    Err(err) => return Err(err.into()),
                }
                credit(metrics, before, balance(session.state()));
            }
        }

        check_invariants(session.state(), step, &mut metrics.violations);
        metrics.steps += 1;
        Ok(true)
    }

    fn check_resume(
        &self,
        store: MemoryStore,
        clock: &Rc<Cell<i64>>,
        plan: &SimulationPlan,
        expected: &ProgressionState,
    ) -> Result<bool> {
        clock.set(clock.get() + STAT_REFRESH_INTERVAL_MS + 1);
        let engine = self.engine(store, clock, plan.offline_resume);
        let session = engine
            .start_session(&plan.player, Box::new(SeededRandom::new(0)))
            .context("resuming saved run")?;
        let state = session.state();
        Ok(state.unlocked_tiles == expected.unlocked_tiles
            && state.completed_tiles == expected.completed_tiles
            && state.keys == expected.keys
            && state.gold == expected.gold
            && state.tile_tasks == expected.tile_tasks)
    }
}

fn balance(state: &ProgressionState) -> (u64, u64) {
    (u64::from(state.keys), state.gold)
}

fn credit(metrics: &mut RunMetrics, before: (u64, u64), after: (u64, u64)) {
    metrics.keys_earned += after.0.saturating_sub(before.0);
    metrics.gold_earned += after.1.saturating_sub(before.1);
}

fn check_invariants(state: &ProgressionState, step: usize, violations: &mut Vec<String>) {
    if !state.completed_tiles.is_subset(&state.unlocked_tiles) {
        violations.push(format!("step {step}: completed tiles escaped the unlocked set"));
    }
    if !state.visible_tiles.contains(Position::ORIGIN) {
        violations.push(format!("step {step}: origin is no longer visible"));
    }
    if let Some(position) = generation_frontier(state)
        .into_iter()
        .find(|position| state.task_at(*position).is_none())
    {
        violations.push(format!("step {step}: frontier tile {position} has no task"));
    }
    if state.unlocked_tiles.len() > 1
        && let Some(position) = state.unlocked_tiles.iter().find(|position| {
            !state
                .unlocked_tiles
                .iter()
                .any(|other| position.is_adjacent(other))
        })
    {
        violations.push(format!("step {step}: unlocked tile {position} is detached"));
    }
}

/// Tasks that repeat an earlier tile's task, in position order.
fn count_duplicates(state: &ProgressionState) -> usize {
    let tasks: Vec<_> = state.tile_tasks.values().collect();
    tasks
        .iter()
        .enumerate()
        .filter(|(idx, task)| tasks[..*idx].iter().any(|other| task.duplicates(other)))
        .count()
}
