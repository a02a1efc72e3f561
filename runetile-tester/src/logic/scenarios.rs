use anyhow::{Result, ensure};

use super::simulation::{STEP_MS, SimulationPlan, SimulationSummary, UnlockStrategy};

const DAY_MS: i64 = 24 * 60 * 60 * 1_000;

/// A named simulation plan.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

const CATALOG: &[(&str, &str)] = &[
    ("smoke", "Short run for a low-level account, then resume it"),
    ("economy", "Buy keys whenever stuck and reconcile every balance"),
    ("daily", "Claim every daily challenge across several days"),
    ("slayer", "Record a slayer task each step and count milestones"),
    ("duplicates", "Check how often generated tasks repeat"),
    ("maxed", "Maxed account never receives skill tasks"),
    ("outage", "Resume a saved run while every provider is down"),
    ("full", "Long run with every side activity enabled"),
];

/// Scenario keys and one-line descriptions, in catalog order.
#[must_use]
pub fn list_scenarios() -> &'static [(&'static str, &'static str)] {
    CATALOG
}

fn invariants_hold(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.metrics.violations.is_empty(),
        "Invariant violations: {}",
        summary.metrics.violations.join("; ")
    );
    ensure!(
        summary.metrics.steps > 0,
        "{} made no progress",
        summary.player
    );
    Ok(())
}

fn ledger_balances(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.ledger_balances(),
        "Balances drifted: {} keys and {} gold after {} unlocks",
        summary.final_state.keys,
        summary.final_state.gold,
        summary.final_state.unlocked_tiles.len()
    );
    Ok(())
}

fn resumed_identically(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.resumed_identically == Some(true),
        "Saved run did not resume unchanged"
    );
    Ok(())
}

fn daily_claims_bounded(summary: &SimulationSummary) -> Result<()> {
    let metrics = &summary.metrics;
    let elapsed = i64::try_from(metrics.steps).unwrap_or(i64::MAX).saturating_mul(STEP_MS);
    let days_spanned = usize::try_from(elapsed / DAY_MS + 2).unwrap_or(usize::MAX);
    ensure!(
        metrics.dailies_claimed >= 4,
        "Only {} dailies claimed",
        metrics.dailies_claimed
    );
    ensure!(
        metrics.dailies_claimed <= 4 * days_spanned,
        "{} dailies claimed within {days_spanned} days",
        metrics.dailies_claimed
    );
    if metrics.steps > 1 {
        ensure!(
            metrics.daily_rejections > 0,
            "Repeat claims on the same day were accepted"
        );
    }
    Ok(())
}

fn slayer_milestones_match(summary: &SimulationSummary) -> Result<()> {
    let metrics = &summary.metrics;
    ensure!(
        metrics.slayer_milestones == metrics.steps / 5,
        "{} milestones after {} Konar tasks",
        metrics.slayer_milestones,
        metrics.steps
    );
    let konar = summary.roster.get("Konar");
    let pending = konar.and_then(|master| usize::try_from(master.tasks_completed).ok());
    ensure!(
        pending == Some(metrics.steps % 5),
        "Konar counter {pending:?} after {} tasks",
        metrics.steps
    );
    let expected_pct = runetile_game::numbers::percentage(metrics.steps % 5, 5);
    ensure!(
        konar.is_some_and(|master| (master.progress_pct() - expected_pct).abs() < 1e-9),
        "Konar progress {:?}% after {} tasks",
        konar.map(runetile_game::SlayerMaster::progress_pct),
        metrics.steps
    );
    Ok(())
}

fn duplicates_rare(summary: &SimulationSummary) -> Result<()> {
    let share = summary.duplicate_share();
    ensure!(
        share <= 0.25,
        "{:.1}% of generated tasks repeat an earlier tile",
        share * 100.0
    );
    Ok(())
}

fn no_skill_tasks(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary
            .final_state
            .tile_tasks
            .values()
            .all(|task| task.skill().is_none()),
        "Maxed account received a skill task"
    );
    Ok(())
}

fn varied_categories(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.metrics.category_counts.len() >= 3,
        "Completed only {:?}",
        summary.metrics.category_counts
    );
    Ok(())
}

fn smoke_plan() -> SimulationPlan {
    SimulationPlan::new("Iron Novice", UnlockStrategy::Frontier)
        .with_max_steps(5)
        .with_resume(false)
        .with_expectation(invariants_hold)
        .with_expectation(resumed_identically)
}

fn economy_plan() -> SimulationPlan {
    SimulationPlan::new("Mid Main", UnlockStrategy::Richest)
        .with_max_steps(40)
        .buying_keys()
        .with_expectation(invariants_hold)
        .with_expectation(ledger_balances)
}

fn daily_plan() -> SimulationPlan {
    SimulationPlan::new("Quest Cape", UnlockStrategy::Frontier)
        .with_max_steps(24)
        .buying_keys()
        .claiming_dailies()
        .with_expectation(invariants_hold)
        .with_expectation(daily_claims_bounded)
        .with_expectation(ledger_balances)
}

fn slayer_plan() -> SimulationPlan {
    SimulationPlan::new("Lynx Titan", UnlockStrategy::Nearest)
        .with_max_steps(20)
        .buying_keys()
        .with_slayer("Konar")
        .with_expectation(invariants_hold)
        .with_expectation(slayer_milestones_match)
        .with_expectation(ledger_balances)
}

fn duplicates_plan() -> SimulationPlan {
    SimulationPlan::new("Mid Main", UnlockStrategy::Frontier)
        .with_max_steps(20)
        .buying_keys()
        .with_expectation(invariants_hold)
        .with_expectation(duplicates_rare)
}

fn maxed_plan() -> SimulationPlan {
    SimulationPlan::new("Lynx Titan", UnlockStrategy::Richest)
        .with_max_steps(15)
        .buying_keys()
        .with_expectation(invariants_hold)
        .with_expectation(no_skill_tasks)
}

fn outage_plan() -> SimulationPlan {
    SimulationPlan::new("Iron Novice", UnlockStrategy::Nearest)
        .with_max_steps(4)
        .with_resume(true)
        .with_expectation(invariants_hold)
        .with_expectation(resumed_identically)
}

fn full_plan() -> SimulationPlan {
    SimulationPlan::new("Quest Cape", UnlockStrategy::Richest)
        .with_max_steps(60)
        .buying_keys()
        .with_slayer("Vannaka")
        .claiming_dailies()
        .refreshing_stats()
        .with_resume(false)
        .with_expectation(invariants_hold)
        .with_expectation(ledger_balances)
        .with_expectation(resumed_identically)
        .with_expectation(varied_categories)
}

/// Look up a catalog scenario by key, case-insensitively.
#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = name.trim().to_lowercase();
    let plan = match key.as_str() {
        "smoke" => smoke_plan(),
        "economy" => economy_plan(),
        "daily" => daily_plan(),
        "slayer" => slayer_plan(),
        "duplicates" => duplicates_plan(),
        "maxed" => maxed_plan(),
        "outage" => outage_plan(),
        "full" => full_plan(),
        _ => return None,
    };
    Some(TestScenario::simulation(key, plan))
}

/// Expand CLI scenario names; `all` selects the whole catalog.
#[must_use]
pub fn select_scenarios(names: &[String]) -> (Vec<TestScenario>, Vec<String>) {
    let mut selected = Vec::new();
    let mut unknown = Vec::new();
    for name in names {
        if name.eq_ignore_ascii_case("all") {
            selected.extend(CATALOG.iter().filter_map(|(key, _)| get_scenario(key)));
        } else if let Some(scenario) = get_scenario(name) {
            selected.push(scenario);
        } else {
            unknown.push(name.clone());
        }
    }
    selected.dedup_by(|a, b| a.name == b.name);
    (selected, unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fixtures::TesterAssets;
    use crate::logic::simulation::GameTester;
    use std::sync::Arc;

    #[test]
    fn every_catalog_entry_resolves() {
        for (key, _) in list_scenarios() {
            let scenario = get_scenario(key).unwrap();
            assert_eq!(scenario.name, *key);
            assert!(!scenario.plan.expectations.is_empty());
        }
        assert!(get_scenario("SMOKE ").is_some());
        assert!(get_scenario("nope").is_none());
    }

    #[test]
    fn all_expands_and_unknown_names_are_reported() {
        let (selected, unknown) =
            select_scenarios(&["all".to_string(), "mystery".to_string()]);
        assert_eq!(selected.len(), list_scenarios().len());
        assert_eq!(unknown, vec!["mystery".to_string()]);
    }

    #[test]
    fn smoke_scenario_meets_its_expectations() {
        let tester = GameTester::new(Arc::new(TesterAssets::load_default().unwrap()), false);
        let scenario = get_scenario("smoke").unwrap();
        let summary = tester.run_plan(&scenario.plan, 1337).unwrap();
        for expectation in &scenario.plan.expectations {
            expectation.evaluate(&summary).unwrap();
        }
    }
}
