use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::fixtures::TesterAssets;
use super::scenarios::TestScenario;
use super::seeds::SeedInfo;
use super::simulation::{GameTester, SimulationPlan, SimulationSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    tester: GameTester,
    verbose: bool,
}

impl LogicTester {
    #[must_use]
    pub fn new(assets: Arc<TesterAssets>, verbose: bool) -> Self {
        Self {
            tester: GameTester::new(assets, verbose),
            verbose,
        }
    }

    #[must_use]
    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[SeedInfo],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (player: {} strategy: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.player,
                    scenario.plan.strategy.label(),
                    seed.display()
                );
            }

            results.push(self.run_single_scenario(scenario, seed.seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let (successes, failures, performance_data) =
            self.run_simulation_iterations(&scenario.plan, seed, iterations);

        let avg_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration: avg_duration,
            performance_data,
        }
    }

    fn run_simulation_iterations(
        &self,
        plan: &SimulationPlan,
        seed: u64,
        iterations: usize,
    ) -> (usize, Vec<String>, Vec<Duration>) {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let outcome = self
                .tester
                .run_plan(plan, iteration_seed)
                .map_err(|err| format!("{err:#}"))
                .and_then(|summary| {
                    evaluate_expectations(plan, &summary).map_or(Ok(summary), Err)
                });

            match outcome {
                Ok(summary) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);

                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) steps:{} keys:{} gold:{}",
                            i + 1,
                            iterations,
                            summary.metrics.steps,
                            summary.final_state.keys,
                            summary.final_state.gold
                        );
                    }
                }
                Err(err) => {
                    failures.push(format!(
                        "Iteration {} (player {}, strategy {}, seed {iteration_seed}): {err}",
                        i + 1,
                        plan.player,
                        plan.strategy.label(),
                    ));
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            err.red()
                        );
                    }
                }
            }
        }

        (successes, failures, performance_data)
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    for expectation in &plan.expectations {
        if let Err(err) = expectation.evaluate(summary) {
            return Some(format!("{err} | {}", describe_run(summary)));
        }
    }
    None
}

fn describe_run(summary: &SimulationSummary) -> String {
    let metrics = &summary.metrics;
    let status = if metrics.stalled { "stalled" } else { "running" };
    format!(
        "{} seed {} ({}): steps {} ({status}), unlocked {}, completed {}, keys {}, gold {}",
        summary.player,
        summary.seed,
        summary.strategy.label(),
        metrics.steps,
        summary.final_state.unlocked_tiles.len(),
        summary.final_state.completed_tiles.len(),
        summary.final_state.keys,
        summary.final_state.gold
    )
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::scenarios::get_scenario;
    use crate::logic::simulation::UnlockStrategy;

    fn tester() -> LogicTester {
        LogicTester::new(Arc::new(TesterAssets::load_default().unwrap()), false)
    }

    #[test]
    fn results_round_trip_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "smoke".to_string(),
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.performance_data, vec![Duration::from_millis(12)]);
    }

    #[test]
    fn one_result_per_seed() {
        let scenario = get_scenario("outage").unwrap();
        let seeds = [SeedInfo::from_numeric(1), SeedInfo::from_numeric(2)];
        let results = tester().run_scenario(&scenario, &seeds, 2);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|result| result.passed), "{results:?}");
        assert!(results.iter().all(|result| result.successful_iterations == 2));
    }

    #[test]
    fn failing_expectation_is_reported() {
        let plan = SimulationPlan::new("Iron Novice", UnlockStrategy::Frontier)
            .with_max_steps(1)
            .with_expectation(|_: &SimulationSummary| -> anyhow::Result<()> {
                anyhow::bail!("always fails")
            });
        let scenario = TestScenario::simulation("failing", plan);
        let results = tester().run_scenario(&scenario, &[SeedInfo::from_numeric(5)], 1);
        assert!(!results[0].passed);
        assert!(results[0].failures[0].contains("always fails"));
    }
}
