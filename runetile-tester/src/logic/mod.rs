pub mod fixtures;
pub mod reports;
pub mod scenarios;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use fixtures::TesterAssets;
pub use scenarios::{TestScenario, list_scenarios, select_scenarios};
pub use seeds::resolve_seed_inputs;
pub use tester::*;
