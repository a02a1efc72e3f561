mod logic;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use logic::{
    LogicTester, ScenarioResult, TestScenario, TesterAssets, list_scenarios, resolve_seed_inputs,
    select_scenarios,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "runetile-tester", version)]
#[command(about = "Scripted play-throughs of the RuneTile progression engine")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated integers, 0x-hex, or label:<text>)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Reward policy JSON to use instead of the bundled one
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Player fixture JSON to use instead of the bundled one
    #[arg(long)]
    players: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    if args.report == ReportFormat::Console {
        announce_banner();
    }

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios)?;
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let assets = TesterAssets::load(args.policy.as_deref(), args.players.as_deref())?;
    let logic_tester = LogicTester::new(Arc::new(assets), args.verbose);

    let mut results: Vec<ScenarioResult> = Vec::new();
    for scenario in &scenarios {
        results.extend(logic_tester.run_scenario(scenario, &seed_infos, args.iterations));
    }

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:12} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎮 RuneTile Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn expand_scenarios(scenarios_arg: &str) -> Result<Vec<TestScenario>> {
    let (scenarios, unknown) = select_scenarios(&split_csv(scenarios_arg));
    for name in &unknown {
        log::warn!("Unknown scenario: {name}");
        eprintln!("⚠️  Unknown scenario: {}", name.yellow());
    }
    if scenarios.is_empty() {
        bail!("No runnable scenarios in '{scenarios_arg}'");
    }
    Ok(scenarios)
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => logic::reports::generate_json_report(&mut output_target, results)?,
        ReportFormat::Markdown => {
            logic::reports::generate_markdown_report(&mut output_target, results)?;
        }
        ReportFormat::Console => {
            logic::reports::generate_console_report(
                &mut output_target,
                results,
                start_time.elapsed(),
            )?;
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" smoke, ,economy,  daily ");
        assert_eq!(parts, vec!["smoke", "economy", "daily"]);
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("all").unwrap();
        assert_eq!(expanded.len(), list_scenarios().len());
        assert_eq!(expanded[0].name, "smoke");
    }

    #[test]
    fn unknown_only_scenarios_are_an_error() {
        assert!(expand_scenarios("mystery").is_err());
        let expanded = expand_scenarios("mystery,economy").unwrap();
        assert_eq!(expanded.len(), 1);
    }

    #[test]
    fn parses_report_and_override_flags() {
        let args = Args::try_parse_from([
            "runetile-tester",
            "--report",
            "markdown",
            "--seeds",
            "1,0x2",
            "--policy",
            "policy.json",
        ])
        .unwrap();
        assert_eq!(args.report, ReportFormat::Markdown);
        assert_eq!(args.policy, Some(PathBuf::from("policy.json")));
        assert_eq!(args.iterations, 3);
    }

    #[test]
    fn reports_write_to_file_target() {
        let path = std::env::temp_dir().join(format!(
            "runetile-report-{}.json",
            std::process::id()
        ));
        let mut target = OutputTarget::new(Some(path.clone())).unwrap();
        logic::reports::generate_json_report(&mut target, &[]).unwrap();
        target.flush_inner().unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim(), "[]");
        let _ = std::fs::remove_file(path);
    }
}
