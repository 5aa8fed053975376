use anyhow::{Context, Result};
use clap::Parser;
use history::{parse_since, TextReport};
use miner_core::{ConflictMiner, MergeStrategy, MinerConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "conflict-miner")]
#[command(version, about = "Find the periods in a repository's history during which parallel lines of development would have conflicted", long_about = None)]
struct Cli {
    /// Path to the repository
    repo: PathBuf,

    /// Only walk commits made after this time (RFC 3339, YYYY-MM-DD or unix seconds)
    since: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extract intervals from a saved annotated graph instead of probing
    #[arg(long, value_name = "FILE")]
    from_report: Option<PathBuf>,

    /// Trial merge strategy: in-memory or worktree
    #[arg(long)]
    strategy: Option<MergeStrategy>,

    /// Walk every local branch, not only HEAD
    #[arg(long)]
    all_refs: bool,

    /// Abbreviate commit ids to this many characters
    #[arg(long)]
    abbrev: Option<usize>,

    /// Do not print the annotated graph
    #[arg(long)]
    no_graph: bool,

    /// Do not print the interval listing
    #[arg(long)]
    no_intervals: bool,

    /// More logging on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging.level, cli.verbose);

    match run(&cli, &config) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str, verbose: u8) {
    let level = match verbose {
        0 => level,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// File values first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<MinerConfig> {
    let mut config = match &cli.config {
        Some(path) => MinerConfig::load_from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => MinerConfig::default(),
    };

    if let Some(since) = &cli.since {
        parse_since(since).with_context(|| format!("cannot parse start time '{since}'"))?;
        config.walk.since = Some(since.clone());
    }
    if let Some(strategy) = cli.strategy {
        config.probe.strategy = strategy;
    }
    if cli.all_refs {
        config.walk.all_refs = true;
    }
    if let Some(abbrev) = cli.abbrev {
        config.report.abbrev = abbrev;
    }
    if cli.no_graph {
        config.report.graph = false;
    }
    if cli.no_intervals {
        config.report.intervals = false;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Produce the whole report before anything is printed, so a failed run
/// leaves stdout empty.
fn run(cli: &Cli, config: &MinerConfig) -> Result<String> {
    let miner = ConflictMiner::from_config(&cli.repo, config)?;

    let report = match &cli.from_report {
        Some(path) => {
            let saved = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read saved report {}", path.display()))?;
            miner.extract_saved(&saved)?
        }
        None => miner
            .run()
            .with_context(|| format!("failed to mine {}", cli.repo.display()))?,
    };

    if !report.skipped.is_empty() {
        warn!(lines = report.skipped.len(), "skipped malformed report lines");
    }
    info!(
        commits = report.table.len(),
        intervals = report.intervals.len(),
        "done"
    );

    Ok(TextReport::new(config.abbrev()).render(
        &report.table,
        &report.intervals,
        config.report.graph,
        config.report.intervals,
    ))
}
