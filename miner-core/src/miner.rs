use crate::config::{ConfigError, MinerConfig};
use crate::merge::{InMemoryMerge, MergeStrategy, WorktreeMerge};
use history::{
    annotate, parse_report, CommitTable, ConflictInterval, ConflictProber, HistoryWalker,
    IntervalExtractor, MergeOracle, MineError, Result, WalkOptions,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything a run produced
#[derive(Debug)]
pub struct MiningReport {
    pub table: CommitTable,
    pub intervals: Vec<ConflictInterval>,
    /// Saved-report lines that could not be read; always empty for live runs
    pub skipped: Vec<MineError>,
}

/// Walks a repository, probes every commit and extracts conflict intervals
pub struct ConflictMiner {
    repo_path: PathBuf,
    walk: WalkOptions,
    strategy: MergeStrategy,
}

impl ConflictMiner {
    pub fn new<P: AsRef<Path>>(repo_path: P, walk: WalkOptions, strategy: MergeStrategy) -> Self {
        Self {
            repo_path: repo_path.as_ref().to_path_buf(),
            walk,
            strategy,
        }
    }

    pub fn from_config<P: AsRef<Path>>(
        repo_path: P,
        config: &MinerConfig,
    ) -> std::result::Result<Self, ConfigError> {
        Ok(Self::new(
            repo_path,
            config.walk_options()?,
            config.probe.strategy,
        ))
    }

    /// Mine the repository with the configured trial-merge strategy.
    pub fn run(&self) -> Result<MiningReport> {
        match self.strategy {
            MergeStrategy::InMemory => self.run_with(InMemoryMerge::open(&self.repo_path)?),
            MergeStrategy::Worktree => self.run_with(WorktreeMerge::open(&self.repo_path)?),
        }
    }

    /// Mine the repository, answering trial merges with `oracle`.
    pub fn run_with<M: MergeOracle>(&self, oracle: M) -> Result<MiningReport> {
        let walker = HistoryWalker::open(&self.repo_path)?;
        let commits = walker.topological_order(&self.walk)?;
        info!(
            commits = commits.len(),
            strategy = ?self.strategy,
            "probing history"
        );

        let mut prober = ConflictProber::new(oracle);
        let table = annotate(commits, &mut prober)?;
        let intervals = IntervalExtractor::extract(&table);

        Ok(MiningReport {
            table,
            intervals,
            skipped: Vec::new(),
        })
    }

    /// Re-extract intervals from a saved annotated graph, resolving parents
    /// from the repository. No trial merges are run.
    pub fn extract_saved(&self, report_text: &str) -> Result<MiningReport> {
        let walker = HistoryWalker::open(&self.repo_path)?;
        let parsed = parse_report(report_text);
        let table = parsed.build_table(&walker)?;
        let skipped = parsed.skipped;
        let intervals = IntervalExtractor::extract(&table);
        info!(
            commits = table.len(),
            skipped = skipped.len(),
            "extracted intervals from saved report"
        );

        Ok(MiningReport {
            table,
            intervals,
            skipped,
        })
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}
