//! Conflict mining over a commit history: branch-tip tracking, trial-merge
//! probing and conflict-interval extraction.

pub mod core;
pub mod error;
pub mod git_backend;
pub mod intervals;
pub mod oracle;
pub mod probe;
pub mod report;
pub mod tracker;

pub use crate::core::{AnnotatedCommit, CommitId, CommitNode, CommitTable, CommitTableBuilder};
pub use error::{MineError, Result};
pub use git_backend::{parse_since, HistoryWalker, WalkOptions};
pub use intervals::{CommitDelta, ConflictInterval, IntervalExtractor};
pub use oracle::{MergeOracle, ParentOracle};
pub use probe::{annotate, ConflictProber};
pub use report::{parse_report, ParsedReport, TextReport};
pub use tracker::{Advance, BranchTip, BranchTracker};
