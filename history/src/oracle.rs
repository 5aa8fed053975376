//! The two questions the miner asks the version-control system.

use crate::core::CommitId;
use crate::error::{MineError, Result};
use std::collections::HashMap;

/// Answers "what are the parents of this commit?"
pub trait ParentOracle {
    /// Parents in recorded order. Unknown ids are a `RepositoryAccess` error.
    fn parents(&self, commit: &str) -> Result<Vec<CommitId>>;

    /// Expand a possibly abbreviated id to the form `parents` reports.
    fn resolve(&self, commit: &str) -> Result<CommitId> {
        Ok(commit.to_string())
    }
}

/// Answers "would merging these two commits conflict?"
///
/// Implementations must leave the repository exactly as they found it,
/// whatever the outcome. `&mut self` keeps a single trial merge in flight
/// per oracle.
pub trait MergeOracle {
    fn conflicts(&mut self, ours: &str, theirs: &str) -> Result<bool>;
}

impl<T: MergeOracle + ?Sized> MergeOracle for &mut T {
    fn conflicts(&mut self, ours: &str, theirs: &str) -> Result<bool> {
        (**self).conflicts(ours, theirs)
    }
}

impl<T: ParentOracle + ?Sized> ParentOracle for &T {
    fn parents(&self, commit: &str) -> Result<Vec<CommitId>> {
        (**self).parents(commit)
    }

    fn resolve(&self, commit: &str) -> Result<CommitId> {
        (**self).resolve(commit)
    }
}

/// Parent lookups served from memory, for histories already loaded
impl ParentOracle for HashMap<CommitId, Vec<CommitId>> {
    fn parents(&self, commit: &str) -> Result<Vec<CommitId>> {
        self.get(commit)
            .cloned()
            .ok_or_else(|| MineError::repository("<memory>", format!("unknown commit {commit}")))
    }
}
