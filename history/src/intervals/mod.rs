//! Derives conflict intervals from the per-commit conflict-neighbor table.
//!
//! Every commit is compared with the union of its parents' neighbor lists.
//! Neighbors that are new open an interval at the commit; neighbors that
//! vanished close the open interval tracked under that id, unless a merge
//! still carries the same line under an earlier name (see
//! [`IntervalExtractor::continuation`]).

use crate::core::{AnnotatedCommit, CommitId, CommitTable};
use tracing::{debug, info};

/// One span of history during which `start`'s line conflicted with
/// `conflicting_commit`'s line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictInterval {
    pub start: CommitId,
    /// `None` while unresolved; stays `None` if the history ends first
    pub end: Option<CommitId>,
    /// The commit the conflict was first observed against
    pub conflicting_commit: CommitId,
    /// Id the conflict is currently known under on the other line
    tracked: CommitId,
}

impl ConflictInterval {
    pub fn new(start: CommitId, conflicting_commit: CommitId) -> Self {
        Self {
            tracked: conflicting_commit.clone(),
            start,
            end: None,
            conflicting_commit,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// The id a later resolution has to mention to close this interval
    pub fn tracked_commit(&self) -> &str {
        &self.tracked
    }
}

/// How a commit's neighbor list differs from its parents' combined lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitDelta {
    /// In the commit's list, in none of its parents' lists
    pub appeared: Vec<CommitId>,
    /// In some parent's list, no longer in the commit's list
    pub resolved: Vec<CommitId>,
}

impl CommitDelta {
    pub fn between(parent_neighbors: &[CommitId], neighbors: &[CommitId]) -> Self {
        Self {
            appeared: difference(neighbors, parent_neighbors),
            resolved: difference(parent_neighbors, neighbors),
        }
    }
}

/// Order-preserving set union; the result has no duplicates.
pub fn union(left: &[CommitId], right: &[CommitId]) -> Vec<CommitId> {
    let mut out: Vec<CommitId> = Vec::with_capacity(left.len() + right.len());
    for id in left.iter().chain(right) {
        if !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}

/// Elements of `left` missing from `right`, in `left`'s order, without duplicates.
pub fn difference(left: &[CommitId], right: &[CommitId]) -> Vec<CommitId> {
    let mut out: Vec<CommitId> = Vec::new();
    for id in left {
        if !right.contains(id) && !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}

pub struct IntervalExtractor<'t> {
    table: &'t CommitTable,
    intervals: Vec<ConflictInterval>,
}

impl<'t> IntervalExtractor<'t> {
    /// Run the extraction front-to-back over a complete table. Intervals
    /// come back in discovery order.
    pub fn extract(table: &'t CommitTable) -> Vec<ConflictInterval> {
        let mut extractor = Self {
            table,
            intervals: Vec::new(),
        };
        for row in table.rows() {
            extractor.step(row);
        }

        let unresolved = extractor.intervals.iter().filter(|i| i.is_open()).count();
        info!(
            intervals = extractor.intervals.len(),
            unresolved, "extracted conflict intervals"
        );
        extractor.intervals
    }

    /// The naive neighbor diff of one commit against its parents, before
    /// continuations are taken into account.
    pub fn delta(table: &CommitTable, commit_id: &str) -> Option<CommitDelta> {
        let row = table.get(commit_id)?;
        Some(CommitDelta::between(
            &Self::parent_neighbors(table, row),
            &row.neighbors,
        ))
    }

    fn parent_neighbors(table: &CommitTable, row: &AnnotatedCommit) -> Vec<CommitId> {
        row.parents
            .iter()
            .fold(Vec::new(), |acc, parent| union(&acc, table.neighbors(parent)))
    }

    fn step(&mut self, row: &AnnotatedCommit) {
        let delta = CommitDelta::between(&Self::parent_neighbors(self.table, row), &row.neighbors);

        for gone in &delta.resolved {
            match self.continuation(row, gone) {
                Some(successor) => {
                    debug!(
                        commit = row.id.as_str(),
                        from = gone.as_str(),
                        to = successor.as_str(),
                        "conflict continued"
                    );
                    self.retrack(gone, &successor);
                }
                None => self.close(gone, &row.id),
            }
        }

        for new in &delta.appeared {
            debug!(commit = row.id.as_str(), with = new.as_str(), "conflict started");
            self.intervals
                .push(ConflictInterval::new(row.id.clone(), new.clone()));
        }
    }

    /// Decide whether the vanished neighbor `gone` is the same conflict
    /// still present under an earlier name. Returns that name.
    ///
    /// Only a merge commit qualifies. The earlier name is a parent of `gone`
    /// that is still a neighbor of `row` and still tracked by an open interval.
    fn continuation(&self, row: &AnnotatedCommit, gone: &str) -> Option<CommitId> {
        if !row.is_merge() || !self.has_open(gone) {
            return None;
        }

        self.table
            .parents(gone)
            .iter()
            .find(|parent| {
                parent.as_str() != gone && row.neighbors.contains(parent) && self.has_open(parent)
            })
            .cloned()
    }

    fn has_open(&self, tracked: &str) -> bool {
        self.intervals
            .iter()
            .any(|i| i.is_open() && i.tracked == tracked)
    }

    fn retrack(&mut self, from: &str, to: &str) {
        for interval in self
            .intervals
            .iter_mut()
            .filter(|i| i.is_open() && i.tracked == from)
        {
            interval.tracked = to.to_string();
        }
    }

    fn close(&mut self, tracked: &str, end: &str) {
        for interval in self
            .intervals
            .iter_mut()
            .filter(|i| i.is_open() && i.tracked == tracked)
        {
            debug!(
                start = interval.start.as_str(),
                end,
                with = interval.conflicting_commit.as_str(),
                "conflict resolved"
            );
            interval.end = Some(end.to_string());
        }
    }
}
