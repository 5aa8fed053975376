use super::node::CommitId;
use std::collections::HashMap;

/// One walked commit together with everything recorded about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedCommit {
    pub id: CommitId,
    pub parents: Vec<CommitId>,
    /// Live tips this commit conflicted with when it was probed
    pub neighbors: Vec<CommitId>,
    /// Lane markers for the annotated graph, without the commit id
    pub lanes: String,
}

impl AnnotatedCommit {
    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Append-only accumulator for the per-commit table.
///
/// The only way to obtain a [`CommitTable`] is [`CommitTableBuilder::build`],
/// so interval extraction never sees a half-filled table.
#[derive(Debug, Default)]
pub struct CommitTableBuilder {
    rows: Vec<AnnotatedCommit>,
    index: HashMap<CommitId, usize>,
}

impl CommitTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a commit. Rows must arrive in topological order; a commit seen
    /// twice keeps its first record.
    pub fn push(&mut self, row: AnnotatedCommit) -> bool {
        if self.index.contains_key(&row.id) {
            return false;
        }
        self.index.insert(row.id.clone(), self.rows.len());
        self.rows.push(row);
        true
    }

    pub fn contains(&self, commit_id: &str) -> bool {
        self.index.contains_key(commit_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn build(self) -> CommitTable {
        CommitTable {
            rows: self.rows,
            index: self.index,
        }
    }
}

/// Fully materialized, immutable per-commit table in topological order
#[derive(Debug, Clone, Default)]
pub struct CommitTable {
    rows: Vec<AnnotatedCommit>,
    index: HashMap<CommitId, usize>,
}

impl CommitTable {
    /// Rows oldest-first
    pub fn rows(&self) -> &[AnnotatedCommit] {
        &self.rows
    }

    pub fn get(&self, commit_id: &str) -> Option<&AnnotatedCommit> {
        self.index.get(commit_id).map(|&i| &self.rows[i])
    }

    pub fn contains(&self, commit_id: &str) -> bool {
        self.index.contains_key(commit_id)
    }

    /// Parents of a commit; empty when the commit is outside the table
    pub fn parents(&self, commit_id: &str) -> &[CommitId] {
        self.get(commit_id)
            .map(|row| row.parents.as_slice())
            .unwrap_or_default()
    }

    /// Conflict neighbors of a commit; empty when the commit is outside the table
    pub fn neighbors(&self, commit_id: &str) -> &[CommitId] {
        self.get(commit_id)
            .map(|row| row.neighbors.as_slice())
            .unwrap_or_default()
    }

    /// Position of a commit in the walk
    pub fn position(&self, commit_id: &str) -> Option<usize> {
        self.index.get(commit_id).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
