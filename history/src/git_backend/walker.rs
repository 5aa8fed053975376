use crate::core::{CommitId, CommitNode};
use crate::error::{MineError, Result};
use crate::oracle::ParentOracle;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use git2::{Commit, Repository, Sort};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Which part of the history to walk
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Skip commits committed before this instant
    pub since: Option<DateTime<Utc>>,
    /// Walk every local branch, not only HEAD
    pub all_refs: bool,
}

/// Parse a history start time: RFC 3339, `YYYY-MM-DD` (midnight UTC), or
/// unix seconds with an optional leading `@`.
pub fn parse_since(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    value
        .strip_prefix('@')
        .unwrap_or(value)
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

/// Read-only view of a repository's commit graph
pub struct HistoryWalker {
    path: PathBuf,
    repo: Repository,
}

impl HistoryWalker {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let repo = Repository::open(&path)
            .map_err(|e| MineError::repository(path.display().to_string(), e))?;

        Ok(Self { path, repo })
    }

    fn access_error(&self, err: impl ToString) -> MineError {
        MineError::repository(self.path.display().to_string(), err)
    }

    /// Every commit reachable from HEAD (and the local branches when
    /// requested), ancestors before descendants.
    pub fn topological_order(&self, options: &WalkOptions) -> Result<Vec<CommitNode>> {
        let mut revwalk = self.repo.revwalk().map_err(|e| self.access_error(e))?;

        revwalk.push_head().map_err(|e| self.access_error(e))?;
        if options.all_refs {
            for branch in self.repo.branches(None).map_err(|e| self.access_error(e))? {
                let (branch, _) = branch.map_err(|e| self.access_error(e))?;
                if let Some(target) = branch.get().target() {
                    revwalk.push(target).map_err(|e| self.access_error(e))?;
                }
            }
        }

        // Oldest first: topological, ties broken by commit time
        revwalk
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)
            .map_err(|e| self.access_error(e))?;

        let mut commits = Vec::new();
        let mut skipped = 0usize;
        for oid in revwalk {
            let oid = oid.map_err(|e| self.access_error(e))?;
            let commit = self.repo.find_commit(oid).map_err(|e| self.access_error(e))?;
            let node = self.commit_to_node(&commit)?;

            if options.since.is_some_and(|since| node.timestamp < since) {
                skipped += 1;
                continue;
            }
            commits.push(node);
        }

        debug!(skipped, "commits before start time");
        info!(commits = commits.len(), path = %self.path.display(), "walked history");
        Ok(commits)
    }

    /// Convert a git2::Commit to CommitNode
    fn commit_to_node(&self, commit: &Commit) -> Result<CommitNode> {
        let id = commit.id().to_string();
        let parents: Vec<String> = commit.parent_ids().map(|oid| oid.to_string()).collect();

        let timestamp = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .ok_or_else(|| self.access_error(format!("invalid timestamp on commit {id}")))?;

        Ok(CommitNode::new(id, parents, timestamp))
    }

    /// Find a commit by full or abbreviated id
    fn lookup(&self, commit: &str) -> Result<Commit<'_>> {
        self.repo
            .revparse_single(commit)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| self.access_error(format!("unknown commit {commit}: {e}")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ParentOracle for HistoryWalker {
    fn parents(&self, commit: &str) -> Result<Vec<CommitId>> {
        let commit = self.lookup(commit)?;
        Ok(commit.parent_ids().map(|oid| oid.to_string()).collect())
    }

    fn resolve(&self, commit: &str) -> Result<CommitId> {
        Ok(self.lookup(commit)?.id().to_string())
    }
}
