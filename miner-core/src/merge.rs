use git2::{
    build::CheckoutBuilder, MergeOptions, Oid, Repository as Git2Repository, ResetType,
    StatusOptions,
};
use history::{MergeOracle, MineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, error};

/// How trial merges are performed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Merge the two trees in memory; the working tree is never touched
    #[default]
    InMemory,
    /// Check out, merge, then clean and restore the working tree
    Worktree,
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "in-memory" => Ok(MergeStrategy::InMemory),
            "worktree" => Ok(MergeStrategy::Worktree),
            other => Err(format!(
                "unknown merge strategy '{other}' (expected 'in-memory' or 'worktree')"
            )),
        }
    }
}

fn open_repo(path: &Path) -> Result<Git2Repository> {
    Git2Repository::open(path).map_err(|e| MineError::repository(path.display().to_string(), e))
}

fn find_commit<'r>(
    repo: &'r Git2Repository,
    id: &str,
) -> std::result::Result<git2::Commit<'r>, git2::Error> {
    repo.revparse_single(id)?.peel_to_commit()
}

/// Index-only trial merges
pub struct InMemoryMerge {
    repo: Git2Repository,
}

impl InMemoryMerge {
    pub fn open<P: AsRef<Path>>(repo_path: P) -> Result<Self> {
        let repo = open_repo(repo_path.as_ref())?;
        Ok(InMemoryMerge { repo })
    }
}

impl MergeOracle for InMemoryMerge {
    fn conflicts(&mut self, ours: &str, theirs: &str) -> Result<bool> {
        let probe_err = |e: git2::Error| MineError::probe(ours, theirs, e);

        let ours_commit = find_commit(&self.repo, ours).map_err(probe_err)?;
        let theirs_commit = find_commit(&self.repo, theirs).map_err(probe_err)?;

        let mut merge_options = MergeOptions::new();
        merge_options.fail_on_conflict(false);

        let index = self
            .repo
            .merge_commits(&ours_commit, &theirs_commit, Some(&merge_options))
            .map_err(probe_err)?;

        Ok(index.has_conflicts())
    }
}

/// Trial merges performed in the repository's own working tree.
///
/// Each call checks out `ours` detached, merges `theirs`, reads the index
/// conflict state, then aborts the merge, hard resets, removes untracked and
/// ignored files (as `git clean -xdf` would) and restores the original HEAD.
pub struct WorktreeMerge {
    path: PathBuf,
    repo: Git2Repository,
}

impl WorktreeMerge {
    /// Open a repository for trial merging. The working tree must be clean.
    pub fn open<P: AsRef<Path>>(repo_path: P) -> Result<Self> {
        let path = repo_path.as_ref().to_path_buf();
        let repo = open_repo(&path)?;
        let location = path.display().to_string();

        if repo.is_bare() {
            return Err(MineError::repository(location, "bare repository has no working tree"));
        }
        if !is_clean(&repo).map_err(|e| MineError::repository(location.clone(), e))? {
            return Err(MineError::repository(location, "working tree has uncommitted changes"));
        }

        Ok(WorktreeMerge { path, repo })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn trial(&self, ours: &str, theirs: &str) -> std::result::Result<bool, git2::Error> {
        let ours_commit = find_commit(&self.repo, ours)?;
        self.repo
            .checkout_tree(ours_commit.as_object(), Some(CheckoutBuilder::new().force()))?;
        self.repo.set_head_detached(ours_commit.id())?;

        let theirs_oid = find_commit(&self.repo, theirs)?.id();
        let annotated = self.repo.find_annotated_commit(theirs_oid)?;

        let mut merge_options = MergeOptions::new();
        merge_options.fail_on_conflict(false);
        let mut checkout = CheckoutBuilder::new();
        checkout.allow_conflicts(true);

        self.repo
            .merge(&[&annotated], Some(&mut merge_options), Some(&mut checkout))?;

        let conflicted = self.repo.index()?.has_conflicts();
        debug!(ours, theirs, conflicted, "worktree trial merge");
        Ok(conflicted)
    }
}

impl MergeOracle for WorktreeMerge {
    fn conflicts(&mut self, ours: &str, theirs: &str) -> Result<bool> {
        let probe_err = |e: git2::Error| MineError::probe(ours, theirs, e);

        let guard = CheckoutGuard::acquire(&self.repo).map_err(probe_err)?;
        let conflicted = self.trial(ours, theirs);
        let restored = guard.release();

        let conflicted = conflicted.map_err(probe_err)?;
        restored.map_err(|e| {
            MineError::probe(ours, theirs, format!("restoring working tree: {e}"))
        })?;
        Ok(conflicted)
    }
}

fn is_clean(repo: &Git2Repository) -> std::result::Result<bool, git2::Error> {
    let mut options = StatusOptions::new();
    options.include_untracked(true).include_ignored(false);
    Ok(repo.statuses(Some(&mut options))?.is_empty())
}

enum OriginalHead {
    Branch(String),
    Detached(Oid),
}

/// Puts the working tree, index and HEAD back the way they were, on every
/// exit path.
struct CheckoutGuard<'r> {
    repo: &'r Git2Repository,
    original: OriginalHead,
    restored: bool,
}

impl<'r> CheckoutGuard<'r> {
    fn acquire(repo: &'r Git2Repository) -> std::result::Result<Self, git2::Error> {
        let head = repo.head()?;
        let original = match (head.is_branch(), head.name(), head.target()) {
            (true, Some(name), _) => OriginalHead::Branch(name.to_string()),
            (_, _, Some(oid)) => OriginalHead::Detached(oid),
            _ => return Err(git2::Error::from_str("HEAD does not point at a commit")),
        };

        Ok(CheckoutGuard {
            repo,
            original,
            restored: false,
        })
    }

    fn restore(&mut self) -> std::result::Result<(), git2::Error> {
        self.restored = true;

        // Drop MERGE_HEAD and friends, then reset whatever HEAD is now
        self.repo.cleanup_state()?;
        let current = self.repo.head()?.peel_to_commit()?;
        let mut checkout = CheckoutBuilder::new();
        checkout.force().remove_untracked(true).remove_ignored(true);
        self.repo
            .reset(current.as_object(), ResetType::Hard, Some(&mut checkout))?;

        match &self.original {
            OriginalHead::Branch(name) => self.repo.set_head(name)?,
            OriginalHead::Detached(oid) => self.repo.set_head_detached(*oid)?,
        }
        self.repo.checkout_head(Some(
            CheckoutBuilder::new().force().remove_untracked(true),
        ))?;
        Ok(())
    }

    fn release(mut self) -> std::result::Result<(), git2::Error> {
        self.restore()
    }
}

impl Drop for CheckoutGuard<'_> {
    fn drop(&mut self) {
        if !self.restored {
            if let Err(e) = self.restore() {
                error!("failed to restore working tree after trial merge: {e}");
            }
        }
    }
}
