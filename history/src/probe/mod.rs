//! Tests each walked commit against the other live tips.

use crate::core::{AnnotatedCommit, CommitId, CommitNode, CommitTable, CommitTableBuilder};
use crate::error::Result;
use crate::oracle::MergeOracle;
use crate::tracker::BranchTracker;
use tracing::{debug, info};

/// Runs trial merges through a [`MergeOracle`]
pub struct ConflictProber<M> {
    oracle: M,
    trial_merges: usize,
}

impl<M: MergeOracle> ConflictProber<M> {
    pub fn new(oracle: M) -> Self {
        Self {
            oracle,
            trial_merges: 0,
        }
    }

    /// Every candidate the oracle reports as conflicting with `commit`, in
    /// candidate order. The first oracle failure aborts the probe.
    pub fn probe(&mut self, commit: &str, candidates: &[CommitId]) -> Result<Vec<CommitId>> {
        let mut conflicting = Vec::new();
        for candidate in candidates {
            self.trial_merges += 1;
            let conflict = self.oracle.conflicts(commit, candidate)?;
            debug!(commit, candidate = candidate.as_str(), conflict, "trial merge");
            if conflict {
                conflicting.push(candidate.clone());
            }
        }
        Ok(conflicting)
    }

    /// Number of oracle calls made so far
    pub fn trial_merges(&self) -> usize {
        self.trial_merges
    }

    pub fn into_oracle(self) -> M {
        self.oracle
    }
}

/// Walk `commits` (oldest-first) through the tracker and the prober and
/// return the completed per-commit table.
///
/// Each commit is first advanced onto the tracker, then probed against
/// every other live tip. Any oracle error aborts the whole walk.
pub fn annotate<I, M>(commits: I, prober: &mut ConflictProber<M>) -> Result<CommitTable>
where
    I: IntoIterator<Item = CommitNode>,
    M: MergeOracle,
{
    let mut tracker = BranchTracker::new();
    let mut table = CommitTableBuilder::new();

    for node in commits {
        if table.contains(&node.id) {
            continue;
        }
        tracker.advance(&node.id, &node.parents);
        let candidates = tracker.live_tips_except(&node.id);
        let neighbors = prober.probe(&node.id, &candidates)?;
        let lanes = tracker.lanes_for(&node.id);

        table.push(AnnotatedCommit {
            id: node.id,
            parents: node.parents,
            neighbors,
            lanes,
        });
    }

    info!(
        commits = table.len(),
        trial_merges = prober.trial_merges(),
        "annotated history"
    );
    Ok(table.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MineError;
    use chrono::Utc;
    use std::collections::HashSet;

    /// Conflicts exactly for the listed unordered pairs
    struct ScriptedOracle {
        pairs: HashSet<(String, String)>,
        calls: Vec<(String, String)>,
    }

    impl ScriptedOracle {
        fn new(pairs: &[(&str, &str)]) -> Self {
            let mut set = HashSet::new();
            for (a, b) in pairs {
                set.insert((a.to_string(), b.to_string()));
                set.insert((b.to_string(), a.to_string()));
            }
            Self {
                pairs: set,
                calls: Vec::new(),
            }
        }
    }

    impl MergeOracle for ScriptedOracle {
        fn conflicts(&mut self, ours: &str, theirs: &str) -> Result<bool> {
            self.calls.push((ours.to_string(), theirs.to_string()));
            Ok(self.pairs.contains(&(ours.to_string(), theirs.to_string())))
        }
    }

    struct FailingOracle;

    impl MergeOracle for FailingOracle {
        fn conflicts(&mut self, ours: &str, theirs: &str) -> Result<bool> {
            Err(MineError::probe(ours, theirs, "checkout failed"))
        }
    }

    fn node(id: &str, parents: &[&str]) -> CommitNode {
        CommitNode::new(
            id.to_string(),
            parents.iter().map(|p| p.to_string()).collect(),
            Utc::now(),
        )
    }

    #[test]
    fn test_probe_collects_conflicting_candidates() -> Result<()> {
        let mut prober = ConflictProber::new(ScriptedOracle::new(&[("c", "x")]));
        let found = prober.probe("c", &["x".to_string(), "y".to_string()])?;

        assert_eq!(found, vec!["x".to_string()]);
        assert_eq!(prober.trial_merges(), 2);
        Ok(())
    }

    #[test]
    fn test_linear_history_never_probes() -> Result<()> {
        let mut prober = ConflictProber::new(ScriptedOracle::new(&[]));
        let history = vec![node("a", &[]), node("b", &["a"]), node("c", &["b"])];
        let table = annotate(history, &mut prober)?;

        assert_eq!(table.len(), 3);
        assert_eq!(prober.trial_merges(), 0);
        assert!(table.rows().iter().all(|r| r.neighbors.is_empty()));
        Ok(())
    }

    #[test]
    fn test_commit_is_never_probed_against_itself_or_its_parent() -> Result<()> {
        let mut prober = ConflictProber::new(ScriptedOracle::new(&[("b", "c")]));
        let history = vec![
            node("a", &[]),
            node("b", &["a"]),
            node("c", &["a"]),
            node("d", &["b", "c"]),
        ];
        let table = annotate(history, &mut prober)?;

        let calls = prober.into_oracle().calls;
        assert_eq!(calls, vec![("c".to_string(), "b".to_string())]);
        assert_eq!(table.neighbors("c"), ["b".to_string()]);
        assert!(table.neighbors("d").is_empty());
        assert_eq!(table.get("c").map(|r| r.lanes.as_str()), Some("| *"));
        assert_eq!(table.get("d").map(|r| r.lanes.as_str()), Some("*"));
        Ok(())
    }

    #[test]
    fn test_oracle_failure_aborts_walk() {
        let mut prober = ConflictProber::new(FailingOracle);
        let history = vec![node("a", &[]), node("b", &[])];

        let err = annotate(history, &mut prober).unwrap_err();
        assert!(matches!(err, MineError::Probe { .. }));
        assert!(err.is_fatal());
    }
}
