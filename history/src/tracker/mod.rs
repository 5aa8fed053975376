//! Reconstructs the live branch tips from a linear topological walk.
//!
//! Tips are kept in slots. A continuation updates its slot in place, a merge
//! collapses every matching tip into the slot of the first one, and a commit
//! with no live parent opens a new slot at the end. Slot order is what the
//! annotated graph draws as lanes, and what [`BranchTracker::live_tips_except`]
//! returns, so both are stable for a given state.

mod tip;

pub use tip::BranchTip;

use crate::core::CommitId;
use tracing::debug;

/// What a single [`BranchTracker::advance`] did to the live tip set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// No parent was a live tip: a new line of development starts
    Opened,
    /// Exactly one parent was a live tip and it moved forward
    Continued,
    /// Several live tips were parents and collapsed into one
    Merged { collapsed: usize },
}

#[derive(Debug, Default, Clone)]
pub struct BranchTracker {
    tips: Vec<BranchTip>,
}

impl BranchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the next commit of the walk.
    pub fn advance(&mut self, commit: &str, parents: &[CommitId]) -> Advance {
        let matching: Vec<usize> = self
            .tips
            .iter()
            .enumerate()
            .filter(|(_, tip)| parents.iter().any(|p| p == tip.head()))
            .map(|(slot, _)| slot)
            .collect();

        match matching.as_slice() {
            [] => {
                self.tips.push(BranchTip::new(commit.to_string()));
                debug!(commit, live = self.tips.len(), "opened branch tip");
                Advance::Opened
            }
            [slot] => {
                self.tips[*slot].update_head(commit.to_string());
                Advance::Continued
            }
            [first, rest @ ..] => {
                // Later slots go first so earlier indices stay valid
                for &slot in rest.iter().rev() {
                    self.tips.remove(slot);
                }
                self.tips[*first] = BranchTip::new(commit.to_string());
                debug!(
                    commit,
                    collapsed = matching.len(),
                    live = self.tips.len(),
                    "merged branch tips"
                );
                Advance::Merged {
                    collapsed: matching.len(),
                }
            }
        }
    }

    /// Heads of every live tip, in slot order
    pub fn live_tips(&self) -> Vec<CommitId> {
        self.tips.iter().map(|tip| tip.head().to_string()).collect()
    }

    /// Heads of every live tip except `commit`, in slot order
    pub fn live_tips_except(&self, commit: &str) -> Vec<CommitId> {
        self.tips
            .iter()
            .map(BranchTip::head)
            .filter(|head| *head != commit)
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }

    /// Lane markers for `commit`: `*` on its own slot, `|` on every other.
    pub fn lanes_for(&self, commit: &str) -> String {
        self.tips
            .iter()
            .map(|tip| if tip.head() == commit { "*" } else { "|" })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<CommitId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_root_opens_new_tip() {
        let mut tracker = BranchTracker::new();
        assert_eq!(tracker.advance("a", &[]), Advance::Opened);
        assert_eq!(tracker.live_tips(), ids(&["a"]));

        // A second root is a second line, even with a tip already live
        assert_eq!(tracker.advance("z", &[]), Advance::Opened);
        assert_eq!(tracker.live_tips(), ids(&["a", "z"]));
    }

    #[test]
    fn test_linear_history_keeps_one_tip() {
        let mut tracker = BranchTracker::new();
        tracker.advance("a", &[]);
        assert_eq!(tracker.advance("b", &ids(&["a"])), Advance::Continued);
        assert_eq!(tracker.advance("c", &ids(&["b"])), Advance::Continued);

        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.live_tips(), ids(&["c"]));
    }

    #[test]
    fn test_fork_and_merge() {
        let mut tracker = BranchTracker::new();
        tracker.advance("a", &[]);
        tracker.advance("b", &ids(&["a"]));
        // a was consumed by b, so the second child starts its own line
        assert_eq!(tracker.advance("c", &ids(&["a"])), Advance::Opened);
        assert_eq!(tracker.live_tips(), ids(&["b", "c"]));

        assert_eq!(
            tracker.advance("d", &ids(&["b", "c"])),
            Advance::Merged { collapsed: 2 }
        );
        assert_eq!(tracker.live_tips(), ids(&["d"]));
    }

    #[test]
    fn test_merge_shrinks_by_matches_minus_one() {
        let mut tracker = BranchTracker::new();
        for root in ["a", "b", "c", "x"] {
            tracker.advance(root, &[]);
        }
        let before = tracker.len();

        tracker.advance("m", &ids(&["a", "c", "x"]));

        assert_eq!(tracker.len(), before - 2);
        assert_eq!(tracker.live_tips(), ids(&["m", "b"]));
    }

    #[test]
    fn test_merge_keeps_first_matching_slot() {
        let mut tracker = BranchTracker::new();
        for root in ["a", "b", "c"] {
            tracker.advance(root, &[]);
        }
        tracker.advance("m", &ids(&["c", "b"]));

        assert_eq!(tracker.live_tips(), ids(&["a", "m"]));
        assert_eq!(tracker.lanes_for("m"), "| *");
    }

    #[test]
    fn test_live_tips_except_never_contains_commit() {
        let mut tracker = BranchTracker::new();
        tracker.advance("a", &[]);
        tracker.advance("b", &[]);
        tracker.advance("c", &ids(&["a"]));

        for commit in ["a", "b", "c", "unknown"] {
            assert!(!tracker.live_tips_except(commit).iter().any(|t| t == commit));
        }
        assert_eq!(tracker.live_tips_except("c"), ids(&["b"]));
        assert_eq!(tracker.live_tips_except("c"), tracker.live_tips_except("c"));
    }

    #[test]
    fn test_unknown_parents_open_new_tip() {
        let mut tracker = BranchTracker::new();
        tracker.advance("a", &[]);
        assert_eq!(tracker.advance("b", &ids(&["outside"])), Advance::Opened);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_lanes() {
        let mut tracker = BranchTracker::new();
        tracker.advance("a", &[]);
        assert_eq!(tracker.lanes_for("a"), "*");
        tracker.advance("b", &ids(&["a"]));
        tracker.advance("c", &ids(&["a"]));
        assert_eq!(tracker.lanes_for("c"), "| *");
        assert_eq!(tracker.lanes_for("b"), "* |");
    }
}
