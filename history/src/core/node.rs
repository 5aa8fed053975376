use chrono::{DateTime, Utc};

/// Content hash identifying a commit.
pub type CommitId = String;

/// A commit as yielded by the history walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitNode {
    /// Unique commit ID (SHA)
    pub id: CommitId,
    /// Parent commit IDs, in the order the commit records them
    pub parents: Vec<CommitId>,
    /// Committer timestamp
    pub timestamp: DateTime<Utc>,
}

impl CommitNode {
    pub fn new(id: CommitId, parents: Vec<CommitId>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            parents,
            timestamp,
        }
    }
}
