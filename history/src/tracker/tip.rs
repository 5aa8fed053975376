use crate::core::CommitId;

/// The most recent commit seen on one diverging line of development
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTip {
    head: CommitId,
}

impl BranchTip {
    pub fn new(commit: CommitId) -> Self {
        Self { head: commit }
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    pub(crate) fn update_head(&mut self, commit: CommitId) {
        self.head = commit;
    }
}
