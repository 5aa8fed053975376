use thiserror::Error;

/// Errors raised while mining a repository's history for conflicts.
#[derive(Debug, Error)]
pub enum MineError {
    /// Bad repository path, unreadable history or an unknown commit id.
    #[error("cannot access repository '{location}': {detail}")]
    RepositoryAccess { location: String, detail: String },

    /// A trial merge, or the cleanup around it, failed.
    #[error("trial merge of {ours} with {theirs} failed: {detail}")]
    Probe {
        ours: String,
        theirs: String,
        detail: String,
    },

    /// A saved report line did not have the shape of an annotated graph row.
    #[error("malformed report line {line_number}: {line:?}")]
    MalformedReport { line_number: usize, line: String },
}

impl MineError {
    pub fn repository(location: impl Into<String>, detail: impl ToString) -> Self {
        MineError::RepositoryAccess {
            location: location.into(),
            detail: detail.to_string(),
        }
    }

    pub fn probe(ours: &str, theirs: &str, detail: impl ToString) -> Self {
        MineError::Probe {
            ours: ours.to_string(),
            theirs: theirs.to_string(),
            detail: detail.to_string(),
        }
    }

    /// True for errors that must abort the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MineError::MalformedReport { .. })
    }
}

pub type Result<T> = std::result::Result<T, MineError>;
