pub mod node;
pub mod table;

pub use node::{CommitId, CommitNode};
pub use table::{AnnotatedCommit, CommitTable, CommitTableBuilder};
