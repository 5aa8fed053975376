pub mod walker;

pub use walker::{parse_since, HistoryWalker, WalkOptions};
