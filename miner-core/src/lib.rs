pub mod config;
pub mod merge;
pub mod miner;

pub use config::{ConfigError, MinerConfig};
pub use merge::{InMemoryMerge, MergeStrategy, WorktreeMerge};
pub use miner::{ConflictMiner, MiningReport};
