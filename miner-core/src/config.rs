//! TOML configuration for a mining run.
//!
//! Every key is optional; command-line flags override what the file says.

use crate::merge::MergeStrategy;
use history::{parse_since, WalkOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for '{key}': {detail}")]
    Invalid { key: &'static str, detail: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MinerConfig {
    #[serde(default)]
    pub walk: WalkConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which commits are walked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalkConfig {
    /// Walk every local branch instead of HEAD only.
    #[serde(default)]
    pub all_refs: bool,
    /// History start time (RFC 3339, `YYYY-MM-DD` or unix seconds).
    #[serde(default)]
    pub since: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    #[serde(default)]
    pub strategy: MergeStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// 0 prints full ids.
    #[serde(default)]
    pub abbrev: usize,
    #[serde(default = "default_true")]
    pub graph: bool,
    #[serde(default = "default_true")]
    pub intervals: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            abbrev: 0,
            graph: default_true(),
            intervals: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl MinerConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: MinerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report.abbrev != 0 && !(4..=40).contains(&self.report.abbrev) {
            return Err(ConfigError::Invalid {
                key: "report.abbrev",
                detail: format!("{} is not 0 or between 4 and 40", self.report.abbrev),
            });
        }
        self.walk_options()?;
        Ok(())
    }

    /// Walk options with the start time parsed.
    pub fn walk_options(&self) -> Result<WalkOptions, ConfigError> {
        let since = match self.walk.since.as_deref() {
            Some(value) => Some(parse_since(value).ok_or_else(|| ConfigError::Invalid {
                key: "walk.since",
                detail: format!("cannot parse '{value}' as a date or timestamp"),
            })?),
            None => None,
        };

        Ok(WalkOptions {
            since,
            all_refs: self.walk.all_refs,
        })
    }

    /// `None` when ids are printed in full.
    pub fn abbrev(&self) -> Option<usize> {
        (self.report.abbrev != 0).then_some(self.report.abbrev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_uses_defaults() -> anyhow::Result<()> {
        let config = MinerConfig::from_toml_str("")?;
        assert_eq!(config, MinerConfig::default());
        assert_eq!(config.probe.strategy, MergeStrategy::InMemory);
        assert!(config.report.graph && config.report.intervals);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.abbrev(), None);
        Ok(())
    }

    #[test]
    fn test_full_file() -> anyhow::Result<()> {
        let config = MinerConfig::from_toml_str(
            r#"
            [walk]
            all_refs = true
            since = "2015-01-01"

            [probe]
            strategy = "worktree"

            [report]
            abbrev = 10
            graph = false

            [logging]
            level = "debug"
            "#,
        )?;

        assert_eq!(config.probe.strategy, MergeStrategy::Worktree);
        assert_eq!(config.abbrev(), Some(10));
        assert!(!config.report.graph);
        assert!(config.report.intervals);

        let walk = config.walk_options()?;
        assert!(walk.all_refs);
        assert_eq!(walk.since.map(|t| t.timestamp()), Some(1_420_070_400));
        Ok(())
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_abbrev = MinerConfig::from_toml_str("[report]\nabbrev = 2\n");
        assert!(matches!(bad_abbrev, Err(ConfigError::Invalid { key: "report.abbrev", .. })));

        let bad_since = MinerConfig::from_toml_str("[walk]\nsince = \"someday\"\n");
        assert!(matches!(bad_since, Err(ConfigError::Invalid { key: "walk.since", .. })));

        let bad_strategy = MinerConfig::from_toml_str("[probe]\nstrategy = \"octopus\"\n");
        assert!(matches!(bad_strategy, Err(ConfigError::Parse(_))));

        let unknown_key = MinerConfig::from_toml_str("[walk]\ndepth = 3\n");
        assert!(matches!(unknown_key, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = MinerConfig::load_from_file(Path::new("/nonexistent/miner.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
