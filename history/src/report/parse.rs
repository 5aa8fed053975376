//! Reads an annotated graph back in, so intervals can be re-extracted
//! without re-running any trial merge.

use super::text::INTERVAL_HEADER;
use crate::core::{AnnotatedCommit, CommitId, CommitTable, CommitTableBuilder};
use crate::error::{MineError, Result};
use crate::oracle::ParentOracle;
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

static ROW_RE: OnceLock<Option<Regex>> = OnceLock::new();
static CONNECTOR_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// A commit row of a saved annotated graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub id: CommitId,
    pub neighbors: Vec<CommitId>,
    pub lanes: String,
}

#[derive(Debug, Default)]
pub struct ParsedReport {
    /// Commit rows, oldest first
    pub rows: Vec<ReportRow>,
    /// `MalformedReport` errors for the lines that were skipped
    pub skipped: Vec<MineError>,
}

/// Parse a newest-first annotated graph. Reading stops at the interval
/// header; malformed lines are logged, recorded and skipped.
pub fn parse_report(text: &str) -> ParsedReport {
    let mut report = ParsedReport::default();
    let row_re = ROW_RE.get_or_init(|| {
        Regex::new(
            r"^(?P<lanes>[\s*|/\\_.-]*?)(?P<id>[0-9a-fA-F]+) \| ?(?P<neighbors>[0-9a-fA-F ]*)$",
        )
        .ok()
    });
    let connector_re = CONNECTOR_RE.get_or_init(|| Regex::new(r"^[\s*|/\\_.-]*$").ok());
    let (Some(row_re), Some(connector_re)) = (row_re, connector_re) else {
        return report;
    };

    for (index, line) in text.lines().enumerate() {
        if line.trim_end() == INTERVAL_HEADER {
            break;
        }
        if let Some(caps) = row_re.captures(line) {
            report.rows.push(ReportRow {
                id: caps["id"].to_string(),
                neighbors: caps["neighbors"]
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
                lanes: caps["lanes"].trim_end().to_string(),
            });
        } else if !connector_re.is_match(line) {
            let err = MineError::MalformedReport {
                line_number: index + 1,
                line: line.to_string(),
            };
            warn!("{err}, skipping");
            report.skipped.push(err);
        }
    }

    report.rows.reverse();
    report
}

impl ParsedReport {
    /// Resolve every row's parents and build the table the extractor reads.
    /// Abbreviated ids are expanded through the oracle first, so rows and
    /// parents agree on one id form. An unknown commit aborts with the
    /// oracle's error.
    pub fn build_table<P: ParentOracle>(&self, oracle: &P) -> Result<CommitTable> {
        let mut table = CommitTableBuilder::new();
        for row in &self.rows {
            let id = oracle.resolve(&row.id)?;
            let parents = oracle.parents(&id)?;
            let neighbors = row
                .neighbors
                .iter()
                .map(|neighbor| oracle.resolve(neighbor))
                .collect::<Result<Vec<_>>>()?;
            table.push(AnnotatedCommit {
                id,
                parents,
                neighbors,
                lanes: row.lanes.clone(),
            });
        }
        Ok(table.build())
    }
}
