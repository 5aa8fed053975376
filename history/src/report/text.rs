use crate::core::CommitTable;
use crate::intervals::ConflictInterval;

/// Line that separates the annotated graph from the interval listing
pub const INTERVAL_HEADER: &str = "== conflict intervals ==";

/// Plain-text rendering of a mining run
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReport {
    /// Abbreviate ids to this many characters; `None` prints them in full
    pub abbrev: Option<usize>,
}

impl TextReport {
    pub fn new(abbrev: Option<usize>) -> Self {
        Self { abbrev }
    }

    fn id<'a>(&self, id: &'a str) -> &'a str {
        match self.abbrev {
            Some(len) if len < id.len() => &id[..len],
            _ => id,
        }
    }

    /// One `<lanes> <id> | <conflicting ids>` line per commit, newest first.
    pub fn render_graph(&self, table: &CommitTable) -> String {
        let mut out = String::new();
        for row in table.rows().iter().rev() {
            let neighbors: Vec<&str> = row.neighbors.iter().map(|n| self.id(n)).collect();
            out.push_str(&format!(
                "{} {} | {}\n",
                row.lanes,
                self.id(&row.id),
                neighbors.join(" ")
            ));
        }
        out
    }

    /// One `<start> <end|null> | <conflicting|nil>` line per interval.
    pub fn render_intervals(&self, intervals: &[ConflictInterval]) -> String {
        let mut out = String::new();
        for interval in intervals {
            let end = interval.end.as_deref().map(|e| self.id(e)).unwrap_or("null");
            out.push_str(&format!(
                "{} {} | {}\n",
                or_nil(self.id(&interval.start)),
                end,
                or_nil(self.id(&interval.conflicting_commit))
            ));
        }
        out
    }

    pub fn render(
        &self,
        table: &CommitTable,
        intervals: &[ConflictInterval],
        graph: bool,
        listing: bool,
    ) -> String {
        let mut out = String::new();
        if graph {
            out.push_str(&self.render_graph(table));
        }
        if listing {
            out.push_str(INTERVAL_HEADER);
            out.push('\n');
            out.push_str(&self.render_intervals(intervals));
        }
        out
    }
}

fn or_nil(id: &str) -> &str {
    if id.is_empty() {
        "nil"
    } else {
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnnotatedCommit, CommitTableBuilder};
    use pretty_assertions::assert_eq;

    fn sample_table() -> CommitTable {
        let mut builder = CommitTableBuilder::new();
        builder.push(AnnotatedCommit {
            id: "aaaaaaaa".to_string(),
            parents: vec![],
            neighbors: vec![],
            lanes: "*".to_string(),
        });
        builder.push(AnnotatedCommit {
            id: "bbbbbbbb".to_string(),
            parents: vec!["aaaaaaaa".to_string()],
            neighbors: vec!["cccccccc".to_string(), "dddddddd".to_string()],
            lanes: "* |".to_string(),
        });
        builder.build()
    }

    #[test]
    fn test_graph_is_newest_first() {
        let text = TextReport::default().render_graph(&sample_table());
        assert_eq!(
            text,
            "* | bbbbbbbb | cccccccc dddddddd\n* aaaaaaaa | \n"
        );
    }

    #[test]
    fn test_intervals_print_null_for_unresolved() {
        let mut closed = ConflictInterval::new("aaaaaaaa".to_string(), "cccccccc".to_string());
        closed.end = Some("bbbbbbbb".to_string());
        let open = ConflictInterval::new("bbbbbbbb".to_string(), "dddddddd".to_string());

        let text = TextReport::default().render_intervals(&[closed, open]);
        assert_eq!(
            text,
            "aaaaaaaa bbbbbbbb | cccccccc\nbbbbbbbb null | dddddddd\n"
        );
    }

    #[test]
    fn test_abbreviated_ids() {
        let report = TextReport::new(Some(4));
        let open = ConflictInterval::new("bbbbbbbb".to_string(), String::new());
        let text = report.render(&sample_table(), &[open], true, true);
        assert_eq!(
            text,
            "* | bbbb | cccc dddd\n* aaaa | \n== conflict intervals ==\nbbbb null | nil\n"
        );
    }
}
