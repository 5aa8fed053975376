pub mod parse;
pub mod text;

pub use parse::{parse_report, ParsedReport, ReportRow};
pub use text::{TextReport, INTERVAL_HEADER};
