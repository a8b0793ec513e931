//! Streaming failure-block extractor for CI test-run logs.
//!
//! The scanner walks a log once, finds `(N FAILED)` markers, and for each
//! count it has not seen before captures up to twenty lines of explanation
//! and writes them to a report sink.

mod cursor;
mod extract;
mod patterns;
mod report;
mod scan;

pub use cursor::{decode, trim_terminator, LineCursor};
pub use extract::{extract, ExtractOptions, Extraction, ReasonBlock, StartSearch, MAX_REASON_LINES};
pub use patterns::{Patterns, END_OF_REASON_PATTERN, FAILED_PATTERN, REASON_PATTERN};
pub use report::{
    separator, ReportWriter, FAILED_HEADER_SUFFIX, NO_ERRORS_MESSAGE, SEPARATOR_WIDTH, TAB_INDENT,
};
pub use scan::{scan, scan_to_string, ScanError, ScanSummary};
