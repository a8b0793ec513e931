//! Single-pass failure scan.

use std::collections::HashSet;
use std::io::{self, Write};

use crate::cursor::{decode, trim_terminator, LineCursor};
use crate::extract::{extract, ExtractOptions, StartSearch};
use crate::patterns::Patterns;
use crate::report::ReportWriter;

/// Errors from a scan. Reading the source is infallible once it is in
/// memory, so only the sink can fail.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("failed to write report: {0}")]
    Sink(#[from] io::Error),
}

/// Counters describing one finished scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Distinct failure counts in order of first appearance, as decimal
    /// strings without leading zeros.
    pub counts: Vec<String>,
    /// Lines examined by the scanner itself (excludes lines the extractor consumed).
    pub lines_read: usize,
    /// Markers whose start-line search hit the configured limit.
    pub start_search_exhausted: usize,
}

impl ScanSummary {
    pub fn has_failures(&self) -> bool {
        !self.counts.is_empty()
    }
}

/// Scan a log and stream a report for every newly seen failure count.
///
/// The cursor is rewound first and is exhausted on return. When no marker
/// is found the fallback banner is written instead of any block.
pub fn scan<W: Write>(
    source: &mut LineCursor<'_>,
    sink: &mut ReportWriter<W>,
    options: ExtractOptions,
) -> Result<ScanSummary, ScanError> {
    let patterns = Patterns::get();
    let mut seen: HashSet<String> = HashSet::new();
    let mut summary = ScanSummary::default();

    source.rewind();
    while let Some(raw) = source.next_line() {
        summary.lines_read += 1;
        let line = decode(trim_terminator(raw));

        let Some(count) = patterns.marker(&line) else {
            continue;
        };
        if seen.contains(count) {
            tracing::trace!(count, "failure count already reported");
            continue;
        }
        let count = count.to_string();

        let extraction = extract(source, patterns, options);
        if extraction.start == StartSearch::LimitReached {
            summary.start_search_exhausted += 1;
        }
        tracing::debug!(
            count = %count,
            reason_lines = extraction.block.len(),
            start = ?extraction.start,
            "captured failure block"
        );
        sink.write_block(&count, &extraction.block)?;

        seen.insert(count.clone());
        summary.counts.push(count);
    }

    if seen.is_empty() {
        sink.write_fallback()?;
    }

    Ok(summary)
}

/// Scan an in-memory log into a `String`.
pub fn scan_to_string(log: &[u8], options: ExtractOptions) -> Result<(String, ScanSummary), ScanError> {
    let mut cursor = LineCursor::new(log);
    let mut writer = ReportWriter::new(Vec::new());
    let summary = scan(&mut cursor, &mut writer, options)?;
    let bytes = writer.finish()?;
    Ok((String::from_utf8_lossy(&bytes).into_owned(), summary))
}
