//! Reason-block extraction.
//!
//! Runs right after a failure marker and reads forward on the scanner's own
//! cursor in two phases:
//! 1. skip lines until one contains `FAILED`, keeping the prefix through it
//! 2. collect raw lines until the `HeadlessChrome x.y.z` banner or the cap

use crate::cursor::{decode, trim_terminator, LineCursor};
use crate::patterns::Patterns;

/// Maximum number of lines in a reason block, start capture included.
pub const MAX_REASON_LINES: usize = 20;

/// Lines captured as the explanation for one failure marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReasonBlock {
    lines: Vec<String>,
}

impl ReasonBlock {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    fn is_full(&self) -> bool {
        self.lines.len() >= MAX_REASON_LINES
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

/// Tuning for a single extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// How many lines phase 1 may skip while looking for the start line.
    ///
    /// `None` skips without bound, which can swallow the rest of the log when
    /// no start line follows a marker.
    pub start_search_limit: Option<usize>,
}

/// How phase 1 ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartSearch {
    Found,
    /// Input ran out before a start line; everything after the marker was consumed.
    EndOfInput,
    /// The skip limit was hit; the cursor was put back where extraction began.
    LimitReached,
}

/// Result of one extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub block: ReasonBlock,
    pub start: StartSearch,
}

/// Extract the reason block that follows a marker.
///
/// Reads from the current cursor position; consumed lines are not revisited
/// by the caller. Never fails: running out of input yields whatever was
/// collected so far.
pub fn extract(cursor: &mut LineCursor<'_>, patterns: &Patterns, options: ExtractOptions) -> Extraction {
    let origin = cursor.position();
    let mut block = ReasonBlock::default();
    let mut skipped = 0usize;

    // Phase 1: find the start line.
    loop {
        let Some(raw) = cursor.next_line() else {
            return Extraction {
                block,
                start: StartSearch::EndOfInput,
            };
        };
        let line = decode(trim_terminator(raw));
        if let Some(start) = patterns.reason_start(&line) {
            block.push(start);
            break;
        }

        skipped += 1;
        if let Some(limit) = options.start_search_limit {
            if skipped >= limit {
                tracing::warn!(
                    offset = origin,
                    skipped,
                    "no reason start line within search limit, resuming scan after marker"
                );
                cursor.seek(origin);
                return Extraction {
                    block,
                    start: StartSearch::LimitReached,
                };
            }
        }
    }

    // Phase 2: accumulate until the runner banner or the cap.
    while !block.is_full() {
        let Some(raw) = cursor.next_line() else {
            break;
        };
        let line = decode(trim_terminator(raw));
        if patterns.is_end_of_reason(&line) {
            break;
        }
        block.push(line);
    }

    Extraction {
        block,
        start: StartSearch::Found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, options: ExtractOptions) -> (Extraction, usize) {
        let mut cursor = LineCursor::new(input.as_bytes());
        let extraction = extract(&mut cursor, Patterns::get(), options);
        (extraction, cursor.position())
    }

    #[test]
    fn test_collects_until_banner() {
        let input = "noise\nSomeTest FAILED\nreason line 1\nreason line 2\nHeadlessChrome 91.0.1\nafter\n";
        let (extraction, _) = run(input, ExtractOptions::default());
        assert_eq!(extraction.start, StartSearch::Found);
        assert_eq!(
            extraction.block.lines(),
            &["SomeTest FAILED", "reason line 1", "reason line 2"]
        );
    }

    #[test]
    fn test_banner_line_is_consumed() {
        let input = "A FAILED\nHeadlessChrome 91.0.1\nnext\n";
        let mut cursor = LineCursor::new(input.as_bytes());
        let extraction = extract(&mut cursor, Patterns::get(), ExtractOptions::default());
        assert_eq!(extraction.block.lines(), &["A FAILED"]);
        assert_eq!(cursor.next_line(), Some(&b"next\n"[..]));
    }

    #[test]
    fn test_start_capture_is_prefix_only() {
        let (extraction, _) = run(
            "Chrome Headless SomeSpec should work FAILED (skipped 2)\n",
            ExtractOptions::default(),
        );
        assert_eq!(extraction.block.lines(), &["Chrome Headless SomeSpec should work FAILED"]);
    }

    #[test]
    fn test_cap_at_twenty_lines() {
        let mut input = String::from("Spec FAILED\n");
        for i in 0..50 {
            input.push_str(&format!("detail {}\n", i));
        }
        let mut cursor = LineCursor::new(input.as_bytes());
        let extraction = extract(&mut cursor, Patterns::get(), ExtractOptions::default());

        assert_eq!(extraction.block.len(), MAX_REASON_LINES);
        assert_eq!(extraction.block.lines()[0], "Spec FAILED");
        assert_eq!(extraction.block.lines()[19], "detail 18");
        // The line after the cap is left for the scanner.
        assert_eq!(cursor.next_line(), Some(&b"detail 19\n"[..]));
    }

    #[test]
    fn test_truncated_at_end_of_input() {
        let (extraction, _) = run("Spec FAILED\nonly line", ExtractOptions::default());
        assert_eq!(extraction.start, StartSearch::Found);
        assert_eq!(extraction.block.lines(), &["Spec FAILED", "only line"]);
    }

    #[test]
    fn test_unbounded_start_search_consumes_everything() {
        let input = "a\nb\n(4 FAILED)\nc\n";
        let (extraction, pos) = run(input, ExtractOptions::default());
        // "(4 FAILED)" contains FAILED, so it is taken as the start line.
        assert_eq!(extraction.block.lines(), &["(4 FAILED", "c"]);
        assert_eq!(pos, input.len());

        let (extraction, pos) = run("a\nb\nc\n", ExtractOptions::default());
        assert_eq!(extraction.start, StartSearch::EndOfInput);
        assert!(extraction.block.is_empty());
        assert_eq!(pos, 6);
    }

    #[test]
    fn test_start_search_limit_rewinds() {
        let options = ExtractOptions {
            start_search_limit: Some(2),
        };
        let (extraction, pos) = run("a\nb\nX FAILED\n", options);
        assert_eq!(extraction.start, StartSearch::LimitReached);
        assert!(extraction.block.is_empty());
        assert_eq!(pos, 0);

        let (extraction, _) = run("a\nX FAILED\nwhy\n", options);
        assert_eq!(extraction.start, StartSearch::Found);
        assert_eq!(extraction.block.lines(), &["X FAILED", "why"]);
    }

    #[test]
    fn test_crlf_lines_are_trimmed() {
        let (extraction, _) = run("T FAILED\r\nwhy\r\nHeadlessChrome 1.2.3\r\n", ExtractOptions::default());
        assert_eq!(extraction.block.lines(), &["T FAILED", "why"]);
    }

    #[test]
    fn test_invalid_utf8_is_kept_lossily() {
        let input: &[u8] = b"T FAILED\nbad \xfe\nHeadlessChrome 1.2.3\n";
        let mut cursor = LineCursor::new(input);
        let extraction = extract(&mut cursor, Patterns::get(), ExtractOptions::default());
        assert_eq!(extraction.block.lines(), &["T FAILED", "bad \u{FFFD}"]);
    }
}
