//! Delimiter patterns recognised in test-run logs.
//!
//! These three expressions are the only log format the extractor relies on:
//! - marker: `(<digits> FAILED)` anywhere in a line
//! - reason start: everything up to and including the first `FAILED`
//! - reason end: a line that begins with the `HeadlessChrome x.y.z` runner banner

use std::sync::OnceLock;

use regex_lite::Regex;

/// Failure-count marker, searched anywhere in a line.
pub const FAILED_PATTERN: &str = r"\((\d+) FAILED\)";

/// Start of a reason block. Anchored at the start of the line.
pub const REASON_PATTERN: &str = r"^(.*?FAILED)";

/// Runner banner that terminates a reason block. Anchored at the start of the line.
pub const END_OF_REASON_PATTERN: &str = r"^HeadlessChrome \d+\.\d+\.\d";

/// Compiled delimiter patterns.
#[derive(Debug, Clone)]
pub struct Patterns {
    failed: Regex,
    reason: Regex,
    end_of_reason: Regex,
}

impl Patterns {
    /// Process-wide compiled patterns.
    pub fn get() -> &'static Patterns {
        static PATTERNS: OnceLock<Patterns> = OnceLock::new();
        PATTERNS.get_or_init(Patterns::compile)
    }

    fn compile() -> Self {
        // Fixed literals, exercised by the tests below.
        Self {
            failed: Regex::new(FAILED_PATTERN).unwrap(),
            reason: Regex::new(REASON_PATTERN).unwrap(),
            end_of_reason: Regex::new(END_OF_REASON_PATTERN).unwrap(),
        }
    }

    /// Look for a `(N FAILED)` marker anywhere in `line` and return its
    /// count as a decimal string without leading zeros.
    ///
    /// Counts are kept as text so any number of digits is accepted.
    pub fn marker<'l>(&self, line: &'l str) -> Option<&'l str> {
        let digits = self.failed.captures(line)?.get(1)?.as_str();
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Some(&digits[digits.len() - 1..])
        } else {
            Some(trimmed)
        }
    }

    /// The prefix of `line` up to and including the first `FAILED`, if any.
    pub fn reason_start<'l>(&self, line: &'l str) -> Option<&'l str> {
        self.reason
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Whether `line` is the runner banner that ends a reason block.
    pub fn is_end_of_reason(&self, line: &str) -> bool {
        self.end_of_reason.is_match(line)
    }
}
