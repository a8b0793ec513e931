//! Line highlighting for finished reports
//!
//! Works on report text only and shares nothing with the scanner.

use owo_colors::OwoColorize;

/// Keywords that mark a stack-trace or usage line
const TRACE_KEYWORDS: &[&str] = &["at ", "Error: ", "Usage: "];

/// Style class of one report line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Plain,
    Failure,
    Trace,
}

/// Classify a single line. `FAILED` wins over trace keywords.
pub fn classify_line(line: &str) -> LineStyle {
    if line.contains("FAILED") {
        LineStyle::Failure
    } else if TRACE_KEYWORDS.iter().any(|k| line.contains(k)) {
        LineStyle::Trace
    } else {
        LineStyle::Plain
    }
}

/// Render report text with ANSI colours, one style per line.
pub fn render(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for line in text.lines() {
        let styled = match classify_line(line) {
            LineStyle::Failure => line.red().to_string(),
            LineStyle::Trace => line.dimmed().to_string(),
            LineStyle::Plain => line.to_string(),
        };
        out.push_str(&styled);
        out.push('\n');
    }
    out
}
