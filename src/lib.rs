//! failscan - CI log failure extractor
//!
//! Scans continuous-integration test logs for `(N FAILED)` markers, captures
//! the reason text after each distinct count, and writes a plain-text report.
//! The scan itself lives in `failscan-core`; this crate adds log discovery,
//! report files, layered configuration, and the CLI glue.

pub mod config;
pub mod exit;
pub mod highlight;
pub mod picker;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod viewer;

pub use config::{ConfigError, EffectiveConfig, Settings};
pub use exit::ExitCode;
pub use pipeline::{analyze, Analysis, AnalysisError};
pub use sink::{SinkError, SinkTarget};
pub use source::{LogEntry, LogSource, SortOrder, SourceError};

pub use failscan_core::{scan, scan_to_string, ExtractOptions, ReportWriter, ScanError, ScanSummary};
