//! Analysis pipeline
//!
//! Ties the pieces together for one log:
//! - pick the log (explicit path or newest/indexed entry in a directory)
//! - map it read-only
//! - create the report sink
//! - scan, flush, and hand back the report path
//!
//! The source is opened before the sink is created, so an unreadable log
//! never leaves an empty report behind.

use std::path::{Path, PathBuf};

use failscan_core::{scan, ExtractOptions, ReportWriter, ScanError, ScanSummary};
use thiserror::Error;

use crate::config::{ConfigError, Settings};
use crate::sink::{SinkError, SinkTarget};
use crate::source::{self, LogEntry, LogSource, SortOrder, SourceError};
use crate::viewer::ViewerError;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    #[error("sink unavailable: {0}")]
    SinkUnavailable(#[from] SinkError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("viewer error: {0}")]
    Viewer(#[from] ViewerError),

    #[error("no log directory configured (set logs.directory or pass --dir)")]
    NoLogDirectory,
}

/// Outcome of analysing one log
#[derive(Debug, Clone)]
pub struct Analysis {
    pub log: PathBuf,
    pub report: PathBuf,
    pub summary: ScanSummary,
}

/// Scan `log` and write the report to a new file at `target`.
pub fn analyze(log: &Path, target: &SinkTarget, options: ExtractOptions) -> Result<Analysis, AnalysisError> {
    let log_source = LogSource::open(log)?;
    let report_file = target.create()?;
    let report_path = report_file.path().to_path_buf();

    let mut writer = ReportWriter::new(report_file);
    let mut cursor = log_source.cursor();
    let summary = match scan(&mut cursor, &mut writer, options) {
        Ok(summary) => summary,
        Err(ScanError::Sink(source)) => {
            writer.into_inner().discard();
            return Err(SinkError::Write {
                path: report_path,
                source,
            }
            .into());
        }
    };

    let report = writer.into_inner().close()?;
    drop(log_source);

    tracing::info!(
        log = %log.display(),
        report = %report.display(),
        blocks = summary.counts.len(),
        lines = summary.lines_read,
        "analysis complete"
    );

    Ok(Analysis {
        log: log.to_path_buf(),
        report,
        summary,
    })
}

/// Directory to list: explicit override first, then `logs.directory`.
pub fn log_directory<'a>(settings: &'a Settings, dir: Option<&'a Path>) -> Result<&'a Path, AnalysisError> {
    dir.or_else(|| settings.log_directory())
        .ok_or(AnalysisError::NoLogDirectory)
}

/// List logs in `dir` using the configured order and ignore patterns.
pub fn list(settings: &Settings, dir: &Path) -> Result<Vec<LogEntry>, AnalysisError> {
    let rules = source::exclude_rules(dir, &settings.logs.ignore)?;
    let order = SortOrder::from_newest_first(settings.logs.newest_first);
    Ok(source::list_logs(dir, order, &rules)?)
}

/// Pick the `index`-th (1-based) log in `dir`, or the first listed when
/// `index` is `None`.
pub fn choose_log(settings: &Settings, dir: &Path, index: Option<usize>) -> Result<LogEntry, AnalysisError> {
    let entries = list(settings, dir)?;
    if entries.is_empty() {
        return Err(SourceError::NoLogs(dir.to_path_buf()).into());
    }
    let entry = source::select(&entries, index.unwrap_or(1))?;
    Ok(entry.clone())
}

/// Sink target from the `report` settings
pub fn sink_target(settings: &Settings) -> SinkTarget {
    SinkTarget::from_settings(settings.report.use_temp_file, settings.report.directory.as_deref())
}

/// Extraction options from the `scan` settings
pub fn extract_options(settings: &Settings) -> ExtractOptions {
    ExtractOptions {
        start_search_limit: settings.scan.start_search_limit,
    }
}
