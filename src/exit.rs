//! Stable process exit codes

use crate::pipeline::AnalysisError;

/// Exit codes returned by the `failscan` binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Completed; failures, if any, were reported
    Success = 0,
    /// Failures were found and `--strict` was given
    FailuresFound = 1,
    /// Bad configuration or usage
    Config = 2,
    /// The log could not be listed, opened, or mapped
    SourceUnavailable = 10,
    /// The report could not be created or written
    SinkUnavailable = 20,
    /// The report viewer could not be launched
    Viewer = 30,
}

impl ExitCode {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(ExitCode::Success),
            1 => Some(ExitCode::FailuresFound),
            2 => Some(ExitCode::Config),
            10 => Some(ExitCode::SourceUnavailable),
            20 => Some(ExitCode::SinkUnavailable),
            30 => Some(ExitCode::Viewer),
            _ => None,
        }
    }

    /// Exit code for a finished scan
    pub fn for_scan(has_failures: bool, strict: bool) -> Self {
        if has_failures && strict {
            ExitCode::FailuresFound
        } else {
            ExitCode::Success
        }
    }
}

impl From<&AnalysisError> for ExitCode {
    fn from(err: &AnalysisError) -> Self {
        match err {
            AnalysisError::SourceUnavailable(_) => ExitCode::SourceUnavailable,
            AnalysisError::SinkUnavailable(_) => ExitCode::SinkUnavailable,
            AnalysisError::Config(_) | AnalysisError::NoLogDirectory => ExitCode::Config,
            AnalysisError::Viewer(_) => ExitCode::Viewer,
        }
    }
}
