//! Report sink provider
//!
//! A report goes either to a persisted temporary file or to a uniquely named
//! file inside the configured report directory.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use ulid::Ulid;

/// File name prefix for reports written to a report directory
pub const REPORT_PREFIX: &str = "failures";

/// Extension of every report file
pub const REPORT_SUFFIX: &str = ".txt";

/// Errors creating or writing a report file
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("cannot create report directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create report file in {dir}: {source}")]
    Create {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed writing report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where a report should be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    /// A new file in the system temp directory, kept after the run
    Temporary,
    /// A new uniquely named file inside this directory (created if absent)
    ReportDir(PathBuf),
}

impl SinkTarget {
    /// Choose a target from the `report` configuration section
    pub fn from_settings(use_temp_file: bool, directory: Option<&Path>) -> Self {
        match directory {
            Some(dir) if !use_temp_file => SinkTarget::ReportDir(dir.to_path_buf()),
            _ => SinkTarget::Temporary,
        }
    }

    /// Create the destination file and open it for buffered writing
    pub fn create(&self) -> Result<ReportFile, SinkError> {
        match self {
            SinkTarget::Temporary => {
                let temp = tempfile::Builder::new()
                    .prefix(&format!("{}-", REPORT_PREFIX))
                    .suffix(REPORT_SUFFIX)
                    .tempfile()
                    .map_err(|source| SinkError::Create {
                        dir: std::env::temp_dir(),
                        source,
                    })?;
                let (file, path) = temp.keep().map_err(|e| SinkError::Create {
                    dir: std::env::temp_dir(),
                    source: e.error,
                })?;
                Ok(ReportFile::new(path, file))
            }
            SinkTarget::ReportDir(dir) => {
                fs::create_dir_all(dir).map_err(|source| SinkError::Directory {
                    path: dir.clone(),
                    source,
                })?;
                let path = dir.join(unique_report_name());
                let file = File::options()
                    .write(true)
                    .create_new(true)
                    .open(&path)
                    .map_err(|source| SinkError::Create {
                        dir: dir.clone(),
                        source,
                    })?;
                Ok(ReportFile::new(path, file))
            }
        }
    }
}

/// `failures-<UTC timestamp>-<ulid>.txt`
pub fn unique_report_name() -> String {
    format!(
        "{}-{}-{}{}",
        REPORT_PREFIX,
        Utc::now().format("%Y%m%dT%H%M%SZ"),
        Ulid::new().to_string().to_lowercase(),
        REPORT_SUFFIX
    )
}

/// An open report file
#[derive(Debug)]
pub struct ReportFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ReportFile {
    fn new(path: PathBuf, file: File) -> Self {
        Self {
            path,
            writer: BufWriter::new(file),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered output and close the file, returning its path.
    ///
    /// If the flush fails the partial file is removed.
    pub fn close(mut self) -> Result<PathBuf, SinkError> {
        if let Err(source) = self.writer.flush() {
            let path = self.path.clone();
            self.discard();
            return Err(SinkError::Write { path, source });
        }
        Ok(self.path)
    }

    /// Remove a partially written report
    pub fn discard(self) {
        let path = self.path;
        drop(self.writer);
        if let Err(e) = fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial report");
        }
    }
}

impl Write for ReportFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_settings() {
        let dir = PathBuf::from("/reports");
        assert_eq!(SinkTarget::from_settings(true, Some(dir.as_path())), SinkTarget::Temporary);
        assert_eq!(SinkTarget::from_settings(false, None), SinkTarget::Temporary);
        assert_eq!(
            SinkTarget::from_settings(false, Some(dir.as_path())),
            SinkTarget::ReportDir(dir.clone())
        );
    }

    #[test]
    fn test_unique_names_differ() {
        let a = unique_report_name();
        let b = unique_report_name();
        assert_ne!(a, b);
        assert!(a.starts_with("failures-"));
        assert!(a.ends_with(".txt"));
    }

    #[test]
    fn test_report_dir_created() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("reports/nested");
        let target = SinkTarget::ReportDir(dir.clone());

        let mut report = target.create().unwrap();
        writeln!(report, "hello").unwrap();
        let path = report.close().unwrap();

        assert!(path.starts_with(&dir));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_temporary_file_persists() {
        let mut report = SinkTarget::Temporary.create().unwrap();
        write!(report, "x").unwrap();
        let path = report.close().unwrap();

        assert!(path.exists());
        assert!(path.to_string_lossy().ends_with(".txt"));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_discard_removes_file() {
        let root = TempDir::new().unwrap();
        let report = SinkTarget::ReportDir(root.path().to_path_buf()).create().unwrap();
        let path = report.path().to_path_buf();
        assert!(path.exists());

        report.discard();
        assert!(!path.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_flush_removes_file() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("partial.txt");
        fs::write(&path, "").unwrap();
        // Writes to /dev/full fail with ENOSPC once the buffer is flushed.
        let full = File::options().write(true).open("/dev/full").unwrap();

        let mut report = ReportFile::new(path.clone(), full);
        writeln!(report, "buffered").unwrap();
        let err = report.close().unwrap_err();

        assert!(matches!(err, SinkError::Write { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_report_dir() {
        let root = TempDir::new().unwrap();
        let blocker = root.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = SinkTarget::ReportDir(blocker.join("sub")).create().unwrap_err();
        assert!(matches!(err, SinkError::Directory { .. }));
    }
}
