//! Log source provider
//!
//! Lists candidate logs in a directory and maps the chosen one read-only
//! for the scanner.

mod exclude;

pub use exclude::{ExcludeError, ExcludeRules, HOUSEKEEPING_FILES, IGNORE_FILE_NAME};

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use failscan_core::LineCursor;
use memmap2::Mmap;
use serde::Serialize;
use walkdir::WalkDir;

/// Errors from listing or opening logs
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("log directory not readable: {path}: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk log directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid exclude rules: {0}")]
    Exclude(#[from] ExcludeError),

    #[error("log not readable: {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("no log files in {0}")]
    NoLogs(PathBuf),

    #[error("log number {index} out of range (1-{available})")]
    IndexOutOfRange { index: usize, available: usize },
}

/// Listing order by modification time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    pub fn from_newest_first(newest_first: bool) -> Self {
        if newest_first {
            SortOrder::NewestFirst
        } else {
            SortOrder::OldestFirst
        }
    }
}

/// A log file found in a directory
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// Build exclude rules for `dir`: built-in names, `extra` globs, and the
/// directory's `.failscanignore` if present.
pub fn exclude_rules(dir: &Path, extra: &[String]) -> Result<ExcludeRules, SourceError> {
    let mut rules = ExcludeRules::new().with_patterns(extra)?;
    let ignore_file = dir.join(IGNORE_FILE_NAME);
    if ignore_file.is_file() {
        rules = rules.with_ignore_file(&ignore_file)?;
    }
    Ok(rules)
}

/// List regular files directly inside `dir`, sorted by modification time.
///
/// Housekeeping files and anything matched by `rules` are left out. Ties on
/// modification time are broken by name so the order is stable.
pub fn list_logs(dir: &Path, order: SortOrder, rules: &ExcludeRules) -> Result<Vec<LogEntry>, SourceError> {
    if !dir.is_dir() {
        return Err(SourceError::DirectoryUnavailable {
            path: dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            // The directory itself could not be read.
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if name == IGNORE_FILE_NAME || rules.is_excluded(&name) {
            tracing::trace!(name = %name, "skipping excluded file");
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!(name = %name, error = %e, "skipping file without metadata");
                continue;
            }
        };
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        entries.push(LogEntry {
            name,
            path: entry.into_path(),
            size: metadata.len(),
            modified: DateTime::<Utc>::from(modified),
        });
    }

    entries.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));
    if order == SortOrder::NewestFirst {
        entries.reverse();
    }

    tracing::debug!(dir = %dir.display(), count = entries.len(), "listed log files");
    Ok(entries)
}

/// Pick the 1-based `index`-th entry of a listing.
pub fn select(entries: &[LogEntry], index: usize) -> Result<&LogEntry, SourceError> {
    if index == 0 || index > entries.len() {
        return Err(SourceError::IndexOutOfRange {
            index,
            available: entries.len(),
        });
    }
    Ok(&entries[index - 1])
}

/// A log file mapped read-only into memory
///
/// The mapping is released when the value is dropped.
#[derive(Debug)]
pub struct LogSource {
    path: PathBuf,
    map: Option<Mmap>,
}

impl LogSource {
    /// Open and map a log file.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let unavailable = |source| SourceError::Unavailable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(unavailable)?;
        let metadata = file.metadata().map_err(unavailable)?;
        if !metadata.is_file() {
            return Err(SourceError::NotAFile(path.to_path_buf()));
        }

        // Zero-length files cannot be mapped on every platform.
        if metadata.len() == 0 {
            return Ok(Self {
                path: path.to_path_buf(),
                map: None,
            });
        }

        // SAFETY: the map is read-only and owned by this value. Logs are not
        // expected to be truncated while a scan runs.
        let map = unsafe { Mmap::map(&file) }.map_err(unavailable)?;

        tracing::debug!(path = %path.display(), bytes = map.len(), "mapped log file");
        Ok(Self {
            path: path.to_path_buf(),
            map: Some(map),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    /// A fresh cursor positioned at the first line.
    pub fn cursor(&self) -> LineCursor<'_> {
        LineCursor::new(self.bytes())
    }
}
