//! Housekeeping-file filtering for log listings
//!
//! Platform marker files are dropped by exact name. Users can add glob
//! patterns through configuration or a `.failscanignore` file in the log
//! directory.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::Path;

/// Platform housekeeping files that never hold a log
pub const HOUSEKEEPING_FILES: &[&str] = &[
    ".DS_Store",
    "._.DS_Store",
    ".localized",
    ".Spotlight-V100",
    ".Trashes",
    "Icon\r",
];

/// Name of the optional per-directory ignore file
pub const IGNORE_FILE_NAME: &str = ".failscanignore";

/// Errors for exclusion rules
#[derive(Debug, thiserror::Error)]
pub enum ExcludeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Glob pattern error: {0}")]
    GlobError(#[from] globset::Error),
}

/// Rules deciding which directory entries are left out of a listing
#[derive(Debug, Clone)]
pub struct ExcludeRules {
    glob_set: GlobSet,
    patterns: Vec<String>,
}

impl Default for ExcludeRules {
    fn default() -> Self {
        Self {
            glob_set: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }
}

impl ExcludeRules {
    /// Rules with only the built-in housekeeping names
    pub fn new() -> Self {
        Self::default()
    }

    /// Add patterns from an ignore file, one glob per line, `#` for comments
    pub fn with_ignore_file(self, path: &Path) -> Result<Self, ExcludeError> {
        let contents = fs::read_to_string(path)?;
        let patterns: Vec<&str> = contents
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();

        self.with_patterns(&patterns)
    }

    /// Add glob patterns matched against the file name
    pub fn with_patterns<S: AsRef<str>>(self, patterns: &[S]) -> Result<Self, ExcludeError> {
        let mut all = self.patterns;
        all.extend(
            patterns
                .iter()
                .map(|p| p.as_ref().to_string())
                .filter(|p| !p.is_empty()),
        );

        let mut builder = GlobSetBuilder::new();
        for pattern in &all {
            builder.add(Glob::new(pattern)?);
        }

        Ok(Self {
            glob_set: builder.build()?,
            patterns: all,
        })
    }

    /// Check if a file name should be left out
    pub fn is_excluded(&self, file_name: &str) -> bool {
        HOUSEKEEPING_FILES.contains(&file_name) || self.glob_set.is_match(file_name)
    }

    /// User-supplied patterns, in the order they were added
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_housekeeping_names_excluded() {
        let rules = ExcludeRules::new();

        assert!(rules.is_excluded(".DS_Store"));
        assert!(rules.is_excluded("._.DS_Store"));
        assert!(rules.is_excluded(".localized"));
        assert!(rules.is_excluded(".Spotlight-V100"));
        assert!(rules.is_excluded(".Trashes"));
        assert!(rules.is_excluded("Icon\r"));
    }

    #[test]
    fn test_match_is_literal() {
        let rules = ExcludeRules::new();

        assert!(!rules.is_excluded("Icon"));
        assert!(!rules.is_excluded("x.DS_Store"));
        assert!(!rules.is_excluded("run-2024-01-01.log"));
    }

    #[test]
    fn test_custom_patterns() {
        let rules = ExcludeRules::new().with_patterns(&["*.gz", "tmp-*"]).unwrap();

        assert!(rules.is_excluded("old.log.gz"));
        assert!(rules.is_excluded("tmp-123"));
        assert!(!rules.is_excluded("run.log"));
        // Built-in names still apply
        assert!(rules.is_excluded(".DS_Store"));
    }

    #[test]
    fn test_patterns_accumulate() {
        let rules = ExcludeRules::new()
            .with_patterns(&["*.gz"])
            .unwrap()
            .with_patterns(&["*.zip"])
            .unwrap();

        assert!(rules.is_excluded("a.gz"));
        assert!(rules.is_excluded("a.zip"));
        assert_eq!(rules.patterns(), &["*.gz".to_string(), "*.zip".to_string()]);
    }

    #[test]
    fn test_invalid_pattern() {
        let result = ExcludeRules::new().with_patterns(&["[unclosed"]);
        assert!(matches!(result, Err(ExcludeError::GlobError(_))));
    }

    #[test]
    fn test_ignore_file_parsing() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# Comment").unwrap();
        writeln!(file, "*.tmp").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  archive-*  ").unwrap();

        let rules = ExcludeRules::new().with_ignore_file(file.path()).unwrap();

        assert!(rules.is_excluded("test.tmp"));
        assert!(rules.is_excluded("archive-2024.log"));
        assert!(!rules.is_excluded("run.log"));
    }
}
