//! Editing the user config file
//!
//! `set_key` rewrites a single key and leaves the rest of the file's values
//! alone. Comments are not preserved.

use std::fs;
use std::path::Path;

use super::defaults::BuiltinDefaults;
use super::effective::toml_to_json;
use super::merge::merge_layers;
use super::{ConfigError, Settings};

/// Starter file written by `config init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# failscan configuration

[logs]
# Directory holding CI run logs.
# directory = "/path/to/logs"
newest_first = true
# Glob patterns for files to leave out of listings.
ignore = []

[report]
# Write each report to a fresh temp file. When false, reports go to `directory`.
use_temp_file = true
# directory = "/path/to/reports"

[scan]
# Stop looking for a reason start line after this many lines.
# start_search_limit = 500

[viewer]
command = "code"
args = []
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Path,
    Bool,
    Count,
    Text,
    List,
}

/// Keys accepted by `config set`
pub const SETTABLE_KEYS: &[&str] = &[
    "logs.directory",
    "logs.newest_first",
    "logs.ignore",
    "report.use_temp_file",
    "report.directory",
    "scan.start_search_limit",
    "viewer.command",
    "viewer.args",
];

fn key_kind(key: &str) -> Option<KeyKind> {
    let kind = match key {
        "logs.directory" | "report.directory" => KeyKind::Path,
        "logs.newest_first" | "report.use_temp_file" => KeyKind::Bool,
        "scan.start_search_limit" => KeyKind::Count,
        "viewer.command" => KeyKind::Text,
        "logs.ignore" | "viewer.args" => KeyKind::List,
        _ => return None,
    };
    Some(kind)
}

/// Parse a command-line value for `key`. `None` means "unset".
fn parse_value(key: &str, kind: KeyKind, raw: &str) -> Result<Option<toml::Value>, ConfigError> {
    let invalid = |what: &str| ConfigError::Invalid(format!("{} expects {}, got '{}'", key, what, raw));

    let value = match kind {
        KeyKind::Path if raw.is_empty() => return Ok(None),
        KeyKind::Count if raw.is_empty() => return Ok(None),
        KeyKind::Path | KeyKind::Text => toml::Value::String(raw.to_string()),
        KeyKind::Bool => toml::Value::Boolean(raw.parse().map_err(|_| invalid("true or false"))?),
        KeyKind::Count => {
            let n: i64 = raw.parse().map_err(|_| invalid("a positive integer"))?;
            if n <= 0 {
                return Err(invalid("a positive integer"));
            }
            toml::Value::Integer(n)
        }
        KeyKind::List => toml::Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| toml::Value::String(s.to_string()))
                .collect(),
        ),
    };
    Ok(Some(value))
}

/// Set `key` (e.g. `report.directory`) to `raw` in the file at `path`.
///
/// An empty `raw` removes optional keys. The file is created if missing, and
/// the result must still form valid settings or nothing is written.
pub fn set_key(path: &Path, key: &str, raw: &str) -> Result<(), ConfigError> {
    let kind = key_kind(key).ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

    let mut table: toml::Table = if path.exists() {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents)?
    } else {
        toml::Table::new()
    };

    let section_table = table
        .entry(section.to_string())
        .or_insert(toml::Value::Table(toml::Table::new()));
    let Some(section_table) = section_table.as_table_mut() else {
        return Err(ConfigError::Invalid(format!("'{}' is not a table", section)));
    };

    match parse_value(key, kind, raw)? {
        Some(value) => {
            section_table.insert(field.to_string(), value);
        }
        None => {
            section_table.remove(field);
        }
    }

    let merged = merge_layers(vec![
        BuiltinDefaults::default().to_value(),
        toml_to_json(toml::Value::Table(table.clone())),
    ]);
    let settings: Settings =
        serde_json::from_value(merged).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    settings.validate()?;

    write_file(path, &toml::to_string_pretty(&table)?)?;
    tracing::info!(path = %path.display(), key, "updated configuration");
    Ok(())
}

/// Write the starter config to `path`. Refuses to overwrite unless `force`.
pub fn init_file(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    write_file(path, DEFAULT_CONFIG_TEMPLATE)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    fs::write(path, contents).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectiveConfig;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_template_is_valid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");
        init_file(&path, false).unwrap();

        let config = EffectiveConfig::build(Some(&path), None).unwrap();
        assert!(config.settings.report.use_temp_file);
        assert_eq!(config.settings.viewer.command, "code");
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        init_file(&path, false).unwrap();

        assert!(matches!(init_file(&path, false), Err(ConfigError::AlreadyExists(_))));
        init_file(&path, true).unwrap();
    }

    #[test]
    fn test_set_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        set_key(&path, "logs.directory", "/ci/logs").unwrap();
        let config = EffectiveConfig::build(Some(&path), None).unwrap();
        assert_eq!(config.settings.logs.directory, Some(PathBuf::from("/ci/logs")));
    }

    #[test]
    fn test_set_keeps_other_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[viewer]\ncommand = \"vim\"\nargs = [\"-R\"]\n").unwrap();

        set_key(&path, "scan.start_search_limit", "250").unwrap();
        let config = EffectiveConfig::build(Some(&path), None).unwrap();
        assert_eq!(config.settings.scan.start_search_limit, Some(250));
        assert_eq!(config.settings.viewer.command, "vim");
        assert_eq!(config.settings.viewer.args, vec!["-R".to_string()]);
    }

    #[test]
    fn test_set_list_and_unset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        set_key(&path, "logs.ignore", "*.gz, *.zip").unwrap();
        set_key(&path, "scan.start_search_limit", "10").unwrap();
        set_key(&path, "scan.start_search_limit", "").unwrap();

        let config = EffectiveConfig::build(Some(&path), None).unwrap();
        assert_eq!(config.settings.logs.ignore, vec!["*.gz".to_string(), "*.zip".to_string()]);
        assert_eq!(config.settings.scan.start_search_limit, None);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        assert!(matches!(set_key(&path, "logs.newest_first", "maybe"), Err(ConfigError::Invalid(_))));
        assert!(matches!(set_key(&path, "scan.start_search_limit", "0"), Err(ConfigError::Invalid(_))));
        assert!(matches!(set_key(&path, "logs.colour", "red"), Err(ConfigError::UnknownKey(_))));
        // Turning off temp files without a report directory is invalid
        assert!(matches!(set_key(&path, "report.use_temp_file", "false"), Err(ConfigError::Invalid(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_settable_keys_have_kinds() {
        for key in SETTABLE_KEYS {
            assert!(key_kind(key).is_some(), "{} has no kind", key);
        }
    }
}
