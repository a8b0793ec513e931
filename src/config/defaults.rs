//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// List logs newest-first (default: true)
    pub newest_first: bool,

    /// Write reports to a temp file instead of the report directory (default: true)
    pub use_temp_file: bool,

    /// Command used to open a finished report (default: "code")
    pub viewer_command: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            newest_first: true,
            use_temp_file: true,
            viewer_command: "code".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    ///
    /// Every key the settings struct knows is present, so later layers only
    /// need to carry what they change.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "logs": {
                "directory": null,
                "newest_first": self.newest_first,
                "ignore": []
            },
            "report": {
                "use_temp_file": self.use_temp_file,
                "directory": null
            },
            "scan": {
                "start_search_limit": null
            },
            "viewer": {
                "command": self.viewer_command,
                "args": []
            }
        })
    }
}
