use crate::errors::EditorError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Editor persistence and history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Quiet period before an auto-save fires
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,

    /// Number of rotating backup snapshots to keep
    #[serde(default = "default_backup_limit")]
    pub backup_limit: usize,

    /// Namespace prefix for storage keys
    #[serde(default = "default_storage_prefix")]
    pub storage_prefix: String,

    /// Format tag written into every snapshot
    #[serde(default = "default_format_version")]
    pub format_version: String,

    /// Undo depth; no history is kept when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
}

fn default_autosave_delay_ms() -> u64 {
    2000
}

fn default_backup_limit() -> usize {
    5
}

fn default_storage_prefix() -> String {
    "quiz-editor-".to_string()
}

fn default_format_version() -> String {
    crate::snapshot::FORMAT_VERSION.to_string()
}

impl EditorConfig {
    /// Load from a JSON file, using defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, EditorError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| EditorError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| EditorError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: default_autosave_delay_ms(),
            backup_limit: default_backup_limit(),
            storage_prefix: default_storage_prefix(),
            format_version: default_format_version(),
            history_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "autosaveDelayMs": 500,
            "backupLimit": 3,
            "historyLimit": 50
        }"#;

        let config: EditorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.autosave_delay(), Duration::from_millis(500));
        assert_eq!(config.backup_limit, 3);
        assert_eq!(config.storage_prefix, "quiz-editor-");
        assert_eq!(config.history_limit, Some(50));
    }

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.autosave_delay_ms, 2000);
        assert_eq!(config.backup_limit, 5);
        assert_eq!(config.format_version, "1.0");
        assert!(config.history_limit.is_none());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.json");
        std::fs::write(&path, "{ nope").unwrap();

        assert!(matches!(EditorConfig::load(&path), Err(EditorError::Config(_))));
    }
}
