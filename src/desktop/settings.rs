//! Per-user shell settings: which folder holds the user's notes.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::expand_tilde;
use crate::storage::{read_document, write_document};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SettingsFile")]
pub struct ShellSettings {
    /// Folder the user picked; the store lives in `<data_path>/.data`.
    pub data_path: Option<String>,
}

/// On-disk shape. Older builds wrote the folder under `contextBuddyPath`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    data_path: Option<String>,
    #[serde(default)]
    context_buddy_path: Option<String>,
}

impl From<SettingsFile> for ShellSettings {
    fn from(file: SettingsFile) -> Self {
        Self {
            data_path: file.data_path.or(file.context_buddy_path),
        }
    }
}

impl ShellSettings {
    pub fn data_path(&self) -> Option<PathBuf> {
        self.data_path.as_deref().map(expand_tilde)
    }
}

/// `None` when no settings file exists yet, which marks a first run.
pub fn load(path: &Path) -> Option<ShellSettings> {
    read_document::<Option<ShellSettings>>(path, None)
}

pub fn save(path: &Path, settings: &ShellSettings) -> Result<()> {
    write_document(path, settings)?;
    tracing::info!(path = %path.display(), "shell settings saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_means_first_run() {
        let tmp = TempDir::new().unwrap();
        assert!(load(&tmp.path().join("config.json")).is_none());
    }

    #[test]
    fn legacy_key_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"contextBuddyPath": "/Users/me/notes"}"#).unwrap();
        let settings = load(&path).unwrap();
        assert_eq!(settings.data_path.as_deref(), Some("/Users/me/notes"));
    }

    #[test]
    fn new_key_wins_over_legacy() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"dataPath": "/new", "contextBuddyPath": "/old"}"#).unwrap();
        assert_eq!(load(&path).unwrap().data_path.as_deref(), Some("/new"));
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ContextBuddy").join("config.json");
        let settings = ShellSettings {
            data_path: Some("/tmp/cb".into()),
        };
        save(&path, &settings).unwrap();
        assert_eq!(load(&path), Some(settings));
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"dataPath\""));
    }
}
