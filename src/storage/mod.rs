//! Flat-file JSON store.
//!
//! Every collection is one pretty-printed JSON document under the data directory:
//!
//! ```text
//! .data/
//!   config.json
//!   contexts/teams.json
//!   contexts/projects.json
//!   notes/YYYY-MM.json
//!   planning/periods.json
//!   planning/tickets.json
//!   milestones.json
//! ```
//!
//! Reads never fail: a missing or malformed document yields the caller's default.
//! Writes replace the whole document. There is no locking, so concurrent writers race
//! and the last full snapshot written wins.

pub mod archive;
pub mod contexts;
pub mod milestones;
pub mod notes;
pub mod planning;
pub mod types;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

use types::Config;

/// Handle to one data directory. Cheap to clone; holds no open files.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// `root` is the `.data` directory itself, not the user-facing data folder.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn contexts_dir(&self) -> PathBuf {
        self.root.join("contexts")
    }

    pub fn teams_path(&self) -> PathBuf {
        self.contexts_dir().join("teams.json")
    }

    pub fn projects_path(&self) -> PathBuf {
        self.contexts_dir().join("projects.json")
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.root.join("notes")
    }

    /// Monthly partition holding notes created at `created`.
    pub fn notes_partition(&self, created: DateTime<Utc>) -> PathBuf {
        self.notes_dir()
            .join(format!("{:04}-{:02}.json", created.year(), created.month()))
    }

    pub fn planning_dir(&self) -> PathBuf {
        self.root.join("planning")
    }

    pub fn periods_path(&self) -> PathBuf {
        self.planning_dir().join("periods.json")
    }

    pub fn tickets_path(&self) -> PathBuf {
        self.planning_dir().join("tickets.json")
    }

    pub fn milestones_path(&self) -> PathBuf {
        self.root.join("milestones.json")
    }

    /// True once the data directory and its config document exist.
    pub fn exists(&self) -> bool {
        self.root.is_dir() && self.config_path().exists()
    }

    /// Create the directory structure and, if no config exists yet, a default config
    /// plus empty teams/projects documents. Returns the effective config.
    pub fn initialize(&self) -> Result<Config> {
        for dir in [self.root.clone(), self.contexts_dir(), self.notes_dir(), self.planning_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }

        if let Some(existing) = read_document::<Option<Config>>(&self.config_path(), None) {
            return Ok(existing);
        }

        let config = Config::new();
        write_document(&self.config_path(), &config)?;
        write_document(&self.teams_path(), &types::Teams::new())?;
        write_document(&self.projects_path(), &types::Projects::new())?;

        tracing::info!(root = %self.root.display(), "storage initialized");
        Ok(config)
    }

    /// Initialize only when the store has never been set up.
    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.exists() {
            self.initialize()?;
        }
        Ok(())
    }
}

/// Read and parse a JSON document, falling back to `default` when the file is absent or
/// cannot be parsed.
pub fn read_document<T: DeserializeOwned>(path: &Path, default: T) -> T {
    if !path.exists() {
        return default;
    }
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read document");
            return default;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to parse document");
            default
        }
    }
}

/// Serialize `value` with two-space indentation and overwrite `path`, creating parent
/// directories as needed.
pub fn write_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("failed to serialize document")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Current time as an RFC 3339 UTC string with millisecond precision.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored or user-supplied timestamp. Accepts RFC 3339 and bare `YYYY-MM-DD`
/// (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Generate a `<prefix>-<unix millis>` id, bumping the number until `taken` reports it
/// free.
pub(crate) fn timestamp_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut millis = Utc::now().timestamp_millis();
    loop {
        let id = format!("{prefix}-{millis}");
        if !taken(&id) {
            return id;
        }
        millis += 1;
    }
}
