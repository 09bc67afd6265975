//! Registration of the stdio MCP server in the agent's `~/.mcp.json`.
//!
//! Only the `mcpServers.contextbuddy` entry is touched; every other key in the file is
//! preserved. The previous file is copied to `<file>.backup` before each write.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::DATA_PATH_ENV;
use crate::storage::{read_document, write_document};

pub const SERVER_NAME: &str = "contextbuddy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl Registration {
    /// Launch `<exe> serve` against `data_path`.
    pub fn new(exe: &Path, data_path: &Path) -> Self {
        Self {
            command: exe.to_string_lossy().into_owned(),
            args: vec!["serve".into()],
            env: BTreeMap::from([(
                DATA_PATH_ENV.to_string(),
                data_path.to_string_lossy().into_owned(),
            )]),
        }
    }

    pub fn for_current_exe(data_path: &Path) -> Result<Self> {
        let exe = std::env::current_exe().context("failed to locate current executable")?;
        Ok(Self::new(&exe, data_path))
    }
}

pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".backup");
    PathBuf::from(name)
}

fn read_root(path: &Path) -> Map<String, Value> {
    match read_document::<Value>(path, Value::Null) {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => {
            tracing::warn!(path = %path.display(), "registration file is not a JSON object, starting fresh");
            Map::new()
        }
    }
}

fn take_servers(root: &mut Map<String, Value>) -> Map<String, Value> {
    match root.remove("mcpServers") {
        Some(Value::Object(servers)) => servers,
        _ => Map::new(),
    }
}

pub fn is_registered(path: &Path) -> bool {
    read_root(path)
        .get("mcpServers")
        .and_then(|s| s.get(SERVER_NAME))
        .is_some()
}

/// Add or replace our entry. Returns the backup path when a previous file existed.
pub fn register(path: &Path, registration: &Registration) -> Result<Option<PathBuf>> {
    let mut root = read_root(path);

    let backup = if path.exists() {
        let backup = backup_path(path);
        std::fs::copy(path, &backup)
            .with_context(|| format!("failed to back up {}", path.display()))?;
        tracing::info!(backup = %backup.display(), "backed up existing registration file");
        Some(backup)
    } else {
        None
    };

    let entry = serde_json::to_value(registration).context("failed to encode registration")?;
    let mut servers = take_servers(&mut root);
    servers.insert(SERVER_NAME.to_string(), entry);
    root.insert("mcpServers".into(), Value::Object(servers));
    write_document(path, &root)?;

    tracing::info!(path = %path.display(), "registered ContextBuddy with the agent");
    Ok(backup)
}

/// Remove our entry. Returns false when there was nothing to remove.
pub fn unregister(path: &Path) -> Result<bool> {
    let mut root = read_root(path);
    let mut servers = take_servers(&mut root);
    let removed = servers.remove(SERVER_NAME).is_some();
    if removed {
        root.insert("mcpServers".into(), Value::Object(servers));
        write_document(path, &root)?;
        tracing::info!(path = %path.display(), "removed ContextBuddy from the agent");
    }
    Ok(removed)
}
