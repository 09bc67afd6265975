use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable that redirects the on-disk store. The shell passes it to the
/// dashboard child process and writes it into the agent registration file.
pub const DATA_PATH_ENV: &str = "CONTEXTBUDDY_DATA_PATH";

/// Name of the directory holding the JSON documents inside the data folder.
pub const DATA_DIR_NAME: &str = ".data";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub web: WebConfig,
    pub shell: ShellConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Folder the user picked; documents live in `<data_path>/.data/`.
    pub data_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    /// Dashboard assets. Empty means the `web/` folder found next to the executable.
    pub web_root: String,
    pub debounce_ms: u64,
    pub keepalive_secs: u64,
    /// Mount the MCP tools over streamable HTTP at `/mcp`.
    pub mcp_endpoint: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ShellConfig {
    pub grace_period_ms: u64,
    pub settings_path: String,
    pub registration_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            web: WebConfig::default(),
            shell: ShellConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: default_app_dir().to_string_lossy().into_owned(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3333,
            web_root: String::new(),
            debounce_ms: 100,
            keepalive_secs: 30,
            mcp_endpoint: true,
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        let settings_path = dirs::config_dir()
            .unwrap_or_else(default_app_dir)
            .join("ContextBuddy")
            .join("config.json")
            .to_string_lossy()
            .into_owned();
        let registration_path = home_dir().join(".mcp.json").to_string_lossy().into_owned();
        Self {
            grace_period_ms: 1000,
            settings_path,
            registration_path,
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Returns `~/.contextbuddy/`
pub fn default_app_dir() -> PathBuf {
    home_dir().join(".contextbuddy")
}

/// Returns the default config file path: `~/.contextbuddy/config.toml`
pub fn default_config_path() -> PathBuf {
    default_app_dir().join("config.toml")
}

impl AppConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            AppConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (CONTEXTBUDDY_DATA_PATH, CONTEXTBUDDY_LOG_LEVEL,
    /// CONTEXTBUDDY_PORT or PORT, CONTEXTBUDDY_WEB_ROOT).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(DATA_PATH_ENV) {
            self.storage.data_path = val;
        }
        if let Ok(val) = std::env::var("CONTEXTBUDDY_LOG_LEVEL") {
            self.server.log_level = val;
        }
        let port = std::env::var("CONTEXTBUDDY_PORT").or_else(|_| std::env::var("PORT"));
        if let Some(port) = port.ok().and_then(|p| p.parse().ok()) {
            self.web.port = port;
        }
        if let Ok(val) = std::env::var("CONTEXTBUDDY_WEB_ROOT") {
            self.web.web_root = val;
        }
    }

    /// The data folder with `~` expanded.
    pub fn resolved_data_path(&self) -> PathBuf {
        expand_tilde(&self.storage.data_path)
    }

    /// Directory holding the JSON documents: `<data_path>/.data`.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.resolved_data_path().join(DATA_DIR_NAME)
    }

    pub fn resolved_web_root(&self) -> PathBuf {
        if !self.web.web_root.is_empty() {
            return expand_tilde(&self.web.web_root);
        }
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        find_web_root(&exe_dir)
    }

    pub fn dashboard_url(&self) -> String {
        format!("http://{}:{}", self.web.host, self.web.port)
    }
}

/// The nearest `web/` holding an `index.html`, searching `start` and then its parents.
/// Falls back to `start/web`.
fn find_web_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .map(|dir| dir.join("web"))
        .find(|dir| dir.join("index.html").is_file())
        .unwrap_or_else(|| start.join("web"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        home_dir().join(rest)
    } else {
        PathBuf::from(path)
    }
}
