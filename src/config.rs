use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::session::SessionOptions;

pub const CONFIG_PATH_ENV: &str = "INTERVIEWMATE_CONFIG";
pub const DATA_DIR_ENV: &str = "INTERVIEWMATE_DATA_DIR";
pub const DEBUG_ENV: &str = "INTERVIEWMATE_DEBUG";

const DATABASE_FILE: &str = "interviewmate.sqlite3";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub store: StoreBackend,
    pub tick_interval_ms: u64,
    pub heartbeat_every_ticks: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".interviewmate"),
            store: StoreBackend::Sqlite,
            tick_interval_ms: 1000,
            heartbeat_every_ticks: 5,
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file yields defaults, an unreadable body is
    /// replaced by defaults with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Ok(serde_json::from_str(&contents).unwrap_or_else(|err| {
            log::warn!(
                "Ignoring malformed config {}: {}; using defaults",
                path.display(),
                err
            );
            Self::default()
        }))
    }

    pub fn from_env() -> Result<Self> {
        let data_dir = env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        let config_path = env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                data_dir
                    .clone()
                    .unwrap_or_else(|| Self::default().data_dir)
                    .join("config.json")
            });
        let debug = env::var(DEBUG_ENV)
            .map(|value| is_truthy(&value))
            .unwrap_or(false);

        Ok(Self::load(&config_path)?.with_overrides(data_dir, debug))
    }

    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, debug: bool) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }
        if debug {
            self.heartbeat_every_ticks = 1;
        }
        self
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            tick_interval: Duration::from_millis(self.tick_interval_ms.max(1)),
            heartbeat_every_ticks: self.heartbeat_every_ticks,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true")
}
