use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ── Watch config ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory tree to observe. Relative paths are resolved against the
    /// process working directory at startup.
    pub path: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            path: ".".to_string(),
        }
    }
}

// ── Logger config ─────────────────────────────────────────────────────────────

/// Output format for log records.
///
/// | Format | Behaviour                                         |
/// |--------|---------------------------------------------------|
/// | `json` | One JSON object per line, machine-consumable.     |
/// | `text` | Compact human-readable lines for terminal use.    |
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// File rotation policy for the optional log file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Minimum level to emit: `trace`, `debug`, `info`, `warn` or `error`.
    /// The `RUST_LOG` environment variable takes precedence when set.
    pub level: String,
    /// Log to standard output (as well as to a file if one is set).
    pub stdout: bool,
    /// Log to this file path in addition to stdout. Empty disables file
    /// output. The parent directory must be writable.
    pub file: String,
    /// Rotation policy applied to the log file. Has no effect when `file`
    /// is empty.
    pub rotation: LogRotation,
    pub format: LogFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            stdout: true,
            file: String::new(),
            rotation: LogRotation::Never,
            format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub watch: WatchConfig,
    pub logger: LoggerConfig,
}

impl AppConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)?;
        }

        // Env override (takes precedence over the config file).
        if let Ok(dir) = env::var("FSAUDIT_WATCH") {
            if !dir.is_empty() {
                config.watch.path = dir;
            }
        }

        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    pub fn watch_path(&self) -> PathBuf {
        PathBuf::from(&self.watch.path)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
