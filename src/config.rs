// Configuration file handling (~/.deltatask/rc)
//
// The rc file holds `key=value` lines. Blank lines and lines starting with `#`
// are ignored, as are unknown keys.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".deltatask";
const RC_FILE: &str = "rc";
const DEFAULT_DB_FILE: &str = "todos.db";

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Path of the SQLite database file
    pub data_location: PathBuf,
    /// Delete policy used when the caller does not pick one
    pub cascade_delete: bool,
}

impl Config {
    /// Directory holding the rc file and the default database
    pub fn app_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Failed to determine home directory")?;
        Ok(home.join(APP_DIR))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join(RC_FILE))
    }

    /// Load configuration from the rc file, or defaults if it does not exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let app_dir = Self::app_dir()?;

        if !config_path.exists() {
            return Ok(Self::defaults(&app_dir));
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        Self::parse(&content, &app_dir)
    }

    fn defaults(app_dir: &Path) -> Self {
        Self {
            data_location: app_dir.join(DEFAULT_DB_FILE),
            cascade_delete: true,
        }
    }

    /// Parse rc file content; relative paths resolve against `base_dir`
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let mut config = Self::defaults(base_dir);

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Ignoring malformed config line {}: {}", line_no + 1, line);
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "data.location" => {
                    let path = PathBuf::from(value);
                    config.data_location = if path.is_relative() {
                        base_dir.join(path)
                    } else {
                        path
                    };
                }
                "delete.cascade" => {
                    config.cascade_delete = parse_bool(value).with_context(|| {
                        format!("Invalid value for delete.cascade on line {}: '{}'", line_no + 1, value)
                    })?;
                }
                other => {
                    log::debug!("Ignoring unknown config key '{}'", other);
                }
            }
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("expected true or false"),
    }
}
