//! Plugin configuration file (`config.json`).
//!
//! Holds the camera list and a few plugin-wide options. Saved atomically with
//! a `.bak` copy of the previous file, which is used when the main file is
//! missing or corrupt.

use crate::device::DeviceConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the user's config dir
const CONFIG_DIR_NAME: &str = "ptz-controls";
const CONFIG_FILE_NAME: &str = "config.json";

/// Host log levels, as stored in `debug_log_level`
pub const LOG_ERROR: i64 = 100;
pub const LOG_WARNING: i64 = 200;
pub const LOG_INFO: i64 = 300;
pub const LOG_DEBUG: i64 = 400;

/// Which scene drives the dock's current camera selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetMode {
    #[default]
    Preview,
    Program,
    /// Anything other than "preview" or "program"
    Manual,
}

impl From<String> for TargetMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "preview" => TargetMode::Preview,
            "program" => TargetMode::Program,
            _ => TargetMode::Manual,
        }
    }
}

impl From<TargetMode> for String {
    fn from(mode: TargetMode) -> Self {
        match mode {
            TargetMode::Preview => "preview",
            TargetMode::Program => "program",
            TargetMode::Manual => "manual",
        }
        .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default = "default_log_level")]
    pub debug_log_level: i64,
    #[serde(default)]
    pub target_mode: TargetMode,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

fn default_log_level() -> i64 {
    LOG_INFO
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            debug_log_level: LOG_INFO,
            target_mode: TargetMode::default(),
            devices: Vec::new(),
        }
    }
}

impl PluginConfig {
    /// Level the plugin's debug messages are emitted at.
    pub fn debug_level(&self) -> log::Level {
        let level = self.debug_log_level;
        if level <= LOG_ERROR {
            log::Level::Error
        } else if level <= LOG_WARNING {
            log::Level::Warn
        } else if level <= LOG_INFO {
            log::Level::Info
        } else {
            log::Level::Debug
        }
    }

    /// Emit `ptz_debug!` messages at the configured level. The logger's own
    /// filter is left alone.
    pub fn apply_debug_level(&self) {
        crate::logging::set_debug_level(self.debug_level());
    }
}

/// Returns the path to the config file: ~/.config/ptz-controls/config.json
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn backup_path(path: &Path) -> PathBuf {
    path.with_extension("json.bak")
}

/// Save the configuration to `path`.
/// Uses atomic writes (write to temp, then rename) to prevent corruption.
/// Keeps a .bak backup of the previous config.
pub fn save_config(path: &Path, config: &PluginConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    let contents =
        serde_json::to_string_pretty(config).context("Failed to serialize config to JSON")?;

    let tmp_path = path.with_extension("json.tmp");
    let bak_path = backup_path(path);

    fs::write(&tmp_path, &contents)
        .with_context(|| format!("Failed to write temp config file: {}", tmp_path.display()))?;

    if path.exists() {
        let _ = fs::remove_file(&bak_path);
        fs::rename(path, &bak_path)
            .with_context(|| format!("Failed to backup config file: {}", path.display()))?;
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to finalize config file: {}", path.display()))?;

    Ok(())
}

/// Load the configuration from `path`, or return defaults if it doesn't exist.
/// If the main file is corrupted, attempts to load from backup.
pub fn load_config(path: &Path) -> Result<PluginConfig> {
    let bak_path = backup_path(path);

    if !path.exists() {
        if bak_path.exists() {
            log::warn!("Main config missing, loading from backup: {}", bak_path.display());
            return load_from_path(&bak_path);
        }
        log::info!("No PTZ configuration found");
        return Ok(PluginConfig::default());
    }

    match load_from_path(path) {
        Ok(config) => Ok(config),
        Err(e) => {
            if bak_path.exists() {
                log::warn!("Main config corrupted ({:#}), loading from backup", e);
                return load_from_path(&bak_path);
            }
            Err(e)
        }
    }
}

fn load_from_path(path: &Path) -> Result<PluginConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
