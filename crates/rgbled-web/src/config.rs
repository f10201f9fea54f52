//! Configuration management.

use anyhow::{Context, Result};
use rgbled_hw::LinkSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server listen address (e.g., "127.0.0.1:8501")
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Serial link configuration
    #[serde(default)]
    pub serial: SerialConfig,
}

/// Serial device configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Directory scanned for devices
    #[serde(default = "default_device_dir")]
    pub device_dir: String,

    /// Device name prefix
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Delay after opening the port in milliseconds
    #[serde(default = "default_settle")]
    pub settle_ms: u64,

    /// Read timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

impl SerialConfig {
    /// Returns the link settings for the session.
    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            baud_rate: self.baud_rate,
            settle_delay: Duration::from_millis(self.settle_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device_dir: default_device_dir(),
            prefix: default_prefix(),
            baud_rate: default_baud_rate(),
            settle_ms: default_settle(),
            timeout_ms: default_timeout(),
        }
    }
}

// Default value functions
fn default_listen() -> String {
    "127.0.0.1:8501".to_string()
}

fn default_device_dir() -> String {
    rgbled_hw::DEVICE_DIR.to_string()
}

fn default_prefix() -> String {
    rgbled_hw::DEVICE_PREFIX.to_string()
}

fn default_baud_rate() -> u32 {
    rgbled_hw::BAUD_RATE
}

fn default_settle() -> u64 {
    rgbled_hw::SETTLE_DELAY_MS
}

fn default_timeout() -> u64 {
    rgbled_hw::READ_TIMEOUT_MS
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Loads configuration, falling back to defaults when the file is missing.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            warn!(
                "Configuration file {:?} not found, using defaults",
                path.as_ref()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            serial: SerialConfig::default(),
        }
    }
}
