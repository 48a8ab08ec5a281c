//! Application settings and configuration management

use crate::playback::{VolumeLevels, DEFAULT_DUCK_VOLUME, DEFAULT_NORMAL_VOLUME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Engine volume while another app holds transient, duckable focus
    #[serde(default = "default_duck_volume")]
    pub duck_volume: f32,
    /// Engine volume while focus is fully held
    #[serde(default = "default_normal_volume")]
    pub normal_volume: f32,
    /// Capacity of the command channel into the playback service
    #[serde(default = "default_command_buffer_size")]
    pub command_buffer_size: usize,
    /// Capacity of the observer update broadcast channel
    #[serde(default = "default_update_capacity")]
    pub update_capacity: usize,
    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_duck_volume() -> f32 {
    DEFAULT_DUCK_VOLUME
}

fn default_normal_volume() -> f32 {
    DEFAULT_NORMAL_VOLUME
}

fn default_command_buffer_size() -> usize {
    32
}

fn default_update_capacity() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error types for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            duck_volume: default_duck_volume(),
            normal_volume: default_normal_volume(),
            command_buffer_size: default_command_buffer_size(),
            update_capacity: default_update_capacity(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from a file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("focus-playback").join("config.json")
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("duck_volume", self.duck_volume), ("normal_volume", self.normal_volume)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }

        if self.duck_volume > self.normal_volume {
            return Err(ConfigError::Validation(
                "duck_volume cannot be louder than normal_volume".to_string(),
            ));
        }

        if self.command_buffer_size == 0 || self.update_capacity == 0 {
            return Err(ConfigError::Validation(
                "Channel capacities must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Engine volumes derived from these settings
    pub fn volumes(&self) -> VolumeLevels {
        VolumeLevels {
            duck: self.duck_volume,
            normal: self.normal_volume,
        }
    }
}
