//! Emulator configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Log verbosity selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// CPU execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Use the dynamic translator; falls back to the interpreter when false
    pub jit: bool,
    /// Maximum guest instructions per translated block
    pub jit_max_block: u32,
    /// Cross-check every natively translated instruction against the
    /// interpreter and log divergence
    pub verify: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            jit: true,
            jit_max_block: 3000,
            verify: false,
        }
    }
}

/// Debug and logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
    pub log_to_file: bool,
    pub log_path: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_to_file: false,
            log_path: PathBuf::from("oxidized-espresso.log"),
        }
    }
}

/// Top-level emulator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cpu: CpuConfig,
    pub debug: DebugConfig,
}

impl Config {
    /// Path of the user configuration file
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("oxidized-espresso").join("config.toml"))
    }

    /// Load configuration from the user config directory
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Save configuration to the user config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.cpu.jit);
        assert_eq!(config.cpu.jit_max_block, 3000);
        assert!(!config.cpu.verify);
        assert_eq!(config.debug.log_level, LogLevel::Info);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let mut config = Config::default();
        config.cpu.jit = false;
        config.debug.log_level = LogLevel::Trace;

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert!(!parsed.cpu.jit);
        assert_eq!(parsed.debug.log_level, LogLevel::Trace);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("[cpu]\njit = false\n").unwrap();
        assert!(!parsed.cpu.jit);
        assert_eq!(parsed.cpu.jit_max_block, 3000);
    }
}
