//! Shared error types

use thiserror::Error;

/// Errors raised while loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    NoConfigDir,

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors raised by the emulator state machine
#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("emulator is not running")]
    NotRunning,
}

pub type Result<T> = std::result::Result<T, EmulatorError>;
