//! Core emulator logic shared by every oxidized-espresso crate.

pub mod config;
pub mod emulator;
pub mod error;
pub mod logging;

pub use config::Config;
pub use emulator::{Emulator, EmulatorState};
pub use error::{ConfigError, Result};
