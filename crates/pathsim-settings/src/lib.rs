//! PathSim Settings Crate
//!
//! Loads, validates and persists the simulation defaults.

pub mod config;
pub mod error;

pub use config::{ConfigFormat, SimulationConfig};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
