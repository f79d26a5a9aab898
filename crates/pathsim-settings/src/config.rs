//! Simulation configuration
//!
//! Provides the defaults the simulation falls back to when a path element
//! leaves a kinematic limit unset, plus file I/O and validation.
//! Supports JSON and TOML file formats, selected by file extension.
//!
//! Exactly five options are recognized; unknown keys are rejected:
//! - `defaultMaxVelocity` (m/s)
//! - `defaultMaxAcceleration` (m/s²)
//! - `defaultMaxAngularVelocity` (rad/s)
//! - `defaultHandoffRadius` (m, 0 disables corner slowdown windows)
//! - `sampleTimeStepMs` (timeline sample spacing)

use crate::error::{ConfigError, ConfigResult, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name under the platform config directory
const APP_DIR: &str = "pathsim";
/// Default config file name
const CONFIG_FILE: &str = "simulation.json";

/// Config file encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Simulation defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Velocity limit for segments whose target leaves it unset (m/s)
    pub default_max_velocity: f64,
    /// Acceleration limit for segments whose target leaves it unset (m/s²)
    pub default_max_acceleration: f64,
    /// Turn-rate limit for heading anchors that leave it unset (rad/s)
    pub default_max_angular_velocity: f64,
    /// Corner slowdown radius for targets that leave it unset (m)
    pub default_handoff_radius: f64,
    /// Spacing of timeline samples (ms)
    pub sample_time_step_ms: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_max_velocity: 3.0,
            default_max_acceleration: 2.5,
            default_max_angular_velocity: std::f64::consts::PI,
            default_handoff_radius: 0.0,
            sample_time_step_ms: 20,
        }
    }
}

impl SimulationConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample spacing in seconds
    pub fn sample_time_step(&self) -> f64 {
        f64::from(self.sample_time_step_ms) / 1000.0
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = [
            ("defaultMaxVelocity", self.default_max_velocity),
            ("defaultMaxAcceleration", self.default_max_acceleration),
            ("defaultMaxAngularVelocity", self.default_max_angular_velocity),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::out_of_range(key, value));
            }
        }

        if !(self.default_handoff_radius.is_finite() && self.default_handoff_radius >= 0.0) {
            return Err(ConfigError::out_of_range(
                "defaultHandoffRadius",
                self.default_handoff_radius,
            ));
        }

        if self.sample_time_step_ms == 0 {
            return Err(ConfigError::out_of_range("sampleTimeStepMs", 0));
        }

        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(content: &str) -> SettingsResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        debug!("Saved simulation config to {}", path.display());

        Ok(())
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!(
                "No simulation config at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Platform-specific location of the default config file
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| {
                ConfigError::ConfigDirectory("platform config directory not found".to_string())
            })
    }
}
