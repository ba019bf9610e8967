//! Configuration file support for Ovia.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/ovia/config.toml`.

use crate::types::MAX_CYCLE_LENGTH;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Constants driving the cycle and pregnancy calculations.
///
/// The defaults describe a textbook cycle: 28 days long, a 5 day period,
/// ovulation 14 days before the next cycle and a 5 day fertile window
/// around it. Pregnancy runs 280 days from the last menstrual period.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Used when a stored cycle length is missing or not a number
    #[serde(default = "default_cycle_length")]
    pub default_cycle_length: u32,

    /// Used when a stored period duration is missing or not a number
    #[serde(default = "default_period_duration")]
    pub default_period_duration: u32,

    /// Days from ovulation to the start of the next cycle
    #[serde(default = "default_luteal_phase_days")]
    pub luteal_phase_days: u32,

    /// Days on each side of ovulation included in the fertile window
    #[serde(default = "default_fertile_window_radius")]
    pub fertile_window_radius: u32,

    /// Full-term pregnancy length, counted from the LMP
    #[serde(default = "default_pregnancy_term_days")]
    pub pregnancy_term_days: u32,

    /// How many cycles to project forward from the last period
    #[serde(default = "default_projection_cycles")]
    pub projection_cycles: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_cycle_length: default_cycle_length(),
            default_period_duration: default_period_duration(),
            luteal_phase_days: default_luteal_phase_days(),
            fertile_window_radius: default_fertile_window_radius(),
            pregnancy_term_days: default_pregnancy_term_days(),
            projection_cycles: default_projection_cycles(),
        }
    }
}

/// Upper bound for `projection_cycles`
pub const MAX_PROJECTION_CYCLES: usize = 120;
/// Upper bound for `pregnancy_term_days`
pub const MAX_PREGNANCY_TERM_DAYS: u32 = 366;

impl EngineConfig {
    /// Check that the constants can drive a projection at all
    pub fn validate(&self) -> Result<()> {
        check_range("default_cycle_length", self.default_cycle_length, 1, MAX_CYCLE_LENGTH)?;
        check_range("default_period_duration", self.default_period_duration, 0, MAX_CYCLE_LENGTH)?;
        check_range("luteal_phase_days", self.luteal_phase_days, 0, MAX_CYCLE_LENGTH)?;
        check_range("fertile_window_radius", self.fertile_window_radius, 0, MAX_CYCLE_LENGTH)?;
        check_range("pregnancy_term_days", self.pregnancy_term_days, 1, MAX_PREGNANCY_TERM_DAYS)?;
        if self.projection_cycles == 0 || self.projection_cycles > MAX_PROJECTION_CYCLES {
            return Err(Error::Config(format!(
                "projection_cycles must be between 1 and {}",
                MAX_PROJECTION_CYCLES
            )));
        }
        Ok(())
    }
}

fn check_range(name: &str, value: u32, min: u32, max: u32) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )))
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ovia")
}

fn default_cycle_length() -> u32 {
    28
}

fn default_period_duration() -> u32 {
    5
}

fn default_luteal_phase_days() -> u32 {
    14
}

fn default_fertile_window_radius() -> u32 {
    2
}

fn default_pregnancy_term_days() -> u32 {
    280
}

fn default_projection_cycles() -> usize {
    12
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.engine.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ovia")
            .join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
