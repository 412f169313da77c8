//! Configuration file support for FitGlass.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fitglass/config.toml`,
//! or from the path in `FITGLASS_CONFIG` when that is set.

use crate::{Error, LogPatch, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "FITGLASS_CONFIG";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub summary: SummaryConfig,
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

/// Upper bounds applied to entered values before they are saved
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_max_calories")]
    pub max_calories: u32,

    #[serde(default = "default_max_protein")]
    pub max_protein: u32,

    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_calories: default_max_calories(),
            max_protein: default_max_protein(),
            max_steps: default_max_steps(),
        }
    }
}

impl InputConfig {
    /// Clamp every set field of a patch to its configured maximum
    pub fn clamp(&self, patch: LogPatch) -> LogPatch {
        LogPatch {
            calories: patch
                .calories
                .map(|v| clamp_field("calories", v, self.max_calories)),
            protein: patch
                .protein
                .map(|v| clamp_field("protein", v, self.max_protein)),
            steps: patch.steps.map(|v| clamp_field("steps", v, self.max_steps)),
            hiit: patch.hiit,
        }
    }
}

fn clamp_field(field: &str, value: u32, max: u32) -> u32 {
    if value > max {
        tracing::warn!("{} value {} exceeds maximum, clamped to {}", field, value, max);
        max
    } else {
        value
    }
}

/// Rolling-average windows for summaries
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_short_window_days")]
    pub short_window_days: usize,

    #[serde(default = "default_long_window_days")]
    pub long_window_days: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            short_window_days: default_short_window_days(),
            long_window_days: default_long_window_days(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("fitglass")
}

fn default_max_calories() -> u32 {
    10_000
}

fn default_max_protein() -> u32 {
    500
}

fn default_max_steps() -> u32 {
    100_000
}

fn default_short_window_days() -> usize {
    7
}

fn default_long_window_days() -> usize {
    30
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }

        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("fitglass").join("config.toml")
    }

    /// Reject settings that would make summaries meaningless
    pub fn validate(&self) -> Result<()> {
        if self.summary.short_window_days == 0 || self.summary.long_window_days == 0 {
            return Err(Error::Config(
                "summary windows must be at least one day".into(),
            ));
        }
        Ok(())
    }
}
