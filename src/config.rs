// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::model::Language;
use crate::storage::AlarmStorage;
use anyhow::{Context, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;

fn default_true() -> bool {
    true
}
fn default_snooze() -> u32 {
    5
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_fire_grace() -> u32 {
    10
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default = "default_snooze")]
    pub default_snooze_minutes: u32,
    #[serde(default = "default_true")]
    pub default_vibrate: bool,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// A trigger missed by more than this many minutes is skipped, not fired.
    #[serde(default = "default_fire_grace")]
    pub fire_grace_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_snooze_minutes: 5,
            default_vibrate: true,
            language: Language::default(),
            log_level: "info".to_string(),
            fire_grace_minutes: 10,
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        // A missing file keeps its io::Error (NotFound) in the chain.
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// True when `err` comes from a config file that does not exist.
    pub fn is_missing_config_error(err: &Error) -> bool {
        err.chain().any(|cause| {
            cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
        })
    }

    /// Writes `config.toml` under the same lock-and-rename scheme as the alarm file.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        let toml_str = toml::to_string_pretty(self)?;
        AlarmStorage::with_lock(&path, || AlarmStorage::atomic_write(&path, &toml_str))
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info)
    }
}
