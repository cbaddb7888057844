use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::{ConfigError, EngineConfig};

/// Durations persisted between runs. Only the timer's shape is saved;
/// engine state (phase, countdown, counters) is never written anywhere.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub work_secs: u32,
    pub short_rest_secs: u32,
    pub long_rest_secs: u32,
    pub cycles_per_long_rest: u32,
}

impl Default for Config {
    fn default() -> Self {
        EngineConfig::default().into()
    }
}

impl Config {
    /// Validates the stored durations into engine construction parameters.
    /// A hand-edited file can hold zeros, so this can fail even though
    /// `save` only ever writes validated values.
    pub fn to_engine_config(self) -> Result<EngineConfig, ConfigError> {
        EngineConfig::new(
            self.work_secs,
            self.short_rest_secs,
            self.long_rest_secs,
            self.cycles_per_long_rest,
        )
    }
}

impl From<EngineConfig> for Config {
    fn from(engine: EngineConfig) -> Self {
        Self {
            work_secs: engine.work_secs,
            short_rest_secs: engine.short_rest_secs,
            long_rest_secs: engine.long_rest_secs,
            cycles_per_long_rest: engine.cycles_per_long_rest,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "pomotime") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("pomotime_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
