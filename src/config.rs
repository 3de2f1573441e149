//! Service configuration
//!
//! All capacities are fixed at service start; there is no runtime
//! reconfiguration. Configuration is a small TOML file loaded either from
//! an explicit path or from the platform config directory
//! (`<config_dir>/rtscope/rtscope.toml`).

use crate::error::{Result, ResultExt, ScopeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for the config directory
pub const APP_ID: &str = "rtscope";

/// Config filename inside the app config directory
pub const CONFIG_FILE: &str = "rtscope.toml";

/// Default listening port
pub const DEFAULT_PORT: u16 = 27267;

/// Default number of capture channels
pub const DEFAULT_CHANNEL_COUNT: usize = 4;

/// Default sample ring capacity
pub const DEFAULT_SAMPLE_CAPACITY: usize = 100;

/// Default control-cycle period in microseconds
pub const DEFAULT_CYCLE_PERIOD_US: u64 = 1000;

/// Default expected control word ("SCOP")
pub const DEFAULT_CONTROL_WORD: i64 = 0x53434F50;

/// Service configuration, fixed at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// TCP port the command server listens on (0 = ephemeral)
    pub port: u16,

    /// Capacity of the channel table
    pub channel_count: usize,

    /// Capacity of the sample ring
    pub sample_capacity: usize,

    /// Control-cycle period in microseconds
    pub cycle_period_us: u64,

    /// Process identity every request must carry
    pub control_word: i64,

    /// Optional directory for file logging (stdout only when unset)
    pub log_dir: Option<PathBuf>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            channel_count: DEFAULT_CHANNEL_COUNT,
            sample_capacity: DEFAULT_SAMPLE_CAPACITY,
            cycle_period_us: DEFAULT_CYCLE_PERIOD_US,
            control_word: DEFAULT_CONTROL_WORD,
            log_dir: None,
        }
    }
}

impl ScopeConfig {
    /// Control-cycle period as a duration
    pub fn cycle_period(&self) -> Duration {
        Duration::from_micros(self.cycle_period_us)
    }

    /// Check the capacities before starting the service
    pub fn validate(&self) -> Result<()> {
        if self.channel_count == 0 {
            return Err(ScopeError::Config("channel_count must be at least 1".to_string()));
        }
        if self.sample_capacity == 0 {
            return Err(ScopeError::Config("sample_capacity must be at least 1".to_string()));
        }
        if self.cycle_period_us == 0 {
            return Err(ScopeError::Config("cycle_period_us must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(ScopeError::Io)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: ScopeConfig = toml::from_str(&contents)
            .map_err(|e| ScopeError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ScopeError::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)
            .map_err(ScopeError::Io)
            .with_context(|| format!("failed to write {}", path.display()))
    }

    /// Path of the default config file, if a config directory exists
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|p| p.join(APP_ID).join(CONFIG_FILE))
    }

    /// Load the default config file, falling back to defaults
    pub fn load_or_default() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => match Self::load(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("failed to load {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = ScopeConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.channel_count, DEFAULT_CHANNEL_COUNT);
        assert_eq!(config.sample_capacity, DEFAULT_SAMPLE_CAPACITY);
        assert_eq!(config.cycle_period(), Duration::from_millis(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacities() {
        let mut config = ScopeConfig::default();
        config.sample_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = ScopeConfig::default();
        config.channel_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rtscope.toml");

        let mut config = ScopeConfig::default();
        config.port = 5000;
        config.sample_capacity = 32;
        config.save(&path).unwrap();

        let loaded = ScopeConfig::load(&path).unwrap();
        assert_eq!(loaded.port, 5000);
        assert_eq!(loaded.sample_capacity, 32);
        assert_eq!(loaded.control_word, DEFAULT_CONTROL_WORD);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rtscope.toml");
        std::fs::write(&path, "port = 5000\n").unwrap();

        let loaded = ScopeConfig::load(&path).unwrap();
        assert_eq!(loaded.port, 5000);
        assert_eq!(loaded.channel_count, DEFAULT_CHANNEL_COUNT);
    }

    #[test]
    fn test_load_missing_file_names_the_path() {
        let err = ScopeConfig::load("/nonexistent/rtscope.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read /nonexistent/rtscope.toml"));
    }
}
