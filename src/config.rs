// Configuration from ~/.shopclock/rc
//
// One `key=value` per line; blank lines and `#` comments are ignored.

use crate::engine::{LockPolicy, TickMode};
use crate::engine::tick::DEFAULT_TICK_MS;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_location: PathBuf,
    pub lock: LockPolicy,
    pub tick_ms: u64,
    pub tick_mode: TickMode,
}

impl Config {
    /// Directory holding the rc file and the default database
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Home directory not found")?;
        Ok(home.join(".shopclock"))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("rc"))
    }

    /// Get the default database path
    pub fn default_data_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("state.db"))
    }

    /// Defaults with the database at `data_location`
    pub fn with_data_location(data_location: PathBuf) -> Self {
        Self {
            data_location,
            lock: LockPolicy::default(),
            tick_ms: DEFAULT_TICK_MS,
            tick_mode: TickMode::default(),
        }
    }

    /// Load the rc file if present, otherwise defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let defaults = Self::with_data_location(Self::default_data_path()?);

        if !config_path.exists() {
            return Ok(defaults);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
        let rc_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::parse(&content, rc_dir, defaults))
    }

    /// Apply rc `content` on top of `defaults`. Relative data paths resolve against `rc_dir`.
    pub fn parse(content: &str, rc_dir: &Path, defaults: Config) -> Self {
        let mut config = defaults;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Ignoring malformed config line: {}", line);
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "data.location" => {
                    let path = PathBuf::from(value);
                    config.data_location = if path.is_relative() { rc_dir.join(path) } else { path };
                }
                "lock.timeout_ms" => set_parsed(&mut config.lock.timeout_ms, key, value),
                "lock.poll_ms" => set_parsed(&mut config.lock.poll_ms, key, value),
                "interaction.throttle_ms" => set_parsed(&mut config.lock.throttle_ms, key, value),
                "tick.ms" => set_parsed(&mut config.tick_ms, key, value),
                "tick.mode" => match TickMode::from_str(value) {
                    Some(mode) => config.tick_mode = mode,
                    None => log::warn!("Ignoring invalid tick.mode '{}' (expected all or first)", value),
                },
                _ => log::warn!("Ignoring unknown config key: {}", key),
            }
        }

        config
    }
}

fn set_parsed<T: std::str::FromStr>(target: &mut T, key: &str, value: &str) {
    match value.parse::<T>() {
        Ok(v) => *target = v,
        Err(_) => log::warn!("Ignoring invalid value for {}: '{}'", key, value),
    }
}
