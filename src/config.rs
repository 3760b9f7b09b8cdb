//! Configuration loading and management

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default "thinking" delay before each reply, in milliseconds
const DEFAULT_REPLY_DELAY_MS: RangeInclusive<u64> = 800..=2000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("HOME is not set and FOODBOT_DATA_DIR was not given")]
    NoHome,

    #[error("invalid {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Daemon configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Fixed seed for replies and order ids
    pub seed: Option<u64>,

    /// Simulated typing delay applied before each reply
    pub reply_delay: RangeInclusive<Duration>,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match lookup("FOODBOT_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = lookup("HOME").ok_or(ConfigError::NoHome)?;
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("foodbot")
            }
        };

        let socket_path = lookup("FOODBOT_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("daemon.sock"));

        let seed = lookup("FOODBOT_SEED")
            .map(|value| {
                value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    var: "FOODBOT_SEED",
                    value,
                    reason: "expected an unsigned integer",
                })
            })
            .transpose()?;

        let delay_ms = match lookup("FOODBOT_REPLY_DELAY_MS") {
            Some(value) => parse_delay_range(&value)?,
            None => DEFAULT_REPLY_DELAY_MS,
        };
        let reply_delay =
            Duration::from_millis(*delay_ms.start())..=Duration::from_millis(*delay_ms.end());

        Ok(Self {
            socket_path,
            data_dir,
            seed,
            reply_delay,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

/// Parse "min-max" or a single "n" into a millisecond range
fn parse_delay_range(value: &str) -> Result<RangeInclusive<u64>, ConfigError> {
    let invalid = |reason| ConfigError::Invalid {
        var: "FOODBOT_REPLY_DELAY_MS",
        value: value.to_string(),
        reason,
    };

    let (min, max) = match value.trim().split_once('-') {
        Some((min, max)) => (min.trim(), max.trim()),
        None => (value.trim(), value.trim()),
    };

    let min: u64 = min.parse().map_err(|_| invalid("expected min-max in milliseconds"))?;
    let max: u64 = max.parse().map_err(|_| invalid("expected min-max in milliseconds"))?;
    if min > max {
        return Err(invalid("min is greater than max"));
    }

    Ok(min..=max)
}
