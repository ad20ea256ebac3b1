//! TOML configuration.
//!
//! Every field is optional; missing values fall back to the defaults, which
//! reproduce the classic demo: `date` x50 and `headers` x30 against
//! jsontest.com, plus 30 ticks of 500 ms.
//!
//! ```toml
//! request_timeout_ms = 10000
//!
//! [ticker]
//! ticks = 30
//! interval_ms = 500
//!
//! [[workers]]
//! name = "date"
//! url = "http://date.jsontest.com"
//! repeat = 50
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::Ticker;
use crate::domain::WorkerSpec;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanoutConfig {
    /// Per-request timeout. `None` waits forever.
    pub request_timeout_ms: Option<u64>,
    pub ticker: TickerConfig,
    pub workers: Vec<WorkerSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    /// 0 disables the ticker.
    pub ticks: u32,
    pub interval_ms: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            ticks: 30,
            interval_ms: 500,
        }
    }
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: None,
            ticker: TickerConfig::default(),
            workers: vec![
                WorkerSpec::new("date", "http://date.jsontest.com", 50),
                WorkerSpec::new("headers", "http://headers.jsontest.com", 30),
            ],
        }
    }
}

impl FanoutConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "failed to read config");
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Self::from_toml_str(&content).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "failed to parse config");
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn ticker(&self) -> Ticker {
        Ticker::new(self.ticker.ticks, Duration::from_millis(self.ticker.interval_ms))
    }
}
