//! TOML configuration.
//!
//! ```toml
//! out_dir = "data"
//! period = "1y"
//!
//! [yahoo]
//! base_url = "https://query2.finance.yahoo.com/v8/finance/chart"
//! user_agent = "Mozilla/5.0"
//! timeout_secs = 30
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use crate::data::provider::DataError;
use crate::data::request::Period;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "pxfetch.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Directory exports are written to.
    pub out_dir: PathBuf,
    /// Lookback used when no dates are given.
    pub period: Period,
    pub yahoo: YahooConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            period: Period::default(),
            yahoo: YahooConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct YahooConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com/v8/finance/chart".into(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            timeout_secs: 30,
        }
    }
}

impl FetchConfig {
    /// Parse a config from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, DataError> {
        let config: Self = toml::from_str(s).map_err(|e| DataError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DataError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Load `path` if given, else `pxfetch.toml` if it exists, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, DataError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> Result<(), DataError> {
        if self.yahoo.timeout_secs == 0 {
            return Err(DataError::Config("yahoo.timeout_secs must be > 0".into()));
        }
        if self.yahoo.base_url.trim().is_empty() {
            return Err(DataError::Config("yahoo.base_url must not be empty".into()));
        }
        Ok(())
    }
}
