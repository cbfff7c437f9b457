use crate::core::DEFAULT_SETTLE_INTERVAL_MS;
use crate::hardware::{CommError, CommResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Longest settle interval accepted (milliseconds)
pub const MAX_SETTLE_INTERVAL_MS: u64 = 10_000;

/// Driver tuning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Wait between sending a command and draining the reply (milliseconds).
    /// Zero skips the wait, which is only useful against a mock channel.
    pub settle_interval_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            settle_interval_ms: DEFAULT_SETTLE_INTERVAL_MS,
        }
    }
}

impl DriverConfig {
    /// Zero settle interval for unit tests against a mock channel
    pub fn for_tests() -> Self {
        Self { settle_interval_ms: 0 }
    }

    pub fn with_settle_interval_ms(mut self, settle_interval_ms: u64) -> Self {
        self.settle_interval_ms = settle_interval_ms;
        self
    }

    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval_ms)
    }

    pub fn validate(&self) -> CommResult<()> {
        if self.settle_interval_ms > MAX_SETTLE_INTERVAL_MS {
            return Err(CommError::ConfigurationError {
                parameter: "settle_interval_ms".to_string(),
                value: self.settle_interval_ms.to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> CommResult<Self> {
        let config: DriverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> CommResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CommResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> CommResult<()> {
        self.validate()?;
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}
