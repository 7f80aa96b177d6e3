//! Engine configuration.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or adjusting an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid log timestamp format '{0}'")]
    InvalidTimestampFormat(String),
}

/// Tunables shared by the executor, the scheduler and the logging observer.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use waybill::config::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{ "forced_marker": "ADMIN" }"#).unwrap();
/// assert_eq!(config.forced_marker, "ADMIN");
/// assert_eq!(config.timeout_error_key, "timeout_error");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tag put in the details of forced transitions
    pub forced_marker: String,
    /// Metadata key a failed deferred transition is recorded under
    pub timeout_error_key: String,
    /// `chrono` format string used by the logging observer
    pub log_timestamp_format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            forced_marker: "FORCED".to_string(),
            timeout_error_key: "timeout_error".to_string(),
            log_timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document, rejecting timestamp formats chrono cannot render.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        check_timestamp_format(&config.log_timestamp_format)?;
        Ok(config)
    }

    pub fn with_forced_marker(mut self, marker: impl Into<String>) -> Self {
        self.forced_marker = marker.into();
        self
    }

    pub fn with_timeout_error_key(mut self, key: impl Into<String>) -> Self {
        self.timeout_error_key = key.into();
        self
    }

    pub fn with_log_timestamp_format(
        mut self,
        format: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let format = format.into();
        check_timestamp_format(&format)?;
        self.log_timestamp_format = format;
        Ok(self)
    }
}

fn check_timestamp_format(format: &str) -> Result<(), ConfigError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidTimestampFormat(format.to_string()));
    }
    Ok(())
}
