//! Core configuration.
//!
//! # Responsibility
//! - Hold tunables for history depth and codec behavior.
//! - Parse them from JSON with per-field defaults.
//!
//! # Invariants
//! - Every field has a default; an empty JSON object is a valid config.
//! - `history.capacity` is at least 1 after successful parsing.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Undo depth used when no config overrides it.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Top-level core configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub history: HistoryConfig,
    pub codec: CodecOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Maximum number of kept snapshots, current state included.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Tree file codec switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecOptions {
    /// Load files written by newer versions instead of rejecting them.
    pub ignore_version: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidValue { field, reason } => {
                write!(f, "invalid config value `{field}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl CoreConfig {
    /// Parses a JSON config; absent keys keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "history.capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DEFAULT_HISTORY_CAPACITY};

    #[test]
    fn empty_object_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.history.capacity, DEFAULT_HISTORY_CAPACITY);
        assert!(!config.codec.ignore_version);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = CoreConfig::from_json_str(r#"{ "codec": { "ignore_version": true } }"#)
            .unwrap();
        assert!(config.codec.ignore_version);
        assert_eq!(config.history.capacity, DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = CoreConfig::from_json_str(r#"{ "history": { "capacity": 0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "history.capacity",
                ..
            }
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = CoreConfig::from_json_str(r#"{ "histroy": {} }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
