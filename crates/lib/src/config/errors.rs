//! Error types for node configuration.

use thiserror::Error;

/// Structured error types for configuration handling.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An override supplied a value the option cannot hold
    #[error("Invalid config option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },
}

impl ConfigError {
    /// Check if this error was caused by a rejected option value
    pub fn is_invalid_option(&self) -> bool {
        matches!(self, ConfigError::InvalidOption { .. })
    }

    /// Get the option key this error refers to
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidOption { key, .. } => Some(key),
        }
    }
}

// Conversion from ConfigError to the main Error type
impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err)
    }
}
