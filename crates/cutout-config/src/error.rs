//! # Design
//!
//! - Constant-message errors with the variable name and offending value as context.
//! - Validation failures are fatal at startup; there is no partial configuration.

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors produced while resolving configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that failed parsing or validation.
    #[error("invalid configuration value")]
    InvalidValue {
        /// Environment variable name.
        name: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl ConfigError {
    pub(crate) const fn invalid(
        name: &'static str,
        reason: &'static str,
        value: Option<String>,
    ) -> Self {
        Self::InvalidValue {
            name,
            reason,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_carries_context() {
        let err = ConfigError::invalid("CUTOUT_HTTP_PORT", "failed to parse", Some("x".into()));
        let ConfigError::InvalidValue {
            name,
            reason,
            value,
        } = err;
        assert_eq!(name, "CUTOUT_HTTP_PORT");
        assert_eq!(reason, "failed to parse");
        assert_eq!(value.as_deref(), Some("x"));
    }
}
