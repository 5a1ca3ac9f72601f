//! # Design
//!
//! - Centralize application-level errors for the bootstrap sequence.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration resolution failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: cutout_config::ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: cutout_telemetry::TelemetryError,
    },
    /// Scratch storage could not be initialised.
    #[error("scratch storage operation failed")]
    Storage {
        /// Operation identifier.
        operation: &'static str,
        /// Source engine error.
        source: cutout_engine::EngineError,
    },
    /// API server operations failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: cutout_api::ApiServerError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: cutout_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: cutout_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn storage(
        operation: &'static str,
        source: cutout_engine::EngineError,
    ) -> Self {
        Self::Storage { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: cutout_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "config.from_env",
            cutout_config::ConfigError::InvalidValue {
                name: "CUTOUT_HTTP_PORT",
                reason: "failed to parse",
                value: Some("bad".to_string()),
            },
        );
        assert!(matches!(config, AppError::Config { .. }));

        let telemetry = AppError::telemetry(
            "telemetry.init",
            cutout_telemetry::TelemetryError::SubscriberInit {
                message: "already installed".to_string(),
            },
        );
        assert!(matches!(telemetry, AppError::Telemetry { .. }));

        let storage = AppError::storage(
            "scratch.ensure_directories",
            cutout_engine::EngineError::StorageInit {
                operation: "create_dir_all",
                path: "scratch".into(),
                source: io::Error::other("io"),
            },
        );
        assert!(matches!(storage, AppError::Storage { .. }));

        let api = AppError::api_server(
            "api_server.serve",
            cutout_api::ApiServerError::Serve {
                source: io::Error::other("io"),
            },
        );
        assert!(matches!(api, AppError::ApiServer { .. }));
    }
}
