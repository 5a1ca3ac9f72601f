//! # Design
//!
//! - Structured, constant-message errors for telemetry initialisation and rendering.
//! - Preserve source errors without interpolating context into error messages.

use std::string::FromUtf8Error;

use thiserror::Error;

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Errors produced while initialising or rendering telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Installing the global tracing subscriber failed.
    #[error("tracing subscriber install failed")]
    SubscriberInit {
        /// Message reported by the subscriber library.
        message: String,
    },
    /// Registering a Prometheus collector failed.
    #[error("metrics collector registration failed")]
    MetricsRegistration {
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
    /// Encoding the metrics exposition failed.
    #[error("metrics encoding failed")]
    MetricsEncode {
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
    /// Encoded metrics were not valid UTF-8.
    #[error("metrics output was not valid utf-8")]
    MetricsUtf8 {
        /// Underlying UTF-8 error.
        source: FromUtf8Error,
    },
}

impl TelemetryError {
    pub(crate) const fn registration(source: prometheus::Error) -> Self {
        Self::MetricsRegistration { source }
    }

    pub(crate) const fn encode(source: prometheus::Error) -> Self {
        Self::MetricsEncode { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn telemetry_error_helpers_build_variants() {
        let registration =
            TelemetryError::registration(prometheus::Error::Msg("duplicate".to_string()));
        assert!(matches!(
            registration,
            TelemetryError::MetricsRegistration { .. }
        ));
        assert!(registration.source().is_some());

        let encode = TelemetryError::encode(prometheus::Error::Msg("encode".to_string()));
        assert!(matches!(encode, TelemetryError::MetricsEncode { .. }));
        assert!(encode.source().is_some());
    }
}
