//! # Design
//!
//! - Provide structured, constant-message errors for the removal pipeline.
//! - Capture operation context (paths, exit codes, stderr excerpts) to make failures reproducible in tests.
//! - Preserve source errors without interpolating context into error messages.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for pipeline operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors produced by the background removal pipeline.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request carried no usable upload.
    #[error("no file uploaded")]
    NoFile {
        /// Static reason for the rejection.
        reason: &'static str,
    },
    /// Scratch storage could not be initialised.
    #[error("scratch storage initialisation failed")]
    StorageInit {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// IO failures while staging or delivering request files.
    #[error("pipeline io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The external tool could not be spawned.
    #[error("removal tool could not be spawned")]
    ToolSpawn {
        /// Program that failed to spawn.
        program: String,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The external tool exited with a failure status.
    #[error("removal tool failed")]
    Tool {
        /// Program that failed.
        program: String,
        /// Exit status code when the process was not killed by a signal.
        status: Option<i32>,
        /// Bounded excerpt of the captured stderr stream.
        stderr: String,
    },
    /// The external tool exited cleanly without producing the output file.
    #[error("removal tool produced no output")]
    MissingOutput {
        /// Program that ran.
        program: String,
        /// Output path that was expected.
        path: PathBuf,
    },
    /// The external tool exceeded the configured invocation timeout.
    #[error("removal tool timed out")]
    ToolTimeout {
        /// Program that timed out.
        program: String,
        /// Configured invocation timeout.
        timeout: Duration,
    },
}

impl EngineError {
    pub(crate) fn storage_init(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self::StorageInit {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether the failure was caused by the client rather than the service.
    #[must_use]
    pub const fn is_client_fault(&self) -> bool {
        matches!(self, Self::NoFile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn io_error() -> io::Error {
        io::Error::other("io")
    }

    #[test]
    fn engine_error_helpers_build_variants() {
        let storage = EngineError::storage_init("create_dir", "scratch", io_error());
        assert!(matches!(storage, EngineError::StorageInit { .. }));
        assert!(storage.source().is_some());

        let io_err = EngineError::io("stage.write", "intake", io_error());
        assert!(matches!(io_err, EngineError::Io { .. }));
        assert!(io_err.source().is_some());
    }

    #[test]
    fn only_missing_uploads_are_client_faults() {
        let no_file = EngineError::NoFile {
            reason: "empty upload body",
        };
        assert!(no_file.is_client_fault());

        let tool = EngineError::Tool {
            program: "rembg".to_string(),
            status: Some(1),
            stderr: String::new(),
        };
        assert!(!tool.is_client_fault());

        let timeout = EngineError::ToolTimeout {
            program: "rembg".to_string(),
            timeout: Duration::from_secs(60),
        };
        assert!(!timeout.is_client_fault());
    }
}
