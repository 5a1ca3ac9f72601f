//! # Design
//!
//! - Host-level errors for binding and serving the HTTP listener.
//! - Request-level failures never reach this type; they become problem documents.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors produced while hosting the API listener.
#[derive(Debug, Error)]
pub enum ApiServerError {
    /// Binding the TCP listener failed.
    #[error("api listener bind failed")]
    Bind {
        /// Address the listener attempted to bind.
        addr: SocketAddr,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Serving the router terminated with an error.
    #[error("api server terminated unexpectedly")]
    Serve {
        /// Underlying IO error.
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn api_server_errors_preserve_sources() {
        let bind = ApiServerError::Bind {
            addr: "127.0.0.1:5000".parse().expect("valid address"),
            source: io::Error::other("io"),
        };
        assert!(bind.source().is_some());

        let serve = ApiServerError::Serve {
            source: io::Error::other("io"),
        };
        assert!(serve.source().is_some());
    }
}
