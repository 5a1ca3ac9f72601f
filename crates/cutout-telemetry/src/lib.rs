//! Telemetry primitives shared across the cutout workspace.
//!
//! This crate centralises logging, metrics, and cross-service tracing helpers so the
//! application and delivery surfaces can adopt a consistent observability story.
#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

mod context;
mod error;
mod init;
mod metrics;

pub use context::{
    GlobalContextGuard, current_request_id, propagate_request_id_layer, set_request_id_layer,
    with_request_id,
};
pub use error::{TelemetryError, TelemetryResult};
pub use init::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging, log_format_from_name,
};
pub use metrics::{Metrics, MetricsSnapshot};
