//! Shared application state for the HTTP layer.

use cutout_engine::Pipeline;
use cutout_telemetry::Metrics;

/// Dependencies shared across request handlers.
pub(crate) struct ApiState {
    /// Background removal pipeline.
    pub(crate) pipeline: Pipeline,
    /// Shared metrics handle.
    pub(crate) telemetry: Metrics,
}
