//! Per-request orchestration: stage the upload, invoke the tool, deliver, clean up.
//!
//! # Design
//! - One pipeline run per request; isolation comes from unique scratch paths,
//!   not shared state.
//! - Both scratch paths get exactly one release attempt on every exit path.
//! - The output is read fully into memory before cleanup so artifact lifetime
//!   never depends on the client reading the response.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use cutout_telemetry::{Metrics, current_request_id};
use tokio::fs;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::invoker::TransformInvoker;
use crate::storage::TempStore;

/// Content type of every delivered image.
pub const OUTPUT_CONTENT_TYPE: &str = "image/png";

/// Upload handed to the pipeline once the ingress layer has parsed the body.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    /// Client-declared filename, used only to preserve the extension.
    pub original_name: String,
    /// Client-declared content type, recorded for diagnostics.
    pub content_type: Option<String>,
    /// Raw upload bytes.
    pub bytes: Vec<u8>,
}

/// Transformed image handed back to the delivery layer.
#[derive(Debug)]
pub struct Delivery {
    /// Transformed image bytes.
    pub bytes: Vec<u8>,
    /// Content type of the transformed image.
    pub content_type: &'static str,
}

/// Orchestrates one background removal run per uploaded asset.
#[derive(Clone)]
pub struct Pipeline {
    store: TempStore,
    invoker: Arc<dyn TransformInvoker>,
    metrics: Metrics,
}

impl Pipeline {
    /// Build a pipeline over the given scratch store and invoker.
    #[must_use]
    pub fn new(store: TempStore, invoker: Arc<dyn TransformInvoker>, metrics: Metrics) -> Self {
        Self {
            store,
            invoker,
            metrics,
        }
    }

    /// Run the full stage/transform/deliver/cleanup sequence for one upload.
    ///
    /// # Errors
    ///
    /// Returns `NoFile` for empty uploads before any scratch file exists, and
    /// the staging, invocation, or delivery error otherwise. Scratch files are
    /// released on every path.
    pub async fn handle(&self, upload: UploadedAsset) -> EngineResult<Delivery> {
        if upload.bytes.is_empty() {
            self.metrics.inc_pipeline_outcome("no_file");
            return Err(EngineError::NoFile {
                reason: "empty upload body",
            });
        }

        let intake = self.store.allocate_intake(&upload.original_name);
        let output = self.store.derive_output(&intake);

        self.metrics.pipeline_started();
        let started = Instant::now();
        let result = self.run(&upload, &intake, &output).await;

        // Exactly one release attempt per path, regardless of the exit taken.
        self.store.release(&intake).await;
        self.store.release(&output).await;
        self.metrics.pipeline_finished();

        let request_id = current_request_id().unwrap_or_default();
        match &result {
            Ok(delivery) => {
                self.metrics.inc_pipeline_outcome("delivered");
                self.metrics.observe_transform_duration(started.elapsed());
                info!(
                    request_id = %request_id,
                    original = %upload.original_name,
                    bytes = delivery.bytes.len(),
                    "background removal delivered"
                );
            }
            Err(err) => {
                self.metrics.inc_pipeline_outcome(outcome_label(err));
                warn!(
                    request_id = %request_id,
                    error = %err,
                    original = %upload.original_name,
                    intake = %intake.display(),
                    "background removal failed"
                );
            }
        }
        result
    }

    async fn run(
        &self,
        upload: &UploadedAsset,
        intake: &Path,
        output: &Path,
    ) -> EngineResult<Delivery> {
        fs::write(intake, &upload.bytes)
            .await
            .map_err(|source| EngineError::io("stage.write", intake, source))?;
        self.invoker.transform(intake, output).await?;
        let bytes = fs::read(output)
            .await
            .map_err(|source| EngineError::io("deliver.read", output, source))?;
        Ok(Delivery {
            bytes,
            content_type: OUTPUT_CONTENT_TYPE,
        })
    }
}

const fn outcome_label(error: &EngineError) -> &'static str {
    match error {
        EngineError::NoFile { .. } => "no_file",
        EngineError::Tool { .. } | EngineError::MissingOutput { .. } => "tool_failed",
        EngineError::ToolSpawn { .. } => "tool_unavailable",
        EngineError::ToolTimeout { .. } => "tool_timeout",
        EngineError::StorageInit { .. } | EngineError::Io { .. } => "internal",
    }
}
