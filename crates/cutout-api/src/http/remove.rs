//! Background removal upload endpoint.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use cutout_engine::UploadedAsset;
use tracing::{debug, error, warn};

use crate::http::constants::UPLOAD_FIELD;
use crate::http::errors::ApiError;
use crate::state::ApiState;

/// `POST /removebg` — transform one uploaded image and return the result.
pub(crate) async fn remove_background(
    State(state): State<Arc<ApiState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = extract_upload(multipart).await?;
    debug!(
        original = %upload.original_name,
        content_type = upload.content_type.as_deref().unwrap_or("unknown"),
        bytes = upload.bytes.len(),
        "upload accepted for background removal"
    );

    match state.pipeline.handle(upload).await {
        Ok(delivery) => {
            Ok(([(header::CONTENT_TYPE, delivery.content_type)], delivery.bytes).into_response())
        }
        Err(err) => {
            if err.is_client_fault() {
                warn!(error = %err, "upload rejected");
            } else {
                error!(error = %err, "background removal pipeline failed");
            }
            Err(ApiError::from_engine(&err))
        }
    }
}

async fn extract_upload(mut multipart: Multipart) -> Result<UploadedAsset, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("malformed multipart body: {err}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let original_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::bad_request(format!("failed to read upload: {err}")))?;
        return Ok(UploadedAsset {
            original_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::no_file("no file uploaded"))
}
