//! RFC9457-style API error wrapper.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cutout_engine::EngineError;

use crate::http::constants::{
    PROBLEM_BAD_REQUEST, PROBLEM_INTERNAL, PROBLEM_NO_FILE, PROBLEM_TOOL_FAILED,
    PROBLEM_TOOL_TIMEOUT,
};
use crate::models::ProblemDetails;

/// Structured API error with optional RFC9457 fields.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) kind: &'static str,
    title: &'static str,
    detail: Option<String>,
}

impl ApiError {
    const fn new(status: StatusCode, kind: &'static str, title: &'static str) -> Self {
        Self {
            status,
            kind,
            title,
            detail: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub(crate) fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, PROBLEM_BAD_REQUEST, "bad request").with_detail(detail)
    }

    pub(crate) fn no_file(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, PROBLEM_NO_FILE, "no file uploaded").with_detail(detail)
    }

    pub(crate) fn tool_failed(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            PROBLEM_TOOL_FAILED,
            "background removal failed",
        )
        .with_detail(detail)
    }

    pub(crate) fn tool_timeout(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            PROBLEM_TOOL_TIMEOUT,
            "background removal timed out",
        )
        .with_detail(detail)
    }

    pub(crate) fn internal(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            PROBLEM_INTERNAL,
            "internal server error",
        )
        .with_detail(detail)
    }

    /// Map a pipeline failure to a problem document.
    ///
    /// Raw tool diagnostics stay server-side; clients only see constant
    /// descriptions.
    pub(crate) fn from_engine(error: &EngineError) -> Self {
        match error {
            EngineError::NoFile { .. } => Self::no_file("no file uploaded"),
            EngineError::ToolTimeout { .. } => Self::tool_timeout("background removal timed out"),
            EngineError::Tool { .. }
            | EngineError::MissingOutput { .. }
            | EngineError::ToolSpawn { .. } => Self::tool_failed("error processing image"),
            EngineError::StorageInit { .. } | EngineError::Io { .. } => {
                Self::internal("error processing image")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ProblemDetails {
            kind: self.kind.to_string(),
            title: self.title.to_string(),
            status: self.status.as_u16(),
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}
