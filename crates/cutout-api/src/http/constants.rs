//! Shared HTTP constants.

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// Multipart field carrying the uploaded image.
pub(crate) const UPLOAD_FIELD: &str = "image";

pub(crate) const PROBLEM_BAD_REQUEST: &str = "bad_request";
pub(crate) const PROBLEM_NO_FILE: &str = "no_file";
pub(crate) const PROBLEM_TOOL_FAILED: &str = "tool_failed";
pub(crate) const PROBLEM_TOOL_TIMEOUT: &str = "tool_timeout";
pub(crate) const PROBLEM_INTERNAL: &str = "internal";
