//! Request tracking middleware: per-route counters and request-id scoping.

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use cutout_telemetry::with_request_id;

use crate::http::constants::HEADER_REQUEST_ID;
use crate::state::ApiState;

/// Run a handler inside its request-id scope and count the response per route.
///
/// Mounted with `middleware::from_fn_with_state`, so it only ever sees matched
/// routes; the raw path fallback covers layered services without a
/// `MatchedPath` extension.
pub(crate) async fn track_request(
    State(state): State<Arc<ApiState>>,
    request: Request,
    next: Next,
) -> Response {
    let route = request.extensions().get::<MatchedPath>().map_or_else(
        || request.uri().path().to_string(),
        |matched| matched.as_str().to_string(),
    );
    let request_id = request
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let response = with_request_id(request_id, next.run(request)).await;
    state
        .telemetry
        .inc_http_request(&route, response.status().as_u16());
    response
}
