//! Router construction and server host for the API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, Method, Request, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};
use cutout_engine::Pipeline;
use cutout_telemetry::{Metrics, build_sha, propagate_request_id_layer, set_request_id_layer};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Span, info};

use crate::error::ApiServerError;
use crate::http::constants::HEADER_REQUEST_ID;
use crate::http::health::{health, metrics};
use crate::http::remove::remove_background;
use crate::http::telemetry::track_request;
use crate::state::ApiState;

/// Axum router wrapper that hosts the cutout API.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the API server around a ready pipeline and telemetry handle.
    #[must_use]
    pub fn new(pipeline: Pipeline, telemetry: Metrics, max_upload_bytes: usize) -> Self {
        let state = Arc::new(ApiState { pipeline, telemetry });

        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE, HeaderName::from_static(HEADER_REQUEST_ID)]);

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let method = request.method().clone();
                let uri_path = request.uri().path();
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %uri_path,
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    let status = response.status().as_u16();
                    span.record("status_code", status);
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );

        let layered = ServiceBuilder::new()
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(trace_layer)
            .layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                track_request,
            ));

        let router = Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics))
            .route("/removebg", post(remove_background))
            .layer(DefaultBodyLimit::max(max_upload_bytes))
            .layer(cors_layer)
            .route_layer(layered)
            .with_state(state);

        Self { router }
    }

    /// Serve the API on the provided socket address until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server terminates
    /// unexpectedly.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), ApiServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        info!(%addr, "api server listening");
        axum::serve(listener, self.router.into_make_service())
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }

    #[cfg(test)]
    pub(crate) fn router(&self) -> Router {
        self.router.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::StatusCode;
    use cutout_engine::{
        CommandInvoker, EngineResult, TempStore, ToolCommand, TransformInvoker,
    };
    use std::error::Error;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "cutout-test-boundary";

    struct CountingInvoker {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TransformInvoker for CountingInvoker {
        async fn transform(&self, _intake: &Path, _output: &Path) -> EngineResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn shell_invoker(script: &str) -> Arc<CommandInvoker> {
        Arc::new(CommandInvoker::new(ToolCommand::new(
            "sh".to_string(),
            vec!["-c".to_string(), script.to_string()],
            Duration::from_secs(5),
        )))
    }

    fn server_with(
        invoker: Arc<dyn TransformInvoker>,
    ) -> Result<(ApiServer, TempDir), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let store = TempStore::new(temp.path());
        store.ensure_directories()?;
        let telemetry = Metrics::new()?;
        let pipeline = Pipeline::new(store, invoker, telemetry.clone());
        Ok((ApiServer::new(pipeline, telemetry, 1024 * 1024), temp))
    }

    fn multipart_request(field: &str, filename: &str, payload: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/removebg")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request builds")
    }

    fn scratch_is_empty(temp: &TempDir) -> Result<bool, Box<dyn Error>> {
        let intake = std::fs::read_dir(temp.path().join("intake"))?.count();
        let output = std::fs::read_dir(temp.path().join("output"))?.count();
        Ok(intake == 0 && output == 0)
    }

    #[tokio::test]
    async fn removebg_returns_image_and_cleans_scratch() -> Result<(), Box<dyn Error>> {
        let (server, temp) = server_with(shell_invoker(r#"cp "$0" "$1""#))?;

        let response = server
            .router()
            .oneshot(multipart_request("image", "portrait.jpg", b"image bytes"))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("image/png")
        );
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(&body[..], b"image bytes");
        assert!(scratch_is_empty(&temp)?);
        Ok(())
    }

    #[tokio::test]
    async fn removebg_without_image_field_is_rejected_without_invocation()
    -> Result<(), Box<dyn Error>> {
        let counting = Arc::new(CountingInvoker {
            calls: AtomicUsize::new(0),
        });
        let (server, temp) = server_with(counting.clone())?;

        let response = server
            .router()
            .oneshot(multipart_request("document", "notes.txt", b"not an image"))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let problem: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(problem["type"], "no_file");
        assert_eq!(problem["status"], 400);

        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
        assert!(scratch_is_empty(&temp)?);
        Ok(())
    }

    #[tokio::test]
    async fn removebg_tool_failure_maps_to_bad_gateway() -> Result<(), Box<dyn Error>> {
        let (server, temp) = server_with(shell_invoker("echo traceback >&2; exit 1"))?;

        let response = server
            .router()
            .oneshot(multipart_request("image", "portrait.jpg", b"image bytes"))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let problem: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(problem["type"], "tool_failed");
        assert_eq!(problem["detail"], "error processing image");
        assert!(scratch_is_empty(&temp)?);
        Ok(())
    }

    #[tokio::test]
    async fn health_reports_ok() -> Result<(), Box<dyn Error>> {
        let (server, _temp) = server_with(shell_invoker("true"))?;

        let response = server
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let health: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(health["status"], "ok");
        assert_eq!(health["inflight_pipelines"], 0);
        Ok(())
    }

    #[tokio::test]
    async fn metrics_endpoint_renders_request_counters() -> Result<(), Box<dyn Error>> {
        let (server, _temp) = server_with(shell_invoker("true"))?;

        let warmup = server
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty())?)
            .await?;
        assert_eq!(warmup.status(), StatusCode::OK);

        let response = server
            .router()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let text = String::from_utf8(body.to_vec())?;
        assert!(text.contains("http_requests_total"));
        assert!(text.contains(r#"route="/health""#));
        Ok(())
    }
}
