//! Boot sequence wiring configuration, telemetry, and the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use cutout_api::ApiServer;
use cutout_config::AppConfig;
use cutout_engine::{CommandInvoker, Pipeline, TempStore, ToolCommand};
use cutout_telemetry::{
    GlobalContextGuard, LogFormat, LoggingConfig, Metrics, build_sha, init_logging,
    log_format_from_name,
};
use tracing::info;

use crate::error::{AppError, AppResult};

/// Dependencies required to bootstrap the cutout service.
pub(crate) struct BootstrapDependencies {
    config: AppConfig,
    logging_format: LogFormat,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let config =
            AppConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;
        let logging_format = config
            .log_format
            .as_deref()
            .map_or_else(LogFormat::infer, log_format_from_name);
        Ok(Self {
            config,
            logging_format,
        })
    }
}

/// Entry point for the cutout application boot sequence.
///
/// # Errors
///
/// Returns an error if configuration, telemetry, scratch storage, or the HTTP
/// listener fails to initialise.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies).await
}

/// Boot sequence that relies entirely on injected dependencies to simplify testing.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let BootstrapDependencies {
        config,
        logging_format,
    } = dependencies;

    let logging = LoggingConfig {
        level: &config.log_level,
        format: logging_format,
        build_sha: build_sha(),
    };
    init_logging(&logging).map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new("serve");

    info!("cutout application bootstrap starting");

    let telemetry = Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;

    // Scratch storage failures are fatal; the service must not accept uploads
    // it cannot stage.
    let store = TempStore::new(&config.scratch_root);
    store
        .ensure_directories()
        .map_err(|err| AppError::storage("scratch.ensure_directories", err))?;
    info!(
        intake = %store.intake_dir().display(),
        output = %store.output_dir().display(),
        "scratch directories ready"
    );

    let invoker = CommandInvoker::new(ToolCommand::new(
        config.tool.program.clone(),
        config.tool.args.clone(),
        config.tool.timeout,
    ));
    let pipeline = Pipeline::new(store, Arc::new(invoker), telemetry.clone());
    let server = ApiServer::new(pipeline, telemetry, config.max_upload_bytes);

    let addr = SocketAddr::new(config.bind_addr, config.http_port);
    info!(%addr, tool = %config.tool.program, "launching api listener");
    server
        .serve(addr)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))?;

    info!("api server shutdown complete");
    Ok(())
}
