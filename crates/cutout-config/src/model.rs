//! Configuration model and environment resolution.
//!
//! # Design
//! - One typed snapshot resolved once at startup; no hot reload.
//! - The environment lookup is injectable so resolution is testable without
//!   mutating process state.

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

const ENV_BIND_ADDR: &str = "CUTOUT_BIND_ADDR";
const ENV_HTTP_PORT: &str = "CUTOUT_HTTP_PORT";
const ENV_SCRATCH_ROOT: &str = "CUTOUT_SCRATCH_ROOT";
const ENV_MAX_UPLOAD_BYTES: &str = "CUTOUT_MAX_UPLOAD_BYTES";
const ENV_TOOL_PROGRAM: &str = "CUTOUT_TOOL_PROGRAM";
const ENV_TOOL_ARGS: &str = "CUTOUT_TOOL_ARGS";
const ENV_TOOL_TIMEOUT_SECS: &str = "CUTOUT_TOOL_TIMEOUT_SECS";
const ENV_LOG_LEVEL: &str = "CUTOUT_LOG_LEVEL";
const ENV_LOG_FORMAT: &str = "CUTOUT_LOG_FORMAT";

const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_HTTP_PORT: u16 = 5000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_TOOL_PROGRAM: &str = "rembg";
const DEFAULT_TOOL_ARGS: &str = "i";
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_LOG_LEVEL: &str = "info";
const SCRATCH_DIR_NAME: &str = "cutout";

/// Application configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: IpAddr,
    /// Port the HTTP listener binds to.
    pub http_port: u16,
    /// Root directory for per-request scratch files.
    pub scratch_root: PathBuf,
    /// Upper bound for accepted upload bodies in bytes.
    pub max_upload_bytes: usize,
    /// External removal tool profile.
    pub tool: ToolProfile,
    /// Log level used when `RUST_LOG` is not provided.
    pub log_level: String,
    /// Log format name (`json`/`pretty`) when explicitly configured.
    pub log_format: Option<String>,
}

/// Command-line profile for the external removal tool.
#[derive(Debug, Clone)]
pub struct ToolProfile {
    /// Program name or path.
    pub program: String,
    /// Leading arguments placed before the intake and output paths.
    pub args: Vec<String>,
    /// Upper bound on a single invocation.
    pub timeout: Duration,
}

impl AppConfig {
    /// Resolve configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but fails parsing or
    /// validation.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let bind_addr = parse_var(ENV_BIND_ADDR, lookup(ENV_BIND_ADDR), DEFAULT_BIND_ADDR)?;
        let http_port: u16 = parse_var(ENV_HTTP_PORT, lookup(ENV_HTTP_PORT), DEFAULT_HTTP_PORT)?;
        if http_port == 0 {
            return Err(ConfigError::invalid(
                ENV_HTTP_PORT,
                "port must be non-zero",
                Some(http_port.to_string()),
            ));
        }

        let scratch_root = lookup(ENV_SCRATCH_ROOT).map_or_else(
            || env::temp_dir().join(SCRATCH_DIR_NAME),
            PathBuf::from,
        );

        let max_upload_bytes: usize = parse_var(
            ENV_MAX_UPLOAD_BYTES,
            lookup(ENV_MAX_UPLOAD_BYTES),
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;
        if max_upload_bytes == 0 {
            return Err(ConfigError::invalid(
                ENV_MAX_UPLOAD_BYTES,
                "upload limit must be non-zero",
                Some(max_upload_bytes.to_string()),
            ));
        }

        let program = lookup(ENV_TOOL_PROGRAM)
            .unwrap_or_else(|| DEFAULT_TOOL_PROGRAM.to_string())
            .trim()
            .to_string();
        if program.is_empty() {
            return Err(ConfigError::invalid(
                ENV_TOOL_PROGRAM,
                "tool program must not be empty",
                None,
            ));
        }

        let args = lookup(ENV_TOOL_ARGS)
            .unwrap_or_else(|| DEFAULT_TOOL_ARGS.to_string())
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let timeout_secs: u64 = parse_var(
            ENV_TOOL_TIMEOUT_SECS,
            lookup(ENV_TOOL_TIMEOUT_SECS),
            DEFAULT_TOOL_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::invalid(
                ENV_TOOL_TIMEOUT_SECS,
                "timeout must be non-zero",
                Some(timeout_secs.to_string()),
            ));
        }

        let log_level = lookup(ENV_LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let log_format = lookup(ENV_LOG_FORMAT);

        Ok(Self {
            bind_addr,
            http_port,
            scratch_root,
            max_upload_bytes,
            tool: ToolProfile {
                program,
                args,
                timeout: Duration::from_secs(timeout_secs),
            },
            log_level,
            log_format,
        })
    }
}

fn parse_var<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> ConfigResult<T> {
    value.map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|_| ConfigError::invalid(name, "failed to parse", Some(raw)))
    })
}
