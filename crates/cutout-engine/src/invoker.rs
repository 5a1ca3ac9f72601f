//! External background removal tool invocation.
//!
//! # Design
//! - The tool is a black box launched as a subprocess with two positional paths.
//! - `kill_on_drop` ties the child's lifetime to the invocation future, so an
//!   expired timeout tears the subprocess down.
//! - Stderr is captured and bounded before it reaches error context.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

const STDERR_EXCERPT_CHARS: usize = 512;

/// Command line used to launch the external removal tool.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    /// Program name or path.
    pub program: String,
    /// Leading arguments placed before the intake and output paths.
    pub args: Vec<String>,
    /// Upper bound on a single invocation.
    pub timeout: Duration,
}

impl ToolCommand {
    /// Build a tool command from its parts.
    #[must_use]
    pub const fn new(program: String, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program,
            args,
            timeout,
        }
    }
}

/// Runs the background removal transform for one staged upload.
#[async_trait]
pub trait TransformInvoker: Send + Sync {
    /// Transform the staged intake file into the output file.
    async fn transform(&self, intake: &Path, output: &Path) -> EngineResult<()>;
}

/// Invoker that shells out to the configured external tool.
pub struct CommandInvoker {
    command: ToolCommand,
}

impl CommandInvoker {
    /// Construct an invoker around the given tool command.
    #[must_use]
    pub const fn new(command: ToolCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl TransformInvoker for CommandInvoker {
    async fn transform(&self, intake: &Path, output: &Path) -> EngineResult<()> {
        debug!(
            program = %self.command.program,
            intake = %intake.display(),
            output = %output.display(),
            "invoking removal tool"
        );

        let mut command = Command::new(&self.command.program);
        command
            .args(&self.command.args)
            .arg(intake)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| EngineError::ToolSpawn {
            program: self.command.program.clone(),
            source,
        })?;

        // Dropping the wait future on timeout kills the child via kill_on_drop.
        let finished = match time::timeout(self.command.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| EngineError::io("tool.wait", intake, source))?,
            Err(_) => {
                return Err(EngineError::ToolTimeout {
                    program: self.command.program.clone(),
                    timeout: self.command.timeout,
                });
            }
        };

        if !finished.status.success() {
            return Err(EngineError::Tool {
                program: self.command.program.clone(),
                status: finished.status.code(),
                stderr: stderr_excerpt(&finished.stderr),
            });
        }

        if tokio::fs::metadata(output).await.is_err() {
            return Err(EngineError::MissingOutput {
                program: self.command.program.clone(),
                path: output.to_path_buf(),
            });
        }

        Ok(())
    }
}

fn stderr_excerpt(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    text.trim().chars().take(STDERR_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    fn shell_invoker(script: &str, timeout: Duration) -> CommandInvoker {
        CommandInvoker::new(ToolCommand::new(
            "sh".to_string(),
            vec!["-c".to_string(), script.to_string()],
            timeout,
        ))
    }

    fn scratch_paths(temp: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
        (temp.path().join("in.jpg"), temp.path().join("out.png"))
    }

    #[tokio::test]
    async fn transform_copies_intake_to_output() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let (intake, output) = scratch_paths(&temp);
        fs::write(&intake, b"image bytes")?;

        let invoker = shell_invoker(r#"cp "$0" "$1""#, Duration::from_secs(5));
        invoker.transform(&intake, &output).await?;
        assert_eq!(fs::read(&output)?, b"image bytes");
        Ok(())
    }

    #[tokio::test]
    async fn transform_surfaces_exit_status_and_stderr() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let (intake, output) = scratch_paths(&temp);
        fs::write(&intake, b"image bytes")?;

        let invoker = shell_invoker("echo boom >&2; exit 3", Duration::from_secs(5));
        let err = invoker
            .transform(&intake, &output)
            .await
            .expect_err("expected tool failure");
        match err {
            EngineError::Tool {
                status, stderr, ..
            } => {
                assert_eq!(status, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn transform_times_out_and_kills_subprocess() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let (intake, output) = scratch_paths(&temp);
        fs::write(&intake, b"image bytes")?;

        let invoker = shell_invoker(r#"sleep 1; cp "$0" "$1""#, Duration::from_millis(200));
        let started = Instant::now();
        let err = invoker
            .transform(&intake, &output)
            .await
            .expect_err("expected timeout");
        assert!(matches!(err, EngineError::ToolTimeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));

        // A child that survived the timeout would finish its sleep and write
        // the output file; wait past that point and check nothing appeared.
        time::sleep(Duration::from_millis(1500)).await;
        assert!(!output.exists());
        Ok(())
    }

    #[tokio::test]
    async fn transform_detects_missing_output() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let (intake, output) = scratch_paths(&temp);
        fs::write(&intake, b"image bytes")?;

        let invoker = shell_invoker("true", Duration::from_secs(5));
        let err = invoker
            .transform(&intake, &output)
            .await
            .expect_err("expected missing output");
        assert!(matches!(err, EngineError::MissingOutput { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn transform_reports_unspawnable_program() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let (intake, output) = scratch_paths(&temp);
        fs::write(&intake, b"image bytes")?;

        let invoker = CommandInvoker::new(ToolCommand::new(
            "cutout-tool-that-does-not-exist".to_string(),
            Vec::new(),
            Duration::from_secs(5),
        ));
        let err = invoker
            .transform(&intake, &output)
            .await
            .expect_err("expected spawn failure");
        assert!(matches!(err, EngineError::ToolSpawn { .. }));
        Ok(())
    }
}
