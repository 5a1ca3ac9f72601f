//! Scratch directory management for per-request intake and output files.
//!
//! # Design
//! - One scratch root with fixed `intake/` and `output/` subdirectories.
//! - Path allocation never touches the filesystem; uniqueness comes from UUID tokens.
//! - Releases are best-effort and logged, never surfaced to the request outcome.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs as async_fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

const INTAKE_DIR: &str = "intake";
const OUTPUT_DIR: &str = "output";
const OUTPUT_EXTENSION: &str = "png";
const WRITE_PROBE: &str = ".write-probe";

/// Manages the scratch directories holding per-request intake and output files.
#[derive(Debug, Clone)]
pub struct TempStore {
    intake_dir: PathBuf,
    output_dir: PathBuf,
}

impl TempStore {
    /// Create a store rooted at the given scratch directory.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            intake_dir: root.join(INTAKE_DIR),
            output_dir: root.join(OUTPUT_DIR),
        }
    }

    /// Directory holding staged uploads.
    #[must_use]
    pub fn intake_dir(&self) -> &Path {
        &self.intake_dir
    }

    /// Directory holding transformed outputs.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the scratch directories and verify both are writable.
    ///
    /// Idempotent; existing directories are left untouched.
    ///
    /// # Errors
    ///
    /// Returns a `StorageInit` error when a directory cannot be created or the
    /// writability probe fails.
    pub fn ensure_directories(&self) -> EngineResult<()> {
        for dir in [&self.intake_dir, &self.output_dir] {
            fs::create_dir_all(dir)
                .map_err(|source| EngineError::storage_init("create_dir_all", dir, source))?;
            probe_writable(dir)?;
        }
        Ok(())
    }

    /// Allocate a unique intake path for an upload, keeping the original extension.
    ///
    /// The file itself is not created.
    #[must_use]
    pub fn allocate_intake(&self, original_name: &str) -> PathBuf {
        let token = Uuid::new_v4().simple().to_string();
        let file_name = Path::new(original_name)
            .extension()
            .and_then(OsStr::to_str)
            .map_or_else(|| token.clone(), |ext| format!("{token}.{ext}"));
        self.intake_dir.join(file_name)
    }

    /// Derive the output path paired with an intake path.
    ///
    /// Same token, fixed `png` extension, output directory.
    #[must_use]
    pub fn derive_output(&self, intake: &Path) -> PathBuf {
        let stem = intake.file_stem().unwrap_or_else(|| OsStr::new("asset"));
        let mut file_name = stem.to_os_string();
        file_name.push(".");
        file_name.push(OUTPUT_EXTENSION);
        self.output_dir.join(file_name)
    }

    /// Delete a scratch file, tolerating files that were never created.
    ///
    /// Failures are logged and swallowed so cleanup can never override the
    /// request's primary outcome.
    pub async fn release(&self, path: &Path) {
        match async_fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "scratch file released"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "scratch file already absent");
            }
            Err(err) => {
                warn!(error = %err, path = %path.display(), "failed to release scratch file");
            }
        }
    }
}

fn probe_writable(dir: &Path) -> EngineResult<()> {
    let probe = dir.join(WRITE_PROBE);
    fs::write(&probe, b"probe")
        .map_err(|source| EngineError::storage_init("probe_write", &probe, source))?;
    fs::remove_file(&probe)
        .map_err(|source| EngineError::storage_init("probe_remove", &probe, source))?;
    Ok(())
}
