//! Per-job temp files
//!
//! Every conversion gets a UUIDv4 job id naming `<upload_dir>/<id>.epub` and
//! `<output_dir>/<id>.pdf`, so concurrent requests never share a path.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::StorageConfig;

#[derive(Debug, Clone)]
pub struct Workspace {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

/// Paths owned by one conversion
#[derive(Debug, Clone)]
pub struct JobPaths {
    pub id: Uuid,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Workspace {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.upload_dir.clone(), config.output_dir.clone())
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create both directories if missing
    pub async fn ensure_dirs(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }

    /// Allocate paths for a new job
    pub fn job(&self) -> JobPaths {
        let id = Uuid::new_v4();
        JobPaths {
            id,
            input: self.upload_dir.join(format!("{}.epub", id)),
            output: self.output_dir.join(format!("{}.pdf", id)),
        }
    }
}

/// Removes the job's input file when dropped
///
/// Runs on every exit path, including early returns and panics. The happy
/// path calls [`InputGuard::remove`] instead so the delete stays off the
/// runtime's worker thread.
pub struct InputGuard {
    path: PathBuf,
    armed: bool,
}

impl InputGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the input now, asynchronously
    pub async fn remove(mut self) {
        self.armed = false;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed temp input"),
            Err(e) => log_remove_error(&self.path, e),
        }
    }
}

impl Drop for InputGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // Blocking unlink; only reached on error paths and panics
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed temp input"),
            Err(e) => log_remove_error(&self.path, e),
        }
    }
}

fn log_remove_error(path: &Path, e: io::Error) {
    if e.kind() != io::ErrorKind::NotFound {
        tracing::warn!(path = %path.display(), "Failed to remove temp input: {}", e);
    }
}
