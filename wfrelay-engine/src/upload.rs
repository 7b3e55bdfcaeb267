//! Temporary storage for uploaded manifests
//!
//! An uploaded manifest is written to a uniquely named file so the tool can
//! read it by path. The file lives exactly as long as its [`ManifestUpload`]:
//! dropping the guard removes it, on success, on error and on cancellation.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{EngineError, Result};

/// An uploaded manifest on disk, removed when dropped
#[derive(Debug)]
pub struct ManifestUpload {
    file: Option<NamedTempFile>,
}

impl ManifestUpload {
    /// Writes `contents` to a new file under `dir`
    ///
    /// Blocking; use [`ManifestUpload::store_async`] from async code.
    pub fn store(dir: &Path, contents: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("manifest-")
            .suffix(".yaml")
            .tempfile_in(dir)
            .map_err(EngineError::Upload)?;

        file.write_all(contents).map_err(EngineError::Upload)?;
        file.flush().map_err(EngineError::Upload)?;

        debug!(
            "Stored uploaded manifest at {} ({} bytes)",
            file.path().display(),
            contents.len()
        );

        Ok(Self { file: Some(file) })
    }

    /// Writes the manifest on the blocking thread pool
    pub async fn store_async(dir: PathBuf, contents: Vec<u8>) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::store(&dir, &contents))
            .await
            .map_err(|e| EngineError::Upload(std::io::Error::other(e)))?
    }

    pub fn path(&self) -> &Path {
        match &self.file {
            Some(file) => file.path(),
            None => Path::new(""),
        }
    }

    /// The path as handed to the tool
    pub fn path_string(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }
}

impl Drop for ManifestUpload {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let path = file.path().to_path_buf();
            match file.close() {
                Ok(()) => debug!("Removed uploaded manifest {}", path.display()),
                Err(e) => warn!(
                    "Failed to remove uploaded manifest {}: {}",
                    path.display(),
                    e
                ),
            }
        }
    }
}
