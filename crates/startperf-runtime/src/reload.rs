//! Scoped, reversible file mutation used to trigger a hot reload.

use std::path::{Path, PathBuf};

use startperf_core::MeasureError;
use tracing::{debug, warn};

/// Comment appended to the watched file. Harmless in JS/TS/CSS sources.
pub const RELOAD_SENTINEL: &[u8] = b"\n// reload trigger";

/// A file whose original bytes are held until [`FileMutation::restore`].
///
/// Dropping an unrestored mutation writes the original bytes back
/// synchronously, so the file is restored even if the measurement fails
/// between the write and the restore.
#[derive(Debug)]
pub struct FileMutation {
    path: PathBuf,
    original: Vec<u8>,
    dirty: bool,
}

impl FileMutation {
    /// Snapshot `path`.
    ///
    /// # Errors
    ///
    /// [`MeasureError::FileNotFoundForReload`] if the file does not exist,
    /// [`MeasureError::Io`] for any other read failure.
    pub async fn prepare(path: &Path) -> Result<Self, MeasureError> {
        let original = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MeasureError::FileNotFoundForReload(path.to_path_buf()));
            }
            Err(e) => return Err(MeasureError::Io(e)),
        };

        Ok(Self {
            path: path.to_path_buf(),
            original,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the original content followed by `suffix`.
    pub async fn append(&mut self, suffix: &[u8]) -> Result<(), MeasureError> {
        let mut content = Vec::with_capacity(self.original.len() + suffix.len());
        content.extend_from_slice(&self.original);
        content.extend_from_slice(suffix);

        self.dirty = true;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    /// Put the original bytes back.
    pub async fn restore(mut self) -> Result<(), MeasureError> {
        if self.dirty {
            tokio::fs::write(&self.path, &self.original).await?;
            self.dirty = false;
            debug!(path = %self.path.display(), "restored reload file");
        }
        Ok(())
    }
}

impl Drop for FileMutation {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = std::fs::write(&self.path, &self.original) {
                warn!(path = %self.path.display(), error = %e, "failed to restore reload file");
            }
        }
    }
}
