//! Append-only output file.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::DownloadError;

/// The file a download writes into, strictly in arrival order.
#[derive(Debug)]
pub struct OutputFile {
    path: PathBuf,
    file: File,
    written: u64,
}

impl OutputFile {
    /// Creates `path`, truncating any existing content.
    ///
    /// # Errors
    ///
    /// [`DownloadError::Io`] if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, DownloadError> {
        let file = File::create(path).map_err(|e| DownloadError::io(path, e))?;
        debug!(path = %path.display(), "output file opened");
        Ok(Self {
            path: path.to_path_buf(),
            file,
            written: 0,
        })
    }

    /// Appends `bytes` and flushes them.
    ///
    /// # Errors
    ///
    /// [`DownloadError::Io`] if writing or flushing fails.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), DownloadError> {
        self.append_io(bytes)
            .map_err(|e| DownloadError::io(&self.path, e))
    }

    /// Like [`append`](Self::append) but with the bare IO error, for use as a
    /// streaming body sink.
    pub(crate) fn append_io(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.file.write_all(bytes)?;
        self.file.flush()?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    /// Bytes appended since the file was created.
    #[must_use]
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path the file was created at.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes to disk and releases the handle.
    ///
    /// # Errors
    ///
    /// [`DownloadError::Io`] if the final sync fails.
    pub fn close(self) -> Result<u64, DownloadError> {
        self.file
            .sync_all()
            .map_err(|e| DownloadError::io(&self.path, e))?;
        debug!(path = %self.path.display(), bytes = self.written, "output file closed");
        Ok(self.written)
    }
}
