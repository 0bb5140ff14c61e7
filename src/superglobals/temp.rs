//! Ownership of uploaded temp files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::types::{UploadError, UploadedFile};

/// Temp files written for one request's uploads.
///
/// Clones share the same set. Files still present when the last clone is
/// dropped are deleted; a file already moved away with
/// [`InputFile::move_to`](crate::input::InputFile::move_to) is skipped.
#[derive(Debug, Clone, Default)]
pub struct TempUploads(Arc<TempFiles>);

#[derive(Debug, Default)]
struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempUploads {
    /// Take ownership of `paths`.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self(Arc::new(TempFiles { paths }))
    }

    /// Track the stored file of every successful upload.
    pub fn from_uploads(uploads: &[(String, UploadedFile)]) -> Self {
        Self::new(
            uploads
                .iter()
                .map(|(_, file)| file)
                .filter(|file| file.upload_error() == UploadError::Ok && !file.tmp_name.is_empty())
                .map(|file| PathBuf::from(&file.tmp_name))
                .collect(),
        )
    }

    /// Paths that will be removed on drop.
    pub fn paths(&self) -> &[PathBuf] {
        &self.0.paths
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.paths.is_empty()
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            remove_temp_file(&path);
        }
    }
}

/// Delete one temp file; a file that is already gone is not an error.
pub(crate) fn remove_temp_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to cleanup temp file"
            );
        }
    }
}
