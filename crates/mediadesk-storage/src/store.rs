//! Binary placement and removal on the provisioned layout.

use std::path::Path;

use tokio::fs;
use tracing::debug;

use mediadesk_core::error::{AppError, ErrorKind};
use mediadesk_core::result::AppResult;

use crate::layout::StorageLayout;

/// Filesystem operations for asset binaries and their thumbnails.
///
/// All paths are derived from the injected [`StorageLayout`]; nothing here
/// re-checks or re-creates directories per call.
#[derive(Debug, Clone)]
pub struct AssetFileStore {
    layout: StorageLayout,
}

impl AssetFileStore {
    /// Create a file store over a provisioned layout.
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// The layout this store operates on.
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Copy a spooled upload into the canonical location for a stored name.
    /// Returns the number of bytes copied.
    pub async fn ingest(&self, source: &Path, stored_file_name: &str) -> AppResult<u64> {
        let dest = self.layout.image_path(stored_file_name);
        let bytes = fs::copy(source, &dest).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!(
                    "Failed to copy upload {} -> {}",
                    source.display(),
                    dest.display()
                ),
                e,
            )
        })?;

        debug!(stored_file_name, bytes, "Ingested asset binary");
        Ok(bytes)
    }

    /// Remove the canonical binary for a stored name. A missing file is not
    /// an error; delete and replace both tolerate it.
    pub async fn remove_image(&self, stored_file_name: &str) -> AppResult<()> {
        remove_tolerant(&self.layout.image_path(stored_file_name)).await
    }

    /// Remove the thumbnail for a stored name, tolerating absence.
    pub async fn remove_thumbnail(&self, stored_file_name: &str) -> AppResult<()> {
        remove_tolerant(&self.layout.thumbnail_path(stored_file_name)).await
    }

    /// Whether the canonical binary exists.
    pub async fn image_exists(&self, stored_file_name: &str) -> bool {
        fs::try_exists(self.layout.image_path(stored_file_name))
            .await
            .unwrap_or(false)
    }

    /// Whether the thumbnail exists.
    pub async fn thumbnail_exists(&self, stored_file_name: &str) -> bool {
        fs::try_exists(self.layout.thumbnail_path(stored_file_name))
            .await
            .unwrap_or(false)
    }

    /// File names currently present in the images directory.
    pub async fn list_images(&self) -> AppResult<Vec<String>> {
        list_file_names(&self.layout.images_dir()).await
    }

    /// File names currently present in the thumbnails directory.
    pub async fn list_thumbnails(&self) -> AppResult<Vec<String>> {
        list_file_names(&self.layout.thumbnails_dir()).await
    }
}

/// Remove a file, treating "already absent" as success.
async fn remove_tolerant(path: &Path) -> AppResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to remove file: {}", path.display()),
            e,
        )),
    }
}

/// Plain file names (no directories) inside a directory.
async fn list_file_names(dir: &Path) -> AppResult<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to list directory: {}", dir.display()),
            e,
        )
    })?;

    while let Some(entry) = entries.next_entry().await.map_err(|e| {
        AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
    })? {
        let is_file = entry
            .file_type()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to read entry type", e)
            })?
            .is_file();
        if is_file {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    names.sort();
    Ok(names)
}
