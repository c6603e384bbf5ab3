//! The provisioned on-disk layout for asset binaries.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use mediadesk_core::config::storage::StorageConfig;
use mediadesk_core::error::{AppError, ErrorKind};
use mediadesk_core::result::AppResult;

/// Directory name for canonical originals, relative to the storage root.
pub const IMAGES_DIR: &str = "images";
/// Directory name for derived thumbnails, relative to the storage root.
pub const THUMBNAILS_DIR: &str = "thumbnails";

/// The validated storage layout, provisioned once at startup and injected
/// into the asset store. Operations never create directories per call.
///
/// A thumbnail shares its canonical file's name; only the directory differs,
/// so the two paths for a stored name are always
/// `images/<name>` and `thumbnails/<name>`.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    /// Create both asset directories under the configured root and return
    /// the validated layout.
    pub async fn provision(config: &StorageConfig) -> AppResult<Self> {
        let root = PathBuf::from(&config.root_path);

        for dir in [IMAGES_DIR, THUMBNAILS_DIR] {
            let path = root.join(dir);
            fs::create_dir_all(&path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to provision storage directory: {}", path.display()),
                    e,
                )
            })?;
        }

        info!(root = %root.display(), "Storage layout provisioned");
        Ok(Self { root })
    }

    /// The storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Root-relative path of a stored name's canonical binary. This is the
    /// value persisted on the asset record and referenced by published pages.
    pub fn relative_image_path(stored_file_name: &str) -> String {
        format!("{IMAGES_DIR}/{stored_file_name}")
    }

    /// Root-relative path of a stored name's thumbnail.
    pub fn relative_thumbnail_path(stored_file_name: &str) -> String {
        format!("{THUMBNAILS_DIR}/{stored_file_name}")
    }

    /// Absolute path of the images directory.
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// Absolute path of the thumbnails directory.
    pub fn thumbnails_dir(&self) -> PathBuf {
        self.root.join(THUMBNAILS_DIR)
    }

    /// Absolute path of a stored name's canonical binary.
    pub fn image_path(&self, stored_file_name: &str) -> PathBuf {
        self.images_dir().join(stored_file_name)
    }

    /// Absolute path of a stored name's thumbnail.
    pub fn thumbnail_path(&self, stored_file_name: &str) -> PathBuf {
        self.thumbnails_dir().join(stored_file_name)
    }
}
