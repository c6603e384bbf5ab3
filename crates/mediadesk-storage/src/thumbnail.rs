//! Thumbnail derivation for image assets.

use std::io::Cursor;
use std::path::Path;

use image::ImageFormat;
use tokio::fs;
use tracing::debug;

use mediadesk_core::config::upload::UploadConfig;
use mediadesk_core::error::{AppError, ErrorKind};
use mediadesk_core::result::AppResult;

/// Derives fixed-bound thumbnails from canonical image binaries.
///
/// A failed derivation is reported to the caller but treated as non-fatal by
/// the asset store: the asset stays valid and serving paths fall back to the
/// full image while the thumbnail is absent.
#[derive(Debug, Clone)]
pub struct ThumbnailDeriver {
    max_width: u32,
    max_height: u32,
}

impl ThumbnailDeriver {
    /// Build a deriver from upload configuration.
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            max_width: config.thumbnail_max_width,
            max_height: config.thumbnail_max_height,
        }
    }

    /// Create a deriver with explicit bounds.
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// Decode the image at `source`, resize it to fit within the configured
    /// bounds preserving aspect ratio, and write it to `dest` in the format
    /// implied by the destination file name.
    ///
    /// Decoding and resizing are CPU-bound and run on the blocking pool.
    pub async fn derive(&self, source: &Path, dest: &Path) -> AppResult<()> {
        let data = fs::read(source).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read thumbnail source: {}", source.display()),
                e,
            )
        })?;

        let (max_width, max_height) = (self.max_width, self.max_height);
        let dest_owned = dest.to_path_buf();
        let encoded = tokio::task::spawn_blocking(move || -> AppResult<Vec<u8>> {
            let img = image::load_from_memory(&data).map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to decode image", e)
            })?;

            let format = ImageFormat::from_path(&dest_owned)
                .or_else(|_| image::guess_format(&data))
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Storage,
                        "Could not determine thumbnail format",
                        e,
                    )
                })?;

            // `thumbnail` preserves aspect ratio within the given bounds.
            let thumb = img.thumbnail(max_width, max_height);

            let mut buffer = Cursor::new(Vec::new());
            thumb.write_to(&mut buffer, format).map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to encode thumbnail", e)
            })?;
            Ok(buffer.into_inner())
        })
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Thumbnail task panicked", e))??;

        fs::write(dest, &encoded).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write thumbnail: {}", dest.display()),
                e,
            )
        })?;

        debug!(
            source = %source.display(),
            dest = %dest.display(),
            bytes = encoded.len(),
            "Derived thumbnail"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::GenericImageView;

    async fn write_test_png(path: &Path, width: u32, height: u32) {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        fs::write(path, buffer.into_inner()).await.unwrap();
    }

    #[tokio::test]
    async fn test_derive_preserves_aspect_ratio() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.png");
        let dest = dir.path().join("thumb.png");
        write_test_png(&source, 100, 50).await;

        ThumbnailDeriver::new(32, 32)
            .derive(&source, &dest)
            .await
            .unwrap();

        let thumb = image::open(&dest).unwrap();
        assert_eq!(thumb.dimensions(), (32, 16));
    }

    #[tokio::test]
    async fn test_derive_rejects_non_image_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("not-an-image.png");
        let dest = dir.path().join("thumb.png");
        fs::write(&source, b"definitely not a png").await.unwrap();

        let err = ThumbnailDeriver::new(32, 32)
            .derive(&source, &dest)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_derive_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ThumbnailDeriver::new(32, 32)
            .derive(&dir.path().join("absent.png"), &dir.path().join("t.png"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
    }
}
