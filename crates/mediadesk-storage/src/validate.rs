//! Upload validation.

use mediadesk_core::config::upload::UploadConfig;
use mediadesk_core::error::AppError;
use mediadesk_core::result::AppResult;
use mediadesk_core::types::upload::UploadedFile;

use crate::naming::file_extension;

/// Validates a candidate upload before any side effect.
///
/// All checks are read-only; a rejected upload is guaranteed to have caused
/// no filesystem mutation. Rejection reasons are user-facing strings.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    allowed_mime_types: Vec<String>,
    max_size_bytes: u64,
}

impl UploadValidator {
    /// Build a validator from upload configuration.
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            allowed_mime_types: config.allowed_mime_types.clone(),
            max_size_bytes: config.max_size_bytes,
        }
    }

    /// Validate a candidate upload. Checks, in order: declared MIME type
    /// against the whitelist, size against the maximum, and extension
    /// consistency with the declared type.
    pub fn validate(&self, file: &UploadedFile) -> AppResult<()> {
        if !self
            .allowed_mime_types
            .iter()
            .any(|m| m == &file.declared_mime_type)
        {
            return Err(AppError::validation(format!(
                "File type '{}' is not allowed",
                file.declared_mime_type
            )));
        }

        if file.size_bytes > self.max_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds the maximum upload size of {} bytes",
                self.max_size_bytes
            )));
        }

        let ext = file_extension(&file.original_name).ok_or_else(|| {
            AppError::validation(format!(
                "File name '{}' has no extension",
                file.original_name
            ))
        })?;

        match mime_for_extension(&ext) {
            Some(expected) if expected == file.declared_mime_type => Ok(()),
            _ => Err(AppError::validation(format!(
                "File extension '.{ext}' does not match the declared type '{}'",
                file.declared_mime_type
            ))),
        }
    }
}

/// The MIME type implied by a (lowercase) file extension.
fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> UploadValidator {
        UploadValidator::from_config(&UploadConfig::default())
    }

    fn upload(name: &str, mime: &str, size: u64) -> UploadedFile {
        UploadedFile::new(name, mime, size, "/tmp/spool/upload")
    }

    #[test]
    fn test_accepts_valid_image() {
        assert!(validator()
            .validate(&upload("logo.png", "image/png", 50_000))
            .is_ok());
        assert!(validator()
            .validate(&upload("photo.JPEG", "image/jpeg", 50_000))
            .is_ok());
    }

    #[test]
    fn test_rejects_disallowed_mime_type() {
        let err = validator()
            .validate(&upload("tool.exe", "application/x-msdownload", 10))
            .unwrap_err();
        assert_eq!(err.kind, mediadesk_core::error::ErrorKind::Validation);
    }

    #[test]
    fn test_rejects_oversize_file() {
        let err = validator()
            .validate(&upload("big.png", "image/png", 11_000_000))
            .unwrap_err();
        assert!(err.message.contains("maximum upload size"));
    }

    #[test]
    fn test_rejects_masquerading_extension() {
        // An executable renamed to claim an image type must not pass.
        let err = validator()
            .validate(&upload("payload.exe", "image/png", 10))
            .unwrap_err();
        assert!(err.message.contains("does not match"));
    }

    #[test]
    fn test_rejects_missing_extension() {
        let err = validator()
            .validate(&upload("logo", "image/png", 10))
            .unwrap_err();
        assert!(err.message.contains("no extension"));
    }
}
