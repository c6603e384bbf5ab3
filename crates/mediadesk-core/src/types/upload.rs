//! The normalized uploaded-file descriptor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single uploaded file, normalized at the HTTP boundary.
///
/// The multipart layer writes the request body to a spool file and produces
/// exactly one of these per operation; the asset store never sees raw
/// request bodies. `declared_mime_type` is what the client claimed and is
/// verified against the whitelist before it is trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    /// The file name as supplied by the client (e.g. `logo.png`).
    pub original_name: String,
    /// The MIME type declared by the client.
    pub declared_mime_type: String,
    /// Size of the spooled file in bytes.
    pub size_bytes: u64,
    /// Path to the spooled upload on local disk.
    pub source_path: PathBuf,
}

impl UploadedFile {
    /// Create a new uploaded-file descriptor.
    pub fn new(
        original_name: impl Into<String>,
        declared_mime_type: impl Into<String>,
        size_bytes: u64,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            declared_mime_type: declared_mime_type.into(),
            size_bytes,
            source_path: source_path.into(),
        }
    }
}
