//! Upload acceptance configuration.

use serde::{Deserialize, Serialize};

/// Limits applied to candidate uploads before any side effect.
///
/// The original system never documented its exact limits, so these are
/// explicit settings with deliberate defaults rather than hard-coded
/// constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// MIME types accepted for upload.
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
    /// Maximum upload size in bytes (default 10 MiB).
    #[serde(default = "default_max_size")]
    pub max_size_bytes: u64,
    /// Maximum thumbnail width in pixels.
    #[serde(default = "default_thumbnail_edge")]
    pub thumbnail_max_width: u32,
    /// Maximum thumbnail height in pixels.
    #[serde(default = "default_thumbnail_edge")]
    pub thumbnail_max_height: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_mime_types: default_allowed_mime_types(),
            max_size_bytes: default_max_size(),
            thumbnail_max_width: default_thumbnail_edge(),
            thumbnail_max_height: default_thumbnail_edge(),
        }
    }
}

fn default_allowed_mime_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/gif".to_string(),
        "image/webp".to_string(),
    ]
}

fn default_max_size() -> u64 {
    10_485_760 // 10 MiB
}

fn default_thumbnail_edge() -> u32 {
    320
}
