//! Asset storage configuration.

use serde::{Deserialize, Serialize};

/// Filesystem layout configuration for asset binaries.
///
/// The canonical originals live under `<root_path>/images/` and derived
/// thumbnails under `<root_path>/thumbnails/`; those two directory names are
/// fixed by the public path contract and are not configurable. Persisted
/// asset paths are relative to `root_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory under which the `images/` and `thumbnails/`
    /// directories are provisioned at startup.
    #[serde(default = "default_root_path")]
    pub root_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
        }
    }
}

fn default_root_path() -> String {
    "./data/media".to_string()
}
