//! Asset entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A managed media asset: a binary file on disk plus this metadata record.
///
/// `stored_file_name` is assigned once at creation and is the asset's
/// durable public identity; published pages reference
/// `images/<stored_file_name>`, so an in-place replacement of the bytes must
/// leave it untouched.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    /// Unique asset identifier.
    pub id: Uuid,
    /// The file name as originally uploaded (display only).
    pub original_name: String,
    /// The durable on-disk file name; unique across all assets.
    pub stored_file_name: String,
    /// Root-relative path of the canonical binary (`images/<stored_file_name>`).
    pub relative_path: String,
    /// MIME type of the current bytes.
    pub mime_type: String,
    /// Size of the current bytes.
    pub size_bytes: i64,
    /// Free-form grouping used by the console's filter views.
    pub category: String,
    /// The staff member who uploaded the current bytes.
    pub uploader_id: Uuid,
    /// Owning entity for parent-associated assets (e.g. a product).
    pub parent_id: Option<Uuid>,
    /// Whether this is the parent's primary asset. Meaningful only when
    /// `parent_id` is set.
    pub is_primary: bool,
    /// Display ordering among a parent's assets.
    pub sort_order: i32,
    /// When the asset was created.
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// The file extension of the stored name (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.stored_file_name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.stored_file_name)
            .map(|ext| ext.to_lowercase())
    }
}

/// Data required to create a new asset record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAsset {
    /// The originally uploaded file name.
    pub original_name: String,
    /// The generated durable file name.
    pub stored_file_name: String,
    /// Root-relative path of the canonical binary.
    pub relative_path: String,
    /// MIME type of the bytes.
    pub mime_type: String,
    /// Size of the bytes.
    pub size_bytes: i64,
    /// Category for filter views.
    pub category: String,
    /// The uploading staff member.
    pub uploader_id: Uuid,
    /// Owning entity, if parent-associated.
    pub parent_id: Option<Uuid>,
    /// Whether this is the parent's primary asset.
    pub is_primary: bool,
    /// Display ordering among a parent's assets.
    pub sort_order: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset_with_stored_name(name: &str) -> Asset {
        Asset {
            id: Uuid::new_v4(),
            original_name: "logo.png".to_string(),
            stored_file_name: name.to_string(),
            relative_path: format!("images/{name}"),
            mime_type: "image/png".to_string(),
            size_bytes: 1,
            category: "logos".to_string(),
            uploader_id: Uuid::new_v4(),
            parent_id: None,
            is_primary: false,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_extension() {
        assert_eq!(
            asset_with_stored_name("abc123.PNG").extension(),
            Some("png".to_string())
        );
        assert_eq!(asset_with_stored_name("noext").extension(), None);
    }
}
