//! Asset-related domain events.
//!
//! Events are emitted by the asset store only after the primary mutation has
//! committed, and are consumed by the audit recorder. Snapshots are
//! structured JSON captures of the record before/after the mutation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events describing committed asset mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AssetEvent {
    /// A new asset was created.
    Created {
        /// The asset ID.
        asset_id: Uuid,
        /// Snapshot of the record after creation.
        new_values: serde_json::Value,
    },
    /// An asset's bytes (and possibly metadata) were replaced in place.
    Replaced {
        /// The asset ID.
        asset_id: Uuid,
        /// Snapshot of the record before the replacement.
        old_values: serde_json::Value,
        /// Snapshot of the record after the replacement.
        new_values: serde_json::Value,
    },
    /// An asset's metadata was updated without touching its bytes.
    MetadataUpdated {
        /// The asset ID.
        asset_id: Uuid,
        /// Snapshot of the record before the update.
        old_values: serde_json::Value,
        /// Snapshot of the record after the update.
        new_values: serde_json::Value,
    },
    /// An asset was deleted.
    Deleted {
        /// The asset ID.
        asset_id: Uuid,
        /// Snapshot of the record before deletion.
        old_values: serde_json::Value,
    },
}

impl AssetEvent {
    /// The audit action name for this event.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Created { .. } => "asset.create",
            Self::Replaced { .. } => "asset.replace",
            Self::MetadataUpdated { .. } => "asset.update",
            Self::Deleted { .. } => "asset.delete",
        }
    }

    /// The ID of the asset the event concerns.
    pub fn asset_id(&self) -> Uuid {
        match self {
            Self::Created { asset_id, .. }
            | Self::Replaced { asset_id, .. }
            | Self::MetadataUpdated { asset_id, .. }
            | Self::Deleted { asset_id, .. } => *asset_id,
        }
    }

    /// The pre-mutation snapshot, if the event carries one.
    pub fn old_values(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Created { .. } => None,
            Self::Replaced { old_values, .. }
            | Self::MetadataUpdated { old_values, .. }
            | Self::Deleted { old_values, .. } => Some(old_values),
        }
    }

    /// The post-mutation snapshot, if the event carries one.
    pub fn new_values(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Created { new_values, .. }
            | Self::Replaced { new_values, .. }
            | Self::MetadataUpdated { new_values, .. } => Some(new_values),
            Self::Deleted { .. } => None,
        }
    }
}
