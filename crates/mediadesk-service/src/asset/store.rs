//! The asset store, the orchestrator of the asset lifecycle.
//!
//! Every mutating operation walks the same stages: validate, write files,
//! persist the record, then log. The filesystem and the record store fail
//! independently, so each forward step that leaves something behind is
//! paired with a compensating step; the one gap that cannot be compensated
//! (a record update failing after a replace has already overwritten the old
//! bytes) is surfaced as a distinct inconsistent-state error.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use mediadesk_core::error::{AppError, ErrorKind};
use mediadesk_core::events::AssetEvent;
use mediadesk_core::result::AppResult;
use mediadesk_core::types::filter::AssetFilter;
use mediadesk_core::types::pagination::{PageRequest, PageResponse};
use mediadesk_core::types::upload::UploadedFile;
use mediadesk_database::repositories::AssetRecords;
use mediadesk_entity::asset::{Asset, CreateAsset};
use mediadesk_storage::layout::StorageLayout;
use mediadesk_storage::naming;
use mediadesk_storage::store::AssetFileStore;
use mediadesk_storage::thumbnail::ThumbnailDeriver;
use mediadesk_storage::validate::UploadValidator;

use crate::asset::audit::AuditRecorder;
use crate::asset::locks::LockRegistry;
use crate::context::RequestContext;

/// Stage of a mutating operation, recorded in logs so operators can tell
/// where an operation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Upload checks; no side effects yet.
    Validating,
    /// Binary and thumbnail file writes.
    Writing,
    /// Record insert/update/delete.
    Persisting,
    /// Audit trail append.
    Logging,
    /// Undoing file writes after a persistence failure.
    Compensating,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validating => write!(f, "validating"),
            Self::Writing => write!(f, "writing"),
            Self::Persisting => write!(f, "persisting"),
            Self::Logging => write!(f, "logging"),
            Self::Compensating => write!(f, "compensating"),
        }
    }
}

/// Caller-supplied fields for a new asset.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct NewAssetMeta {
    /// Category for the console's filter views.
    pub category: String,
    /// Owning entity, when the asset belongs to one (e.g. a product).
    pub parent_id: Option<Uuid>,
    /// Whether this is the parent's primary asset.
    pub is_primary: bool,
    /// Display ordering among a parent's assets.
    pub sort_order: i32,
}

/// Partial metadata update. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct AssetPatch {
    /// New display name.
    pub original_name: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New primary flag.
    pub is_primary: Option<bool>,
    /// New display ordering.
    pub sort_order: Option<i32>,
}

impl AssetPatch {
    /// Merge the set fields into an asset.
    fn apply_to(&self, asset: &mut Asset) {
        if let Some(original_name) = &self.original_name {
            asset.original_name = original_name.clone();
        }
        if let Some(category) = &self.category {
            asset.category = category.clone();
        }
        if let Some(is_primary) = self.is_primary {
            asset.is_primary = is_primary;
        }
        if let Some(sort_order) = self.sort_order {
            asset.sort_order = sort_order;
        }
    }
}

/// Orchestrates the asset lifecycle across the filesystem and the record
/// store. The only component callers invoke directly.
#[derive(Clone)]
pub struct AssetStore {
    /// Asset record persistence.
    records: Arc<dyn AssetRecords>,
    /// Binary placement and removal.
    files: AssetFileStore,
    /// Upload acceptance checks.
    validator: UploadValidator,
    /// Thumbnail derivation.
    thumbnailer: ThumbnailDeriver,
    /// Audit trail recorder.
    audit: AuditRecorder,
    /// Per-id mutual exclusion for same-asset mutations.
    locks: Arc<LockRegistry>,
}

impl fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetStore").finish()
    }
}

impl AssetStore {
    /// Creates a new asset store.
    pub fn new(
        records: Arc<dyn AssetRecords>,
        files: AssetFileStore,
        validator: UploadValidator,
        thumbnailer: ThumbnailDeriver,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            records,
            files,
            validator,
            thumbnailer,
            audit,
            locks: Arc::new(LockRegistry::new()),
        }
    }

    /// Gets a single asset.
    pub async fn get(&self, asset_id: Uuid) -> AppResult<Asset> {
        self.fetch(asset_id).await
    }

    /// Filtered, paginated asset listing, newest first.
    pub async fn list(
        &self,
        filter: &AssetFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Asset>> {
        self.records.list(filter, page).await
    }

    /// Creates a new asset from a validated upload.
    ///
    /// On success exactly one record and one binary exist, plus a thumbnail
    /// unless derivation failed. A record insert failure removes every file
    /// this call wrote before the error is returned.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        upload: &UploadedFile,
        meta: NewAssetMeta,
    ) -> AppResult<Asset> {
        self.require_capability(ctx)?;
        self.create_unchecked(ctx, upload, meta).await
    }

    /// Replaces an asset's bytes in place, keeping its stored name.
    ///
    /// `stored_file_name` and `relative_path` are invariant across this
    /// call: published pages reference the asset by path, so a new name
    /// would silently break them. Only the display name, MIME type, size,
    /// patch fields, and the bytes themselves change.
    pub async fn replace(
        &self,
        ctx: &RequestContext,
        asset_id: Uuid,
        upload: &UploadedFile,
        patch: AssetPatch,
    ) -> AppResult<Asset> {
        self.require_capability(ctx)?;
        let _guard = self.locks.acquire(asset_id).await;

        let existing = self.fetch(asset_id).await?;
        self.validator.validate(upload)?;

        let stored = existing.stored_file_name.clone();
        let old_values = snapshot(&existing);

        // Retire the old bytes, then write the new ones under the same
        // stored name. Missing old files are tolerated.
        self.files.remove_image(&stored).await?;
        self.files.remove_thumbnail(&stored).await?;

        if let Err(e) = self.files.ingest(&upload.source_path, &stored).await {
            self.discard_files(&stored).await;
            return Err(e);
        }
        self.derive_thumbnail(&stored).await;

        let mut updated = existing;
        patch.apply_to(&mut updated);
        updated.original_name = upload.original_name.clone();
        updated.mime_type = upload.declared_mime_type.clone();
        updated.size_bytes = upload.size_bytes as i64;

        // The old bytes are already gone, so a persistence failure here has
        // no compensating step; operators must reconcile by hand.
        let updated = match self.records.update(&updated).await {
            Ok(asset) => asset,
            Err(e) => {
                warn!(
                    stage = %Stage::Persisting,
                    asset_id = %asset_id,
                    stored_file_name = %stored,
                    "Record update failed after the binary was replaced"
                );
                return Err(AppError::with_source(
                    ErrorKind::InconsistentState,
                    format!(
                        "Asset {asset_id}: record update failed after its binary was \
                         replaced; the record and the file at '{}' may disagree",
                        StorageLayout::relative_image_path(&stored)
                    ),
                    e,
                ));
            }
        };

        info!(
            asset_id = %updated.id,
            stored_file_name = %stored,
            size_bytes = updated.size_bytes,
            "Asset replaced in place"
        );

        self.audit
            .record(
                ctx,
                AssetEvent::Replaced {
                    asset_id: updated.id,
                    old_values,
                    new_values: snapshot(&updated),
                },
            )
            .await;

        Ok(updated)
    }

    /// Updates an asset's metadata. No file I/O.
    pub async fn update_metadata(
        &self,
        ctx: &RequestContext,
        asset_id: Uuid,
        patch: AssetPatch,
    ) -> AppResult<Asset> {
        self.require_capability(ctx)?;
        let _guard = self.locks.acquire(asset_id).await;

        let existing = self.fetch(asset_id).await?;
        let old_values = snapshot(&existing);

        let mut updated = existing;
        patch.apply_to(&mut updated);
        let updated = self.records.update(&updated).await?;

        info!(asset_id = %updated.id, "Asset metadata updated");

        self.audit
            .record(
                ctx,
                AssetEvent::MetadataUpdated {
                    asset_id: updated.id,
                    old_values,
                    new_values: snapshot(&updated),
                },
            )
            .await;

        Ok(updated)
    }

    /// Deletes an asset.
    ///
    /// Record removal is the operation's success boundary; the binary and
    /// thumbnail are unlinked best-effort afterwards, tolerating files that
    /// are already gone. Deleting an unknown id returns not-found.
    pub async fn delete(&self, ctx: &RequestContext, asset_id: Uuid) -> AppResult<()> {
        self.require_capability(ctx)?;
        let _guard = self.locks.acquire(asset_id).await;

        let existing = self.fetch(asset_id).await?;
        let old_values = snapshot(&existing);

        let removed = self.records.delete(asset_id).await?;
        if !removed {
            return Err(AppError::not_found(format!("Asset {asset_id} not found")));
        }

        self.discard_files(&existing.stored_file_name).await;

        info!(
            asset_id = %asset_id,
            stored_file_name = %existing.stored_file_name,
            "Asset deleted"
        );

        self.audit
            .record(
                ctx,
                AssetEvent::Deleted {
                    asset_id,
                    old_values,
                },
            )
            .await;

        Ok(())
    }

    /// Replaces the single asset owned by a parent entity.
    ///
    /// A parent keeps exactly one primary asset: every asset it currently
    /// owns is retired (record deleted, files unlinked) before the new one
    /// is created with `is_primary` set.
    pub async fn replace_for_parent(
        &self,
        ctx: &RequestContext,
        parent_id: Uuid,
        upload: &UploadedFile,
        meta: NewAssetMeta,
    ) -> AppResult<Asset> {
        self.require_capability(ctx)?;
        let _guard = self.locks.acquire(parent_id).await;

        for asset in self.records.find_by_parent(parent_id).await? {
            let old_values = snapshot(&asset);
            if self.records.delete(asset.id).await? {
                self.discard_files(&asset.stored_file_name).await;
                info!(
                    parent_id = %parent_id,
                    asset_id = %asset.id,
                    "Retired previous parent asset"
                );
                self.audit
                    .record(
                        ctx,
                        AssetEvent::Deleted {
                            asset_id: asset.id,
                            old_values,
                        },
                    )
                    .await;
            }
        }

        let meta = NewAssetMeta {
            parent_id: Some(parent_id),
            is_primary: true,
            ..meta
        };
        self.create_unchecked(ctx, upload, meta).await
    }

    /// Create flow shared by [`Self::create`] and
    /// [`Self::replace_for_parent`]; capability is checked by the callers.
    async fn create_unchecked(
        &self,
        ctx: &RequestContext,
        upload: &UploadedFile,
        meta: NewAssetMeta,
    ) -> AppResult<Asset> {
        self.validator.validate(upload)?;

        let stored = naming::generate_stored_name(&upload.original_name);

        if let Err(e) = self.files.ingest(&upload.source_path, &stored).await {
            // A partial copy may exist; remove it before surfacing the error.
            self.discard_files(&stored).await;
            return Err(e);
        }
        let thumbnail = self.derive_thumbnail(&stored).await;

        let data = CreateAsset {
            original_name: upload.original_name.clone(),
            stored_file_name: stored.clone(),
            relative_path: StorageLayout::relative_image_path(&stored),
            mime_type: upload.declared_mime_type.clone(),
            size_bytes: upload.size_bytes as i64,
            category: meta.category,
            uploader_id: ctx.actor_id,
            parent_id: meta.parent_id,
            is_primary: meta.is_primary,
            sort_order: meta.sort_order,
        };

        let asset = match self.records.insert(&data).await {
            Ok(asset) => asset,
            Err(e) => {
                warn!(
                    stage = %Stage::Compensating,
                    stored_file_name = %stored,
                    "Record insert failed; removing the files written by this call"
                );
                self.discard_files(&stored).await;
                return Err(e);
            }
        };

        info!(
            asset_id = %asset.id,
            stored_file_name = %stored,
            size_bytes = asset.size_bytes,
            thumbnail,
            "Asset created"
        );

        self.audit
            .record(
                ctx,
                AssetEvent::Created {
                    asset_id: asset.id,
                    new_values: snapshot(&asset),
                },
            )
            .await;

        Ok(asset)
    }

    /// Derive the thumbnail for a stored name. Failure is non-fatal: the
    /// asset stays valid and serving falls back to the full image.
    async fn derive_thumbnail(&self, stored: &str) -> bool {
        let layout = self.files.layout();
        match self
            .thumbnailer
            .derive(&layout.image_path(stored), &layout.thumbnail_path(stored))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    stage = %Stage::Writing,
                    stored_file_name = %stored,
                    error = %e,
                    "Thumbnail derivation failed; serving will fall back to the full image"
                );
                false
            }
        }
    }

    /// Best-effort removal of a stored name's binary and thumbnail. Used
    /// both for compensation and for post-delete cleanup, where a failure
    /// must not change the operation's outcome.
    async fn discard_files(&self, stored: &str) {
        if let Err(e) = self.files.remove_image(stored).await {
            warn!(stored_file_name = %stored, error = %e, "Failed to remove binary");
        }
        if let Err(e) = self.files.remove_thumbnail(stored).await {
            warn!(stored_file_name = %stored, error = %e, "Failed to remove thumbnail");
        }
    }

    async fn fetch(&self, asset_id: Uuid) -> AppResult<Asset> {
        self.records
            .find_by_id(asset_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Asset {asset_id} not found")))
    }

    fn require_capability(&self, ctx: &RequestContext) -> AppResult<()> {
        if ctx.can_manage_media {
            Ok(())
        } else {
            Err(AppError::authorization(
                "Actor lacks the media management capability",
            ))
        }
    }
}

/// Structured snapshot of a record for audit old/new values.
fn snapshot(asset: &Asset) -> serde_json::Value {
    serde_json::to_value(asset).unwrap_or(serde_json::Value::Null)
}
