//! In-memory repository implementations.
//!
//! These back deterministic tests of the service layer without a running
//! PostgreSQL instance. They enforce the same constraints the schema does,
//! most importantly the unique `stored_file_name`.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use mediadesk_core::error::AppError;
use mediadesk_core::result::AppResult;
use mediadesk_core::types::filter::AssetFilter;
use mediadesk_core::types::pagination::{PageRequest, PageResponse};
use mediadesk_entity::asset::{Asset, CreateAsset};
use mediadesk_entity::audit::CreateAuditLogEntry;

use super::asset::AssetRecords;
use super::audit::AuditSink;

/// In-memory asset record store.
#[derive(Debug, Default)]
pub struct MemoryAssetRecords {
    rows: Mutex<Vec<Asset>>,
}

impl MemoryAssetRecords {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetRecords for MemoryAssetRecords {
    async fn insert(&self, data: &CreateAsset) -> AppResult<Asset> {
        let mut rows = self.rows.lock().expect("asset store poisoned");
        if rows
            .iter()
            .any(|a| a.stored_file_name == data.stored_file_name)
        {
            return Err(AppError::conflict(format!(
                "An asset with stored name '{}' already exists",
                data.stored_file_name
            )));
        }

        let asset = Asset {
            id: Uuid::new_v4(),
            original_name: data.original_name.clone(),
            stored_file_name: data.stored_file_name.clone(),
            relative_path: data.relative_path.clone(),
            mime_type: data.mime_type.clone(),
            size_bytes: data.size_bytes,
            category: data.category.clone(),
            uploader_id: data.uploader_id,
            parent_id: data.parent_id,
            is_primary: data.is_primary,
            sort_order: data.sort_order,
            created_at: Utc::now(),
        };
        rows.push(asset.clone());
        Ok(asset)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Asset>> {
        let rows = self.rows.lock().expect("asset store poisoned");
        Ok(rows.iter().find(|a| a.id == id).cloned())
    }

    async fn update(&self, asset: &Asset) -> AppResult<Asset> {
        let mut rows = self.rows.lock().expect("asset store poisoned");
        let existing = rows
            .iter_mut()
            .find(|a| a.id == asset.id)
            .ok_or_else(|| AppError::not_found(format!("Asset {} not found", asset.id)))?;

        // Mutable columns only; stored identity is never rewritten.
        existing.original_name = asset.original_name.clone();
        existing.mime_type = asset.mime_type.clone();
        existing.size_bytes = asset.size_bytes;
        existing.category = asset.category.clone();
        existing.uploader_id = asset.uploader_id;
        existing.parent_id = asset.parent_id;
        existing.is_primary = asset.is_primary;
        existing.sort_order = asset.sort_order;
        Ok(existing.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut rows = self.rows.lock().expect("asset store poisoned");
        let before = rows.len();
        rows.retain(|a| a.id != id);
        Ok(rows.len() < before)
    }

    async fn find_by_parent(&self, parent_id: Uuid) -> AppResult<Vec<Asset>> {
        let rows = self.rows.lock().expect("asset store poisoned");
        Ok(rows
            .iter()
            .filter(|a| a.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn list(
        &self,
        filter: &AssetFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Asset>> {
        let rows = self.rows.lock().expect("asset store poisoned");

        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut matched: Vec<Asset> = rows
            .iter()
            .rev() // newest insertion first, as a tie-break for equal timestamps
            .filter(|a| {
                let search_ok = needle.as_deref().is_none_or(|n| {
                    a.original_name.to_lowercase().contains(n)
                        || a.stored_file_name.to_lowercase().contains(n)
                });
                let category_ok = filter
                    .category
                    .as_deref()
                    .is_none_or(|c| a.category == c);
                search_ok && category_ok
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }
}

/// In-memory audit sink that records appended entries for assertions.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<CreateAuditLogEntry>>,
}

impl MemoryAuditSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of all entries appended so far.
    pub fn entries(&self) -> Vec<CreateAuditLogEntry> {
        self.entries.lock().expect("audit sink poisoned").clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, entry: &CreateAuditLogEntry) -> AppResult<()> {
        self.entries
            .lock()
            .expect("audit sink poisoned")
            .push(entry.clone());
        Ok(())
    }
}
