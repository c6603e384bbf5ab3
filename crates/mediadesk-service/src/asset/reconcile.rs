//! Reconciliation sweep across records and files.
//!
//! The filesystem and the record store share no transaction, so a crash
//! mid-operation can leave a record pointing at a missing binary, or a
//! binary with no record. The sweep scans both ways and reports what it
//! finds; it never repairs anything on its own.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use mediadesk_core::result::AppResult;
use mediadesk_core::types::filter::AssetFilter;
use mediadesk_core::types::pagination::PageRequest;
use mediadesk_database::repositories::AssetRecords;
use mediadesk_storage::layout::StorageLayout;
use mediadesk_storage::store::AssetFileStore;

/// Page size used when walking the full record set.
const SCAN_PAGE_SIZE: u64 = 100;

/// A record whose canonical binary is absent from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingBinary {
    /// The affected asset.
    pub asset_id: Uuid,
    /// Where the binary should have been.
    pub relative_path: String,
}

/// Result of one reconciliation sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Number of records scanned.
    pub scanned_records: u64,
    /// Number of files scanned (binaries and thumbnails).
    pub scanned_files: u64,
    /// Records without a binary on disk.
    pub records_missing_file: Vec<MissingBinary>,
    /// Root-relative paths of files no record references.
    pub files_without_record: Vec<String>,
}

impl ReconciliationReport {
    /// Whether the sweep found nothing to report.
    pub fn is_clean(&self) -> bool {
        self.records_missing_file.is_empty() && self.files_without_record.is_empty()
    }
}

/// Scans records and files both ways and reports mismatches.
#[derive(Clone)]
pub struct ReconciliationSweep {
    records: Arc<dyn AssetRecords>,
    files: AssetFileStore,
}

impl std::fmt::Debug for ReconciliationSweep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationSweep").finish()
    }
}

impl ReconciliationSweep {
    /// Creates a new sweep over the given records and file store.
    pub fn new(records: Arc<dyn AssetRecords>, files: AssetFileStore) -> Self {
        Self { records, files }
    }

    /// Run one sweep.
    ///
    /// A record with a binary but no thumbnail is *not* reported: a missing
    /// thumbnail is the documented degraded mode after a failed derivation,
    /// and serving falls back to the full image.
    pub async fn run(&self) -> AppResult<ReconciliationReport> {
        let mut stored_names: HashSet<String> = HashSet::new();
        let mut report = ReconciliationReport::default();

        let mut page_no = 1;
        loop {
            let page = self
                .records
                .list(&AssetFilter::any(), &PageRequest::new(page_no, SCAN_PAGE_SIZE))
                .await?;
            let fetched = page.items.len();
            report.scanned_records += fetched as u64;

            for asset in page.items {
                if !self.files.image_exists(&asset.stored_file_name).await {
                    report.records_missing_file.push(MissingBinary {
                        asset_id: asset.id,
                        relative_path: asset.relative_path.clone(),
                    });
                }
                stored_names.insert(asset.stored_file_name);
            }

            if fetched == 0 || page_no >= page.total_pages {
                break;
            }
            page_no += 1;
        }

        for name in self.files.list_images().await? {
            report.scanned_files += 1;
            if !stored_names.contains(&name) {
                report
                    .files_without_record
                    .push(StorageLayout::relative_image_path(&name));
            }
        }
        for name in self.files.list_thumbnails().await? {
            report.scanned_files += 1;
            if !stored_names.contains(&name) {
                report
                    .files_without_record
                    .push(StorageLayout::relative_thumbnail_path(&name));
            }
        }

        if report.is_clean() {
            info!(
                records = report.scanned_records,
                files = report.scanned_files,
                "Reconciliation sweep clean"
            );
        } else {
            warn!(
                records_missing_file = report.records_missing_file.len(),
                files_without_record = report.files_without_record.len(),
                "Reconciliation sweep found mismatches"
            );
        }

        Ok(report)
    }
}
