//! End-to-end tests of the asset lifecycle against the in-memory record
//! store and a temporary storage root.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use mediadesk_core::config::storage::StorageConfig;
use mediadesk_core::config::upload::UploadConfig;
use mediadesk_core::error::ErrorKind;
use mediadesk_core::types::filter::AssetFilter;
use mediadesk_core::types::pagination::PageRequest;
use mediadesk_core::types::upload::UploadedFile;
use mediadesk_database::repositories::{AssetRecords, MemoryAssetRecords, MemoryAuditSink};
use mediadesk_service::{
    AssetPatch, AssetStore, AuditMode, AuditRecorder, NewAssetMeta, RequestContext,
};
use mediadesk_storage::{AssetFileStore, StorageLayout, ThumbnailDeriver, UploadValidator};

struct Harness {
    _root: tempfile::TempDir,
    store: AssetStore,
    records: Arc<MemoryAssetRecords>,
    audit: Arc<MemoryAuditSink>,
    files: AssetFileStore,
    spool: PathBuf,
}

impl Harness {
    async fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let storage_config = StorageConfig {
            root_path: root.path().join("media").to_string_lossy().into_owned(),
        };
        let layout = StorageLayout::provision(&storage_config).await.unwrap();
        let files = AssetFileStore::new(layout);

        let records = Arc::new(MemoryAssetRecords::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let store = AssetStore::new(
            records.clone(),
            files.clone(),
            UploadValidator::from_config(&UploadConfig::default()),
            ThumbnailDeriver::new(32, 32),
            AuditRecorder::new(audit.clone(), AuditMode::Synchronous),
        );

        let spool = root.path().join("spool");
        std::fs::create_dir_all(&spool).unwrap();

        Self {
            _root: root,
            store,
            records,
            audit,
            files,
            spool,
        }
    }

    /// Spool a real PNG of the given dimensions and describe it as an upload.
    fn png_upload(&self, name: &str, width: u32, height: u32) -> (UploadedFile, Vec<u8>) {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        let bytes = buffer.into_inner();

        let path = self.spool.join(format!("{}-{name}", Uuid::new_v4().simple()));
        std::fs::write(&path, &bytes).unwrap();
        (
            UploadedFile::new(name, "image/png", bytes.len() as u64, path),
            bytes,
        )
    }

    /// Spool arbitrary bytes under an arbitrary declared type.
    fn raw_upload(&self, name: &str, mime: &str, bytes: &[u8]) -> UploadedFile {
        let path = self.spool.join(format!("{}-{name}", Uuid::new_v4().simple()));
        std::fs::write(&path, bytes).unwrap();
        UploadedFile::new(name, mime, bytes.len() as u64, path)
    }

    fn disk_bytes(&self, stored: &str) -> Vec<u8> {
        std::fs::read(self.files.layout().image_path(stored)).unwrap()
    }
}

fn ctx() -> RequestContext {
    RequestContext::new(
        Uuid::new_v4(),
        true,
        Some("203.0.113.7".to_string()),
        Some("console-test".to_string()),
    )
}

fn logos() -> NewAssetMeta {
    NewAssetMeta {
        category: "logos".to_string(),
        ..NewAssetMeta::default()
    }
}

#[tokio::test]
async fn test_create_places_record_binary_and_thumbnail() {
    let h = Harness::new().await;
    let (upload, bytes) = h.png_upload("logo.png", 64, 64);

    let asset = h.store.create(&ctx(), &upload, logos()).await.unwrap();

    assert_eq!(asset.original_name, "logo.png");
    assert_ne!(asset.stored_file_name, "logo.png");
    assert_eq!(
        asset.relative_path,
        format!("images/{}", asset.stored_file_name)
    );
    assert_eq!(asset.mime_type, "image/png");
    assert_eq!(asset.size_bytes, bytes.len() as i64);
    assert_eq!(asset.category, "logos");

    assert!(h.files.image_exists(&asset.stored_file_name).await);
    assert!(h.files.thumbnail_exists(&asset.stored_file_name).await);
    assert_eq!(h.disk_bytes(&asset.stored_file_name), bytes);

    // Round trip: the stored record matches what create returned.
    let fetched = h.store.get(asset.id).await.unwrap();
    assert_eq!(fetched.stored_file_name, asset.stored_file_name);
    assert_eq!(fetched.category, "logos");

    let entries = h.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "asset.create");
    assert_eq!(entries[0].record_id, asset.id);
    assert!(entries[0].old_values.is_none());
    assert!(entries[0].new_values.is_some());
}

#[tokio::test]
async fn test_create_rejects_disallowed_type_without_writes() {
    let h = Harness::new().await;
    let upload = h.raw_upload("tool.exe", "application/x-msdownload", b"MZ\x90");

    let err = h.store.create(&ctx(), &upload, logos()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(h.files.list_images().await.unwrap().is_empty());
    assert!(h.files.list_thumbnails().await.unwrap().is_empty());
    assert!(h.audit.entries().is_empty());
}

#[tokio::test]
async fn test_replace_preserves_stored_identity() {
    let h = Harness::new().await;
    let (first, first_bytes) = h.png_upload("logo.png", 64, 64);
    let created = h.store.create(&ctx(), &first, logos()).await.unwrap();
    let stored = created.stored_file_name.clone();

    let (second, second_bytes) = h.png_upload("new-logo.png", 16, 16);
    let replaced = h
        .store
        .replace(&ctx(), created.id, &second, AssetPatch::default())
        .await
        .unwrap();

    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.stored_file_name, stored);
    assert_eq!(replaced.relative_path, created.relative_path);
    assert_eq!(replaced.original_name, "new-logo.png");
    assert_eq!(replaced.size_bytes, second_bytes.len() as i64);

    let on_disk = h.disk_bytes(&stored);
    assert_ne!(on_disk, first_bytes);
    assert_eq!(on_disk, second_bytes);
    assert!(h.files.thumbnail_exists(&stored).await);

    let entries = h.audit.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].action, "asset.replace");
    let old = entries[1].old_values.as_ref().unwrap();
    assert_eq!(old["original_name"], "logo.png");
    let new = entries[1].new_values.as_ref().unwrap();
    assert_eq!(new["original_name"], "new-logo.png");
}

#[tokio::test]
async fn test_delete_removes_files_and_second_delete_is_not_found() {
    let h = Harness::new().await;
    let (upload, _) = h.png_upload("logo.png", 64, 64);
    let asset = h.store.create(&ctx(), &upload, logos()).await.unwrap();
    let stored = asset.stored_file_name.clone();

    h.store.delete(&ctx(), asset.id).await.unwrap();

    assert!(!h.files.image_exists(&stored).await);
    assert!(!h.files.thumbnail_exists(&stored).await);
    assert_eq!(
        h.store.get(asset.id).await.unwrap_err().kind,
        ErrorKind::NotFound
    );
    assert_eq!(
        h.store.delete(&ctx(), asset.id).await.unwrap_err().kind,
        ErrorKind::NotFound
    );

    let entries = h.audit.entries();
    assert_eq!(entries[1].action, "asset.delete");
    assert!(entries[1].old_values.is_some());
    assert!(entries[1].new_values.is_none());
}

#[tokio::test]
async fn test_update_metadata_touches_no_files() {
    let h = Harness::new().await;
    let (upload, bytes) = h.png_upload("logo.png", 64, 64);
    let asset = h.store.create(&ctx(), &upload, logos()).await.unwrap();

    let patch = AssetPatch {
        original_name: Some("spring-logo.png".to_string()),
        category: Some("banners".to_string()),
        ..AssetPatch::default()
    };
    let updated = h
        .store
        .update_metadata(&ctx(), asset.id, patch)
        .await
        .unwrap();

    assert_eq!(updated.original_name, "spring-logo.png");
    assert_eq!(updated.category, "banners");
    assert_eq!(updated.stored_file_name, asset.stored_file_name);
    assert_eq!(h.disk_bytes(&asset.stored_file_name), bytes);

    let entries = h.audit.entries();
    assert_eq!(entries[1].action, "asset.update");
}

#[tokio::test]
async fn test_replace_for_parent_retires_previous_assets() {
    let h = Harness::new().await;
    let parent_id = Uuid::new_v4();

    let (first, _) = h.png_upload("old-product.png", 64, 64);
    let old = h
        .store
        .replace_for_parent(&ctx(), parent_id, &first, logos())
        .await
        .unwrap();
    assert_eq!(old.parent_id, Some(parent_id));
    assert!(old.is_primary);

    let (second, _) = h.png_upload("new-product.png", 32, 32);
    let new = h
        .store
        .replace_for_parent(&ctx(), parent_id, &second, logos())
        .await
        .unwrap();

    // Exactly one primary asset remains for the parent.
    let owned = h.records.find_by_parent(parent_id).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, new.id);
    assert!(owned[0].is_primary);

    assert!(!h.files.image_exists(&old.stored_file_name).await);
    assert!(h.files.image_exists(&new.stored_file_name).await);

    let actions: Vec<String> = h.audit.entries().iter().map(|e| e.action.clone()).collect();
    assert_eq!(actions, vec!["asset.create", "asset.delete", "asset.create"]);
}

#[tokio::test]
async fn test_concurrent_replaces_resolve_to_one_consistent_state() {
    let h = Harness::new().await;
    let (base, _) = h.png_upload("base.png", 8, 8);
    let asset = h.store.create(&ctx(), &base, logos()).await.unwrap();

    let (upload_a, bytes_a) = h.png_upload("a.png", 64, 64);
    let (upload_b, bytes_b) = h.png_upload("b.png", 16, 16);

    let store_a = h.store.clone();
    let store_b = h.store.clone();
    let id = asset.id;
    let task_a = tokio::spawn(async move {
        store_a
            .replace(&ctx(), id, &upload_a, AssetPatch::default())
            .await
    });
    let task_b = tokio::spawn(async move {
        store_b
            .replace(&ctx(), id, &upload_b, AssetPatch::default())
            .await
    });
    task_a.await.unwrap().unwrap();
    task_b.await.unwrap().unwrap();

    // The final state must be entirely one caller's bytes and metadata,
    // never a mix.
    let final_asset = h.store.get(id).await.unwrap();
    let on_disk = h.disk_bytes(&final_asset.stored_file_name);
    if final_asset.original_name == "a.png" {
        assert_eq!(on_disk, bytes_a);
        assert_eq!(final_asset.size_bytes, bytes_a.len() as i64);
    } else {
        assert_eq!(final_asset.original_name, "b.png");
        assert_eq!(on_disk, bytes_b);
        assert_eq!(final_asset.size_bytes, bytes_b.len() as i64);
    }
}

#[tokio::test]
async fn test_mutations_require_media_capability() {
    let h = Harness::new().await;
    let viewer = RequestContext::new(Uuid::new_v4(), false, None, None);
    let (upload, _) = h.png_upload("logo.png", 8, 8);

    let err = h.store.create(&viewer, &upload, logos()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert!(h.files.list_images().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_thumbnail_failure_is_non_fatal() {
    let h = Harness::new().await;
    // Passes validation (name, type, size) but cannot be decoded as an
    // image, so thumbnail derivation fails while the asset itself survives.
    let upload = h.raw_upload("scan.png", "image/png", b"not really a png");

    let asset = h.store.create(&ctx(), &upload, logos()).await.unwrap();

    assert!(h.files.image_exists(&asset.stored_file_name).await);
    assert!(!h.files.thumbnail_exists(&asset.stored_file_name).await);
    assert!(h.store.get(asset.id).await.is_ok());
}

#[tokio::test]
async fn test_failed_insert_compensates_file_writes() {
    use async_trait::async_trait;
    use mediadesk_core::error::AppError;
    use mediadesk_core::result::AppResult;
    use mediadesk_core::types::pagination::PageResponse;
    use mediadesk_entity::asset::{Asset, CreateAsset};

    /// Record store whose inserts always fail.
    #[derive(Debug, Default)]
    struct FailingRecords;

    #[async_trait]
    impl AssetRecords for FailingRecords {
        async fn insert(&self, _data: &CreateAsset) -> AppResult<Asset> {
            Err(AppError::database("simulated insert failure"))
        }
        async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<Asset>> {
            Ok(None)
        }
        async fn update(&self, asset: &Asset) -> AppResult<Asset> {
            Err(AppError::not_found(format!("Asset {} not found", asset.id)))
        }
        async fn delete(&self, _id: Uuid) -> AppResult<bool> {
            Ok(false)
        }
        async fn find_by_parent(&self, _parent_id: Uuid) -> AppResult<Vec<Asset>> {
            Ok(Vec::new())
        }
        async fn list(
            &self,
            _filter: &AssetFilter,
            page: &PageRequest,
        ) -> AppResult<PageResponse<Asset>> {
            Ok(PageResponse::new(Vec::new(), page.page, page.page_size, 0))
        }
    }

    let h = Harness::new().await;
    let store = AssetStore::new(
        Arc::new(FailingRecords),
        h.files.clone(),
        UploadValidator::from_config(&UploadConfig::default()),
        ThumbnailDeriver::new(32, 32),
        AuditRecorder::new(h.audit.clone(), AuditMode::Synchronous),
    );

    let (upload, _) = h.png_upload("logo.png", 64, 64);
    let err = store.create(&ctx(), &upload, logos()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Database);
    // The binary and thumbnail written by this call were compensated away.
    assert!(h.files.list_images().await.unwrap().is_empty());
    assert!(h.files.list_thumbnails().await.unwrap().is_empty());
    assert!(h.audit.entries().is_empty());
}

#[tokio::test]
async fn test_list_filters_and_orders_newest_first() {
    let h = Harness::new().await;
    for (name, category) in [
        ("logo-1.png", "logos"),
        ("logo-2.png", "logos"),
        ("banner.png", "banners"),
    ] {
        let (upload, _) = h.png_upload(name, 8, 8);
        let meta = NewAssetMeta {
            category: category.to_string(),
            ..NewAssetMeta::default()
        };
        h.store.create(&ctx(), &upload, meta).await.unwrap();
    }

    let filter = AssetFilter {
        search: Some("logo".to_string()),
        category: Some("logos".to_string()),
    };
    let page = h
        .store
        .list(&filter, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_items, 2);
    assert_eq!(page.total_pages, 1);
    assert!(page.items.iter().all(|a| a.category == "logos"));
}
