//! Asset record repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use mediadesk_core::error::{AppError, ErrorKind};
use mediadesk_core::result::AppResult;
use mediadesk_core::types::filter::AssetFilter;
use mediadesk_core::types::pagination::{PageRequest, PageResponse};
use mediadesk_entity::asset::{Asset, CreateAsset};

/// Persistence seam for asset metadata records.
///
/// The asset store depends on this trait rather than on a concrete
/// backend; [`PgAssetRecords`] is the production implementation and
/// [`super::memory::MemoryAssetRecords`] backs deterministic tests.
#[async_trait]
pub trait AssetRecords: Send + Sync + 'static {
    /// Insert a new asset record and return it.
    async fn insert(&self, data: &CreateAsset) -> AppResult<Asset>;

    /// Find an asset by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Asset>>;

    /// Update an existing asset's mutable columns and return the new row.
    ///
    /// `stored_file_name` and `relative_path` are an asset's durable
    /// identity and are never written by this method.
    async fn update(&self, asset: &Asset) -> AppResult<Asset>;

    /// Delete an asset record. Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// All assets owned by a parent entity, oldest first.
    async fn find_by_parent(&self, parent_id: Uuid) -> AppResult<Vec<Asset>>;

    /// Filtered, paginated listing, newest first.
    async fn list(
        &self,
        filter: &AssetFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Asset>>;
}

/// PostgreSQL-backed asset record repository.
#[derive(Debug, Clone)]
pub struct PgAssetRecords {
    pool: PgPool,
}

impl PgAssetRecords {
    /// Create a new asset record repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetRecords for PgAssetRecords {
    async fn insert(&self, data: &CreateAsset) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>(
            "INSERT INTO assets (original_name, stored_file_name, relative_path, mime_type, \
             size_bytes, category, uploader_id, parent_id, is_primary, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(&data.original_name)
        .bind(&data.stored_file_name)
        .bind(&data.relative_path)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(&data.category)
        .bind(data.uploader_id)
        .bind(data.parent_id)
        .bind(data.is_primary)
        .bind(data.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("assets_stored_file_name_key") =>
            {
                AppError::conflict(format!(
                    "An asset with stored name '{}' already exists",
                    data.stored_file_name
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert asset", e),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find asset", e))
    }

    async fn update(&self, asset: &Asset) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>(
            "UPDATE assets SET original_name = $2, mime_type = $3, size_bytes = $4, \
             category = $5, uploader_id = $6, parent_id = $7, is_primary = $8, sort_order = $9 \
             WHERE id = $1 RETURNING *",
        )
        .bind(asset.id)
        .bind(&asset.original_name)
        .bind(&asset.mime_type)
        .bind(asset.size_bytes)
        .bind(&asset.category)
        .bind(asset.uploader_id)
        .bind(asset.parent_id)
        .bind(asset.is_primary)
        .bind(asset.sort_order)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update asset", e))?
        .ok_or_else(|| AppError::not_found(format!("Asset {} not found", asset.id)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete asset", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_parent(&self, parent_id: Uuid) -> AppResult<Vec<Asset>> {
        sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE parent_id = $1 ORDER BY created_at ASC",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list assets by parent", e)
        })
    }

    async fn list(
        &self,
        filter: &AssetFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Asset>> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        let search_pattern = filter
            .search
            .as_deref()
            .map(|s| format!("%{}%", escape_like(s)));
        if search_pattern.is_some() {
            conditions.push(format!(
                "(original_name ILIKE ${param_idx} OR stored_file_name ILIKE ${param_idx})"
            ));
            param_idx += 1;
        }
        if filter.category.is_some() {
            conditions.push(format!("category = ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM assets {where_clause}");
        let select_sql = format!(
            "SELECT * FROM assets {where_clause} ORDER BY created_at DESC LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, Asset>(&select_sql);

        if let Some(pattern) = &search_pattern {
            count_query = count_query.bind(pattern.clone());
            select_query = select_query.bind(pattern.clone());
        }
        if let Some(category) = &filter.category {
            count_query = count_query.bind(category.clone());
            select_query = select_query.bind(category.clone());
        }

        let total = count_query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count assets", e)
        })?;

        let assets = select_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list assets", e))?;

        Ok(PageResponse::new(
            assets,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}

/// Escape LIKE/ILIKE pattern metacharacters in a user-supplied search term
/// so it matches as a literal substring.
pub(crate) fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off\\x"), "50\\%\\_off\\\\x");
    }
}
