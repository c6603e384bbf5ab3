//! Audit log repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use mediadesk_core::error::{AppError, ErrorKind};
use mediadesk_core::result::AppResult;
use mediadesk_core::types::pagination::{PageRequest, PageResponse};
use mediadesk_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

/// Append-only sink for audit entries.
///
/// Implemented by [`AuditLogRepository`] in production and by
/// [`super::memory::MemoryAuditSink`] in tests. Callers treat failures as
/// operational warnings; a failed append never fails the mutation that
/// produced it.
#[async_trait]
pub trait AuditSink: Send + Sync + 'static {
    /// Append one audit entry.
    async fn append(&self, entry: &CreateAuditLogEntry) -> AppResult<()>;
}

/// PostgreSQL-backed audit log repository.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an audit log entry.
    pub async fn create(&self, data: &CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        sqlx::query_as::<_, AuditLogEntry>(
            "INSERT INTO audit_log (actor_id, action, target_table, record_id, old_values, \
             new_values, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(data.actor_id)
        .bind(&data.action)
        .bind(&data.target_table)
        .bind(data.record_id)
        .bind(&data.old_values)
        .bind(&data.new_values)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create audit entry", e))
    }

    /// Find an audit entry by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AuditLogEntry>> {
        sqlx::query_as::<_, AuditLogEntry>("SELECT * FROM audit_log WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find audit entry", e)
            })
    }

    /// Search the audit log with optional filters, newest first. Backs the
    /// console's audit view.
    pub async fn search(
        &self,
        actor_id: Option<Uuid>,
        action: Option<&str>,
        record_id: Option<Uuid>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        if actor_id.is_some() {
            conditions.push(format!("actor_id = ${param_idx}"));
            param_idx += 1;
        }
        if action.is_some() {
            conditions.push(format!("action = ${param_idx}"));
            param_idx += 1;
        }
        if record_id.is_some() {
            conditions.push(format!("record_id = ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM audit_log {where_clause}");
        let select_sql = format!(
            "SELECT * FROM audit_log {where_clause} ORDER BY created_at DESC LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, AuditLogEntry>(&select_sql);

        if let Some(aid) = actor_id {
            count_query = count_query.bind(aid);
            select_query = select_query.bind(aid);
        }
        if let Some(a) = action {
            count_query = count_query.bind(a.to_string());
            select_query = select_query.bind(a.to_string());
        }
        if let Some(rid) = record_id {
            count_query = count_query.bind(rid);
            select_query = select_query.bind(rid);
        }

        let total = count_query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count audit entries", e)
        })?;

        let entries = select_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to search audit log", e)
            })?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}

#[async_trait]
impl AuditSink for AuditLogRepository {
    async fn append(&self, entry: &CreateAuditLogEntry) -> AppResult<()> {
        self.create(entry).await.map(|_| ())
    }
}
