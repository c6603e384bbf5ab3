//! Repository implementations for MediaDesk entities.
//!
//! The [`asset::AssetRecords`] and [`audit::AuditSink`] traits are the
//! persistence seams consumed by the service layer; PostgreSQL
//! implementations live beside them, and [`memory`] provides in-memory
//! implementations for deterministic tests.

pub mod asset;
pub mod audit;
pub mod memory;

pub use asset::{AssetRecords, PgAssetRecords};
pub use audit::{AuditLogRepository, AuditSink};
pub use memory::{MemoryAssetRecords, MemoryAuditSink};
