//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable audit log entry recording an asset mutation.
///
/// Entries are written once and never updated; no business logic reads them
/// back; they exist for the console's audit view and for operators.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// The staff member who performed the action.
    pub actor_id: Uuid,
    /// The action that was performed (e.g. `"asset.replace"`).
    pub action: String,
    /// The table the mutated record lives in.
    pub target_table: String,
    /// The mutated record's ID.
    pub record_id: Uuid,
    /// Structured snapshot of the record before the mutation.
    pub old_values: Option<serde_json::Value>,
    /// Structured snapshot of the record after the mutation.
    pub new_values: Option<serde_json::Value>,
    /// IP address of the actor.
    pub ip_address: Option<String>,
    /// User-Agent of the actor.
    pub user_agent: Option<String>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a new audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    /// The staff member who performed the action.
    pub actor_id: Uuid,
    /// The action performed.
    pub action: String,
    /// The table the mutated record lives in.
    pub target_table: String,
    /// The mutated record's ID.
    pub record_id: Uuid,
    /// Pre-mutation snapshot.
    pub old_values: Option<serde_json::Value>,
    /// Post-mutation snapshot.
    pub new_values: Option<serde_json::Value>,
    /// Actor's IP address.
    pub ip_address: Option<String>,
    /// Actor's User-Agent.
    pub user_agent: Option<String>,
}
