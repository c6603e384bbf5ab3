//! Audit recording for committed asset mutations.

use std::sync::Arc;

use tracing::warn;

use mediadesk_core::events::AssetEvent;
use mediadesk_database::repositories::AuditSink;
use mediadesk_entity::audit::CreateAuditLogEntry;

use crate::context::RequestContext;

/// How audit entries are written relative to the calling operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditMode {
    /// Write on a spawned task; the operation does not wait. Production
    /// default.
    Deferred,
    /// Await the write before returning. Used by deterministic tests.
    Synchronous,
}

/// Consumes asset domain events and appends audit entries.
///
/// Recording happens strictly after the primary mutation has committed. A
/// failed write is surfaced to the operational log and then dropped; the
/// audit trail never rolls back or fails an operation.
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
    mode: AuditMode,
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder")
            .field("mode", &self.mode)
            .finish()
    }
}

impl AuditRecorder {
    /// Create a recorder over a sink.
    pub fn new(sink: Arc<dyn AuditSink>, mode: AuditMode) -> Self {
        Self { sink, mode }
    }

    /// Record one committed mutation.
    pub async fn record(&self, ctx: &RequestContext, event: AssetEvent) {
        let entry = CreateAuditLogEntry {
            actor_id: ctx.actor_id,
            action: event.action().to_string(),
            target_table: "assets".to_string(),
            record_id: event.asset_id(),
            old_values: event.old_values().cloned(),
            new_values: event.new_values().cloned(),
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
        };

        match self.mode {
            AuditMode::Deferred => {
                let sink = Arc::clone(&self.sink);
                tokio::spawn(async move {
                    if let Err(e) = sink.append(&entry).await {
                        warn!(
                            action = %entry.action,
                            record_id = %entry.record_id,
                            error = %e,
                            "Audit write failed"
                        );
                    }
                });
            }
            AuditMode::Synchronous => {
                if let Err(e) = self.sink.append(&entry).await {
                    warn!(
                        action = %entry.action,
                        record_id = %entry.record_id,
                        error = %e,
                        "Audit write failed"
                    );
                }
            }
        }
    }
}
