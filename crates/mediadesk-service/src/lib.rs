//! # mediadesk-service
//!
//! Business logic for the asset lifecycle. The [`AssetStore`] orchestrator
//! is the only entry point callers use; it composes upload validation,
//! binary placement, thumbnail derivation, record persistence, and the
//! audit trail with defined ordering and compensating actions.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod asset;
pub mod context;

pub use asset::{
    AssetPatch, AssetStore, AuditMode, AuditRecorder, NewAssetMeta, ReconciliationReport,
    ReconciliationSweep,
};
pub use context::RequestContext;
