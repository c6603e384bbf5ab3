//! Asset lifecycle services.

pub mod audit;
pub mod locks;
pub mod reconcile;
pub mod store;

pub use audit::{AuditMode, AuditRecorder};
pub use reconcile::{MissingBinary, ReconciliationReport, ReconciliationSweep};
pub use store::{AssetPatch, AssetStore, NewAssetMeta, Stage};
