//! # mediadesk-storage
//!
//! Filesystem side of the asset lifecycle: the provisioned storage layout,
//! upload validation, stored-filename generation, binary placement and
//! removal, and thumbnail derivation.

pub mod layout;
pub mod naming;
pub mod store;
pub mod thumbnail;
pub mod validate;

pub use layout::StorageLayout;
pub use store::AssetFileStore;
pub use thumbnail::ThumbnailDeriver;
pub use validate::UploadValidator;
