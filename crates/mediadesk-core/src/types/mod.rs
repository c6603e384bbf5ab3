//! Core type definitions used across the MediaDesk workspace.

pub mod filter;
pub mod pagination;
pub mod upload;

pub use filter::AssetFilter;
pub use pagination::{PageRequest, PageResponse};
pub use upload::UploadedFile;
