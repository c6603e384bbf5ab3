//! # mediadesk-core
//!
//! Core crate for MediaDesk, the media asset subsystem of the trading
//! company's administrative console. Contains configuration schemas, domain
//! events, pagination/filter types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other MediaDesk crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
