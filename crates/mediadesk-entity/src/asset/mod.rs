//! Asset entity.

pub mod model;

pub use model::{Asset, CreateAsset};
