//! Filter parameters for the asset list surface.

use serde::{Deserialize, Serialize};

/// Filter applied to asset list queries.
///
/// `search` matches a case-insensitive substring OR'd across the name-like
/// columns; `category` is an exact match. Ordering is always newest-first
/// and is not caller-controlled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetFilter {
    /// Case-insensitive substring matched against original and stored names.
    #[serde(default)]
    pub search: Option<String>,
    /// Exact category match.
    #[serde(default)]
    pub category: Option<String>,
}

impl AssetFilter {
    /// A filter that matches everything.
    pub fn any() -> Self {
        Self::default()
    }

    /// Whether no filter conditions are set.
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.category.is_none()
    }
}
