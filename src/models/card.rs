//! Card listing records extracted from marketplace search pages.

use serde::{Deserialize, Serialize};

/// One extracted marketplace listing.
///
/// Every field is optional; each extractor fills in whatever the markup
/// happened to yield. Records never mutate after extraction, and
/// records without a name are dropped when results are aggregated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    /// Card or product name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Normalized price (e.g. "$0.25"), from structured markup or JSON data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Verbatim price text as captured by the streaming parser.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_raw: Option<String>,
    /// Absolute listing URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CardRecord {
    /// Record with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// True when no extractor managed to fill any field.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.price_raw.is_none() && self.url.is_none()
    }
}
