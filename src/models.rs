//! Core data models for the taxonomy import.
//!
//! Source rows as read from the CSV, and the transformed rows written to the
//! books table.

use serde::Deserialize;

// ============================================================================
// Constants
// ============================================================================

/// Provenance value written to `source_type` for every imported row.
pub const SEED_SOURCE_TYPE: &str = "taxonomy_seed";

/// Legacy title prefix marking seed rows in tables without `source_type`.
pub const LEGACY_TITLE_PREFIX: &str = "__TAXONOMY__::";

/// Default target table.
pub const DEFAULT_TABLE: &str = "books";

/// CSV headers that must be present.
pub const REQUIRED_HEADERS: [&str; 4] = [
    "book_title",
    "book_author",
    "trademe_categories",
    "shopify_tags",
];

// ============================================================================
// Source Models
// ============================================================================

/// One CSV row. Extra columns are ignored; missing trailing fields are `None`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SourceRecord {
    #[serde(default)]
    pub book_title: Option<String>,
    #[serde(default)]
    pub book_author: Option<String>,
    #[serde(default)]
    pub trademe_categories: Option<String>,
    #[serde(default)]
    pub shopify_tags: Option<String>,
}

// ============================================================================
// Output Models
// ============================================================================

/// Values shared by every row of one import run.
#[derive(Clone, Debug)]
pub struct BatchContext {
    /// UTC timestamp captured once, e.g. `2026-10-16T23:49:00Z`.
    pub now: String,
}

impl BatchContext {
    pub fn new(now: impl Into<String>) -> Self {
        Self { now: now.into() }
    }

    /// Context stamped with the current UTC time at second precision.
    pub fn capture() -> Self {
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        Self { now }
    }
}

/// A row ready for insertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformedRecord {
    /// Generated only under the text-UUID id strategy.
    pub id: Option<String>,
    pub book_title: String,
    pub book_author: String,
    pub book_title_norm: String,
    pub book_author_norm: String,
    pub trademe_categories: String,
    pub shopify_tags: String,
    pub created_at: String,
    pub updated_at: String,
    pub source_type: &'static str,
    /// Whether `shopify_tags` had to be coerced into an array.
    pub tags_repaired: bool,
}
