//! Text normalization for the fuzzy-matching columns.
//!
//! `book_title_norm` and `book_author_norm` are produced here and compared
//! downstream, so both functions must stay deterministic.

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of anything that is not a lowercase ASCII letter, digit or whitespace.
static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]+").unwrap());

/// Regex to collapse whitespace runs into a single space
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Trailing generator counter like " [10]" on a title.
static BRACKET_NUMBER_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\[\d+\]\s*$").unwrap());

/// Lowercase, replace punctuation with spaces and collapse whitespace.
/// e.g., "  J.R.R. Tolkien " → "j r r tolkien"
pub fn normalize_text(s: Option<&str>) -> String {
    let Some(s) = s else {
        return String::new();
    };
    let lowered = s.trim().to_lowercase();
    let stripped = NON_ALNUM.replace_all(&lowered, " ");
    MULTI_SPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Strip one trailing `[number]` suffix from a title.
/// e.g., "Understanding Sticker [10]" → "Understanding Sticker", "Foo[12]" → "Foo"
pub fn clean_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    BRACKET_NUMBER_SUFFIX.replace(trimmed, "").trim().to_string()
}
