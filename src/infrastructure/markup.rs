//! Markup stripping for description comparison
//!
//! The storefront stores formatted descriptions as HTML while the document
//! store renders plain text, so both sides are reduced to bare text before
//! the detector compares them.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Reduce formatted markup to plain text: drop tags, normalize non-breaking
/// spaces, trim surrounding whitespace.
pub fn strip_markup(markup: &str) -> String {
    if markup.is_empty() {
        return String::new();
    }
    let without_tags = TAG_PATTERN.replace_all(markup, "");
    without_tags.replace("&nbsp;", " ").trim().to_string()
}
