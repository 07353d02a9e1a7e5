//! Scrapes the model's free-text reply for the `Category:` and
//! `Suggested Response:` markers.
//!
//! Lenient by contract: a reply that ignores the template degrades to
//! `Category::Unknown` and `FALLBACK_RESPONSE`, it never fails.

use crate::email::models::{AnalysisResult, Category};

const CATEGORY_MARKER: &str = "Category:";
const RESPONSE_MARKER: &str = "Suggested Response:";

/// Returned when the reply carries no usable suggestion.
pub const FALLBACK_RESPONSE: &str = "Could not generate a suggested response.";

pub fn parse_model_reply(raw: &str) -> AnalysisResult {
    let lines: Vec<&str> = raw.trim_start().lines().collect();

    let category = lines
        .first()
        .and_then(|first| first.strip_prefix(CATEGORY_MARKER))
        .map(parse_category)
        .unwrap_or_default();

    let suggested_response = lines
        .iter()
        .position(|line| line.starts_with(RESPONSE_MARKER))
        .map(|idx| {
            let mut parts = Vec::with_capacity(lines.len() - idx);
            parts.push(&lines[idx][RESPONSE_MARKER.len()..]);
            parts.extend_from_slice(&lines[idx + 1..]);
            parts.join("\n").trim().to_string()
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_RESPONSE.to_string());

    AnalysisResult {
        category,
        suggested_response,
    }
}

/// Substring match on the label. `unproductive` is checked first since it
/// contains `productive`.
fn parse_category(label: &str) -> Category {
    let label = label.trim().to_lowercase();
    if label.contains("unproductive") {
        Category::Unproductive
    } else if label.contains("productive") {
        Category::Productive
    } else {
        Category::Unknown
    }
}
