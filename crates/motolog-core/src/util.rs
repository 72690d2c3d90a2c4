//! Shared utility functions used across multiple modules.

use std::sync::OnceLock;

use regex::Regex;

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `ws://` or `wss://`.
pub fn is_relay_url(value: &str) -> bool {
    value.starts_with("ws://") || value.starts_with("wss://")
}

/// Current Unix timestamp in seconds.
pub fn unix_timestamp_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

/// Round half-up to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Turn a human-readable name into a stable identifier.
///
/// Letters are lowercased, every run of characters that are neither letters
/// nor digits collapses to a single `-`, and leading/trailing dashes are
/// dropped. Non-ASCII letters are kept.
pub fn slugify(name: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let re = SEPARATORS.get_or_init(|| Regex::new(r"[^\p{L}\p{N}]+").expect("Invalid regex"));
    re.replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}
