//! Common utility types.

use std::collections::HashMap;

/// Metadata map type.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Truncate `text` to at most `max_chars` characters, appending an ellipsis
/// when anything was cut. Operates on chars, never splits a code point.
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    let flattened: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    let mut out: String = flattened.chars().take(max_chars).collect();
    out.push('…');
    out
}
