//! Free-text sanitization
//!
//! Normalizes and strips user-supplied display text before it is stored.
//! This is not an HTML escaper; output encoding is the renderer's job.

use unicode_normalization::UnicodeNormalization;

/// Characters stripped outright: markup delimiters that have no place
/// in a display name or similar free-text field.
const STRIPPED: [char; 4] = ['<', '>', '"', '\''];

/// Normalize, strip, and truncate a free-text field.
///
/// Applies NFKC normalization, removes control characters and markup
/// delimiters, trims surrounding whitespace, and truncates to `max_len`
/// characters. Returns `None` if nothing printable remains.
pub fn sanitize_text(input: &str, max_len: usize) -> Option<String> {
    let normalized: String = input
        .nfkc()
        .filter(|c| !c.is_control() && !STRIPPED.contains(c))
        .collect();

    let cleaned: String = normalized.trim().chars().take(max_len).collect();
    let cleaned = cleaned.trim_end().to_string();

    if cleaned.is_empty() { None } else { Some(cleaned) }
}
