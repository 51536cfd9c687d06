//! Text preprocessing utilities for embedding generation
//!
//! Record texts and user queries are cleaned the same way so that identical
//! content always produces identical provider input.

use tracing::debug;

/// Longest input (in characters) sent to an embedding provider
pub const MAX_EMBEDDING_CHARS: usize = 2000;

/// Clean text before embedding.
///
/// Returns `None` when nothing but whitespace or control characters remain.
pub fn preprocess_text_for_embedding(text: &str) -> Option<String> {
    let sanitized = sanitize_text(text);
    if sanitized.is_empty() {
        return None;
    }

    let char_count = sanitized.chars().count();
    if char_count > MAX_EMBEDDING_CHARS {
        debug!(
            "Text too long ({} chars), truncating to {}",
            char_count, MAX_EMBEDDING_CHARS
        );
        return Some(smart_truncate_text(&sanitized, MAX_EMBEDDING_CHARS));
    }

    Some(sanitized)
}

/// Replace control characters and collapse whitespace runs to single spaces
fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Cut at a word boundary at or before `max_chars`
fn smart_truncate_text(text: &str, max_chars: usize) -> String {
    let cut = text
        .char_indices()
        .nth(max_chars)
        .map_or(text.len(), |(idx, _)| idx);
    let head = &text[..cut];
    match head.rfind(' ') {
        Some(space) if space > cut / 2 => head[..space].to_string(),
        _ => head.to_string(),
    }
}
