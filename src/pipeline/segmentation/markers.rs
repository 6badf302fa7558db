//! Marker-delimited extraction from the original article.
//!
//! The model only names boundaries; the text itself always comes from the
//! article, so every extracted span is a verbatim substring of it.

use std::ops::Range;

/// Byte range of the text strictly between `start_marker` and `end_marker`.
///
/// `None` when the start marker is empty or absent. An empty or missing end
/// marker extends the span to the end of `text`.
pub fn locate_span(text: &str, start_marker: &str, end_marker: &str) -> Option<Range<usize>> {
    if start_marker.is_empty() {
        return None;
    }
    let start = text.find(start_marker)? + start_marker.len();

    let end = if end_marker.is_empty() {
        text.len()
    } else {
        match text[start..].find(end_marker) {
            Some(offset) => start + offset,
            None => {
                tracing::debug!(
                    end_marker = %preview(end_marker),
                    "End marker not found, taking text until end"
                );
                text.len()
            }
        }
    };

    Some(start..end)
}

/// Text between the markers, or `""` when the start marker cannot be found.
pub fn extract_between_markers<'a>(text: &'a str, start_marker: &str, end_marker: &str) -> &'a str {
    match locate_span(text, start_marker, end_marker) {
        Some(range) => &text[range],
        None => {
            tracing::warn!(start_marker = %preview(start_marker), "Start marker not found");
            ""
        }
    }
}

/// First 50 characters of a marker, for log lines.
fn preview(marker: &str) -> &str {
    match marker.char_indices().nth(50) {
        Some((idx, _)) => &marker[..idx],
        None => marker,
    }
}
