// Locate the JSON payload inside a model response that may carry prose or fences.

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Content of the first ```json fenced block, trimmed. `None` when there is no
/// such block or it is never closed.
pub fn extract_fenced_json(response: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets aligned with `response`.
    let lower = response.to_ascii_lowercase();
    let content_start = lower.find(JSON_FENCE)? + JSON_FENCE.len();
    let content_len = response[content_start..].find(FENCE)?;
    Some(response[content_start..content_start + content_len].trim())
}

/// Byte index of the `}` matching the `{` at `start`.
///
/// Braces inside string literals are ignored; a backslash escapes the next
/// character. Returns `None` when `start` is not an opening brace or the
/// object is never closed.
pub fn find_matching_brace(text: &str, start: usize) -> Option<usize> {
    if !text[start..].starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }

    None
}

/// The object starting at the first `{`, up to its matching `}`; when the
/// object is never closed, everything from the `{` on (trimmed).
pub fn extract_brace_region(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let region = match find_matching_brace(response, start) {
        Some(end) => &response[start..=end],
        None => &response[start..],
    };
    Some(region.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_block_is_extracted() {
        let response = "Here you go:\n```json\n{\"problems\": []}\n```\nDone.";
        assert_eq!(extract_fenced_json(response), Some("{\"problems\": []}"));
    }

    #[test]
    fn fence_tag_is_case_insensitive() {
        let response = "```JSON\n{\"a\": 1}\n```";
        assert_eq!(extract_fenced_json(response), Some("{\"a\": 1}"));
    }

    #[test]
    fn unclosed_fence_yields_none() {
        assert_eq!(extract_fenced_json("```json\n{\"a\": 1"), None);
        assert_eq!(extract_fenced_json("no fences here"), None);
    }

    #[test]
    fn matching_brace_simple() {
        assert_eq!(find_matching_brace(r#"{"a": 1}"#, 0), Some(7));
    }

    #[test]
    fn matching_brace_nested() {
        assert_eq!(find_matching_brace(r#"{"a": {"b": 2}}"#, 0), Some(14));
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let text = r#"{"a": "}{}"}"#;
        assert_eq!(find_matching_brace(text, 0), Some(text.len() - 1));
    }

    #[test]
    fn escaped_quote_keeps_string_open() {
        let text = r#"{"a": "say \"}\" now"}"#;
        assert_eq!(find_matching_brace(text, 0), Some(text.len() - 1));
    }

    #[test]
    fn unclosed_object_has_no_match() {
        assert_eq!(find_matching_brace(r#"{"a": 1"#, 0), None);
        assert_eq!(find_matching_brace("abc", 0), None);
    }

    #[test]
    fn brace_region_strips_surrounding_prose() {
        let response = r#"Some prefix text {"problems": [{"a": "b"}]} trailing"#;
        assert_eq!(
            extract_brace_region(response),
            Some(r#"{"problems": [{"a": "b"}]}"#)
        );
    }

    #[test]
    fn brace_region_falls_back_to_rest_of_text() {
        let response = "prefix {\"problems\": [{\"a\": 1}";
        assert_eq!(extract_brace_region(response), Some("{\"problems\": [{\"a\": 1}"));
        assert_eq!(extract_brace_region("no json"), None);
    }

    #[test]
    fn multibyte_prefix_keeps_offsets_valid() {
        let response = "Ответ: {\"a\": \"б\"} конец";
        assert_eq!(extract_brace_region(response), Some("{\"a\": \"б\"}"));
        assert_eq!(extract_fenced_json("Ответ ```json {\"a\": 1} ```"), Some("{\"a\": 1}"));
    }
}
