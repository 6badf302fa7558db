// Best-effort closing of JSON cut off mid-structure (usually by the token limit).

use serde_json::Value;

/// Try to turn truncated JSON into a parseable document.
///
/// Heuristics, in order:
/// - trailing whitespace is trimmed
/// - commas directly before a closing delimiter are dropped
/// - text ending inside a string literal gets a closing quote
/// - a trailing comma is dropped
/// - every unmatched `[` / `{` is closed, innermost first
///
/// Returns `Some` only when the repaired text parses.
pub fn repair_truncated_json(malformed: &str) -> Option<String> {
    let mut repaired = String::with_capacity(malformed.len() + 8);
    let mut open: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in malformed.trim_end().chars() {
        if in_string {
            repaired.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                repaired.push(c);
            }
            '{' | '[' => {
                open.push(c);
                repaired.push(c);
            }
            '}' | ']' => {
                drop_trailing_comma(&mut repaired);
                let opener = if c == '}' { '{' } else { '[' };
                if open.last() == Some(&opener) {
                    open.pop();
                }
                repaired.push(c);
            }
            _ => repaired.push(c),
        }
    }

    if in_string {
        // A dangling backslash would escape the quote we add.
        if escaped {
            repaired.pop();
        }
        repaired.push('"');
    }

    drop_trailing_comma(&mut repaired);

    while let Some(opener) = open.pop() {
        repaired.push(if opener == '{' { '}' } else { ']' });
    }

    serde_json::from_str::<Value>(&repaired).ok().map(|_| repaired)
}

/// Remove a structural comma (and surrounding trailing whitespace) at the end.
fn drop_trailing_comma(text: &mut String) {
    let trimmed = text.trim_end().len();
    if text[..trimmed].ends_with(',') {
        text.truncate(trimmed - 1);
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
    }
}
