// Repair escaping mistakes inside JSON string literals emitted by the model.
// Models routinely write LaTeX (`\leq`, `\sqrt`) without doubling the backslash,
// and sometimes put raw newlines or tabs inside strings.

use std::borrow::Cow;

/// Sanitize a model-emitted JSON string. Never fails.
///
/// Input that already parses is returned unchanged (borrowed). Otherwise,
/// inside string literals only:
/// - a backslash that does not start a valid escape is doubled
/// - raw newline, tab, carriage return, backspace and form feed are escaped
///
/// Text outside string literals passes through untouched.
pub fn sanitize_json_string(raw: &str) -> Cow<'_, str> {
    if serde_json::from_str::<serde_json::Value>(raw).is_ok() {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(escape_string_literals(raw))
}

fn escape_string_literals(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let len = chars.len();
    let mut result = String::with_capacity(raw.len() + 16);
    let mut in_string = false;
    let mut i = 0;

    while i < len {
        let c = chars[i];

        // A quote is structural when preceded by an even number of backslashes.
        if c == '"' {
            if preceding_backslashes(&chars, i) % 2 == 0 {
                in_string = !in_string;
            }
            result.push(c);
            i += 1;
            continue;
        }

        if !in_string {
            result.push(c);
            i += 1;
            continue;
        }

        match c {
            '\\' => match chars.get(i + 1).copied() {
                Some('\\') => {
                    result.push_str("\\\\");
                    i += 2;
                }
                Some(next @ ('"' | '/' | 'b' | 'f' | 'n' | 'r' | 't')) => {
                    result.push('\\');
                    result.push(next);
                    i += 2;
                }
                Some('u') if is_unicode_escape(&chars, i + 2) => {
                    result.push_str("\\u");
                    i += 2;
                }
                _ => {
                    result.push_str("\\\\");
                    i += 1;
                }
            },
            '\n' => {
                result.push_str("\\n");
                i += 1;
            }
            '\t' => {
                result.push_str("\\t");
                i += 1;
            }
            '\r' => {
                result.push_str("\\r");
                i += 1;
            }
            '\u{0008}' => {
                result.push_str("\\b");
                i += 1;
            }
            '\u{000C}' => {
                result.push_str("\\f");
                i += 1;
            }
            _ => {
                result.push(c);
                i += 1;
            }
        }
    }

    result
}

fn preceding_backslashes(chars: &[char], idx: usize) -> usize {
    chars[..idx].iter().rev().take_while(|&&c| c == '\\').count()
}

/// Four hex digits starting at `idx`.
fn is_unicode_escape(chars: &[char], idx: usize) -> bool {
    chars
        .get(idx..idx + 4)
        .is_some_and(|digits| digits.iter().all(char::is_ascii_hexdigit))
}
