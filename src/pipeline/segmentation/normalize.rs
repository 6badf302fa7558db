use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::markers::extract_between_markers;
use super::types::{
    LegacyEntry, MarkerEntry, MarkerSpan, SegmentSource, SegmentationResponse, SegmentationResult,
};
use crate::models::ProblemKey;

/// Optional contest/division prefix ending in a digit, then the problem letter
/// with an optional second character: "A", "C1", "AB", "1900C1", "DIV2A".
static EMBEDDED_PROBLEM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Z0-9]*[0-9])?([A-Z][A-Z0-9]?)$").unwrap());

/// Legacy map keys that can name a problem: an optional "Problem"/"Задача"
/// word, an optional contest number, the letter group, optional "." or ")".
static LEGACY_PROBLEM_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:PROBLEM|ЗАДАЧА)\s+)?[0-9]*[A-Z][A-Z0-9]?[.)]?$").unwrap()
});

/// Phrase prefixes whose trailing token is the problem id.
const PROBLEM_PREFIXES: &[&str] = &["PROBLEM ", "ЗАДАЧА "];

/// Normalize a model-supplied problem identifier to "A", "C1", ...
///
/// Accepts bare letters, letter+digit pairs, phrases such as "Problem A",
/// and ids glued to a contest number ("1900A", "1900C1"). For a phrase only
/// the trailing token is considered. Returns `None` when no letter can be
/// isolated; a returned id always matches `^[A-Z][A-Z0-9]?$`.
pub fn normalize_problem_id(raw: &str) -> Option<String> {
    let id = raw.trim().to_uppercase();

    let token = if PROBLEM_PREFIXES.iter().any(|p| id.starts_with(p)) {
        id.split_whitespace().last()?
    } else {
        id.as_str()
    };

    normalize_token(token)
}

fn normalize_token(token: &str) -> Option<String> {
    if let Some(caps) = EMBEDDED_PROBLEM_ID.captures(token) {
        return Some(caps[1].to_string());
    }

    // Fallback: leading letter plus an optional digit ("C." -> "C").
    let mut chars = token.chars();
    let first = chars.next().filter(|c| c.is_ascii_uppercase())?;
    let mut result = first.to_string();
    if let Some(digit) = chars.next().filter(|c| c.is_ascii_digit()) {
        result.push(digit);
    }
    Some(result)
}

/// Classify a parsed response. `None` for scalar JSON.
///
/// An object with a `"problems"` array, or a bare top-level array, is the
/// marker shape; any other object is read as the legacy letter → text map.
/// Invalid entries are dropped here.
pub fn parse_response_shape(value: &Value) -> Option<SegmentationResponse> {
    match value {
        Value::Array(items) => Some(parse_marker_entries(items)),
        Value::Object(object) => match object.get("problems") {
            Some(Value::Array(items)) => Some(parse_marker_entries(items)),
            _ => Some(SegmentationResponse::Legacy(parse_legacy_entries(object))),
        },
        _ => None,
    }
}

fn parse_marker_entries(items: &[Value]) -> SegmentationResponse {
    SegmentationResponse::Markers(items.iter().filter_map(parse_marker_entry).collect())
}

fn parse_marker_entry(item: &Value) -> Option<MarkerEntry> {
    let Some(fields) = item.as_object() else {
        tracing::debug!("Skipping non-object entry in problems array");
        return None;
    };

    let contest_id = scalar_text(fields.get("contest_id"));
    let contest_id = contest_id.trim();
    let problem_id = normalize_problem_id(&scalar_text(fields.get("problem_id")));

    let (contest_id, problem_id) = match (contest_id.is_empty(), problem_id) {
        (false, Some(problem_id)) => (contest_id.to_string(), problem_id),
        _ => {
            tracing::debug!(
                contest_id = %contest_id,
                "Skipping entry without contest id or recognizable problem id"
            );
            return None;
        }
    };

    if fields.contains_key("start_marker") {
        let start_marker = scalar_text(fields.get("start_marker")).trim().to_string();
        let end_marker = scalar_text(fields.get("end_marker")).trim().to_string();
        if start_marker.is_empty() {
            tracing::debug!(contest_id = %contest_id, problem_id = %problem_id, "Skipping entry with empty start marker");
            return None;
        }
        return Some(MarkerEntry::Span(MarkerSpan {
            contest_id,
            problem_id,
            start_marker,
            end_marker,
        }));
    }

    let analysis = scalar_text(fields.get("analysis")).trim().to_string();
    if analysis.is_empty() {
        return None;
    }
    Some(MarkerEntry::Inline {
        contest_id,
        problem_id,
        analysis,
    })
}

fn parse_legacy_entries(object: &Map<String, Value>) -> Vec<LegacyEntry> {
    object
        .iter()
        .filter_map(|(key, value)| {
            let text = value.as_str()?.trim();
            if text.is_empty() {
                return None;
            }
            if !LEGACY_PROBLEM_KEY.is_match(&key.trim().to_uppercase()) {
                tracing::debug!(key = %key, "Skipping legacy key that does not name a problem");
                return None;
            }
            Some(LegacyEntry {
                problem_id: normalize_problem_id(key)?,
                text: text.to_string(),
            })
        })
        .collect()
}

/// Strings as-is, numbers rendered (`1900` → "1900"), anything else empty.
fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Turn a classified response into the uniform (contest, problem) → text map.
///
/// Marker spans are extracted from `article`; spans that come out empty are
/// dropped. Legacy entries are attributed to the unknown contest.
pub fn resolve_response(response: SegmentationResponse, article: &str) -> SegmentationResult {
    let mut result = SegmentationResult::new();

    match response {
        SegmentationResponse::Markers(entries) => {
            for entry in entries {
                match entry {
                    MarkerEntry::Span(span) => {
                        let text =
                            extract_between_markers(article, &span.start_marker, &span.end_marker);
                        let key = ProblemKey::new(span.contest_id, span.problem_id);
                        store(&mut result, key, text, SegmentSource::Span);
                    }
                    MarkerEntry::Inline {
                        contest_id,
                        problem_id,
                        analysis,
                    } => {
                        let key = ProblemKey::new(contest_id, problem_id);
                        store(&mut result, key, &analysis, SegmentSource::Inline);
                    }
                }
            }
            tracing::info!(count = result.len(), "Parsed editorials with contest IDs");
        }
        SegmentationResponse::Legacy(entries) => {
            tracing::warn!("Model returned legacy format without contest IDs");
            for entry in entries {
                let key = ProblemKey::unknown_contest(entry.problem_id);
                store(&mut result, key, &entry.text, SegmentSource::Inline);
            }
            tracing::warn!(
                count = result.len(),
                "Parsed editorials without contest IDs (legacy format)"
            );
        }
    }

    result
}

fn store(result: &mut SegmentationResult, key: ProblemKey, text: &str, source: SegmentSource) {
    let label = key.to_string();
    let replaces = result.get(&key).is_some();
    if !result.insert(key, text, source) {
        tracing::debug!(problem = %label, "Dropping entry with empty text");
    } else if replaces {
        tracing::debug!(problem = %label, "Later entry replaces earlier one");
    }
}

/// Parsed JSON → result in one step. `None` for scalar JSON.
pub fn normalize_response(value: &Value, article: &str) -> Option<SegmentationResult> {
    parse_response_shape(value).map(|shape| resolve_response(shape, article))
}
