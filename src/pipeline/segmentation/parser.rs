use serde_json::Value;
use thiserror::Error;

use super::locate::{extract_brace_region, extract_fenced_json};
use super::normalize::normalize_response;
use super::repair::repair_truncated_json;
use super::sanitize::sanitize_json_string;
use super::types::{RecoveryStrategy, SegmentationResult};

/// Every recovery step failed. Carries the last JSON candidate tried, if any,
/// so the caller can dump it next to the raw response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No parseable segmentation JSON in model response")]
pub struct RecoveryFailure {
    pub attempted_json: Option<String>,
}

/// Outcome of parsing one JSON candidate.
enum Candidate {
    Recovered(SegmentationResult),
    /// Valid JSON, but a scalar rather than an object or marker list.
    Unusable,
    /// Not valid JSON.
    Invalid,
}

/// Parse a raw model response into a segmentation result.
///
/// Steps, first success wins:
/// 1. ```json fenced block, sanitized
/// 2. region from the first `{` to its matching `}`, sanitized
/// 3. structural repair of the last candidate (truncated output)
///
/// Only a candidate that fails to parse moves the cascade on. One that parses
/// to scalar JSON ends it, since a later step would only see a fragment of
/// the same answer. Marker spans are resolved against `article`.
pub fn recover_segmentation(
    response: &str,
    article: &str,
) -> Result<SegmentationResult, RecoveryFailure> {
    let mut attempted: Option<String> = None;

    if let Some(fenced) = extract_fenced_json(response) {
        let candidate = sanitize_json_string(fenced).into_owned();
        match try_candidate(&candidate, article, RecoveryStrategy::FencedBlock) {
            Candidate::Recovered(result) => return Ok(result),
            Candidate::Unusable => return Err(unusable(candidate)),
            Candidate::Invalid => {
                tracing::debug!("Fenced JSON block did not parse, trying brace matching");
            }
        }
        attempted = Some(candidate);
    }

    if let Some(region) = extract_brace_region(response) {
        let candidate = sanitize_json_string(region).into_owned();
        match try_candidate(&candidate, article, RecoveryStrategy::BraceMatched) {
            Candidate::Recovered(result) => return Ok(result),
            Candidate::Unusable => return Err(unusable(candidate)),
            Candidate::Invalid => {}
        }
        attempted = Some(candidate);
    }

    if let Some(candidate) = attempted.as_deref() {
        tracing::warn!("Initial JSON parse failed, attempting structural repair");
        if let Some(repaired) = repair_truncated_json(candidate) {
            if let Candidate::Recovered(result) =
                try_candidate(&repaired, article, RecoveryStrategy::Repaired)
            {
                tracing::info!(count = result.len(), "Recovered truncated JSON response");
                return Ok(result);
            }
        }
    }

    Err(RecoveryFailure {
        attempted_json: attempted,
    })
}

fn unusable(candidate: String) -> RecoveryFailure {
    tracing::warn!("Model response JSON has no usable shape");
    RecoveryFailure {
        attempted_json: Some(candidate),
    }
}

fn try_candidate(candidate: &str, article: &str, strategy: RecoveryStrategy) -> Candidate {
    let value: Value = match serde_json::from_str(candidate) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(strategy = strategy.as_str(), error = %e, "Candidate JSON rejected");
            return Candidate::Invalid;
        }
    };

    match normalize_response(&value, article) {
        Some(mut result) => {
            result.strategy = Some(strategy);
            Candidate::Recovered(result)
        }
        None => {
            tracing::debug!(strategy = strategy.as_str(), "Candidate JSON is a scalar");
            Candidate::Unusable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContestRef, ProblemKey};

    const ARTICLE: &str = "Editorial for Round 912.\n\
        Problem 1900A Greedy: take the largest element first.\n\
        Problem 1900B Sort and use two pointers.\n\
        Problem 1901A Count parity of the array.";

    fn marker_json() -> &'static str {
        r#"{"problems": [
            {"contest_id": "1900", "problem_id": "A", "start_marker": "Problem 1900A", "end_marker": "Problem 1900B"},
            {"contest_id": "1900", "problem_id": "B", "start_marker": "Problem 1900B", "end_marker": "Problem 1901A"},
            {"contest_id": "1901", "problem_id": "A", "start_marker": "Problem 1901A", "end_marker": ""}
        ]}"#
    }

    #[test]
    fn fenced_response_is_parsed() {
        let response = format!("Sure!\n```json\n{}\n```\nHope this helps.", marker_json());
        let result = recover_segmentation(&response, ARTICLE).unwrap();

        assert_eq!(result.strategy, Some(RecoveryStrategy::FencedBlock));
        assert_eq!(result.len(), 3);
        assert_eq!(
            result.get(&ProblemKey::new("1900", "A")),
            Some("Greedy: take the largest element first.")
        );
        assert_eq!(
            result.get(&ProblemKey::new("1901", "A")),
            Some("Count parity of the array.")
        );
    }

    #[test]
    fn bare_json_with_prose_uses_brace_matching() {
        let response = format!("Here is the analysis: {} Let me know.", marker_json());
        let result = recover_segmentation(&response, ARTICLE).unwrap();
        assert_eq!(result.strategy, Some(RecoveryStrategy::BraceMatched));
        assert_eq!(result.count_for(&ContestRef::id("1900")), 2);
    }

    #[test]
    fn invalid_fenced_block_falls_through_to_brace_matching() {
        let response = "```json\n{\"problems\": []} and some trailing words\n```";
        let result = recover_segmentation(response, ARTICLE).unwrap();
        assert_eq!(result.strategy, Some(RecoveryStrategy::BraceMatched));
        assert!(result.is_empty());
    }

    #[test]
    fn unescaped_latex_in_markers_is_sanitized() {
        let article = r"Problem 2189A For $$h \leq l$$ the answer is $$cnt_h \times cnt_l$$. Problem 2189B next.";
        let response = r#"{"problems": [{"contest_id": "2189", "problem_id": "A", "start_marker": "Problem 2189A", "end_marker": "Problem 2189B"}]}"#;
        let result = recover_segmentation(response, article).unwrap();
        let text = result.get(&ProblemKey::new("2189", "A")).unwrap();
        assert!(text.contains(r"\leq"));
        assert!(text.contains(r"\times"));

        let latex_marker = r#"{"problems": [{"contest_id": "2189", "problem_id": "A", "start_marker": "For $$h \leq l$$", "end_marker": "Problem 2189B"}]}"#;
        let result = recover_segmentation(latex_marker, article).unwrap();
        assert_eq!(
            result.get(&ProblemKey::new("2189", "A")),
            Some(r"the answer is $$cnt_h \times cnt_l$$.")
        );
    }

    #[test]
    fn truncated_response_is_repaired() {
        let response = r#"```json
{"problems": [
  {"contest_id": "1900", "problem_id": "A", "start_marker": "Problem 1900A", "end_marker": "Problem 1900B"},
  {"contest_id": "1900", "problem_id": "B", "start_marker": "Problem 1900B", "end_marker": "Prob"#;
        let result = recover_segmentation(response, ARTICLE).unwrap();

        assert_eq!(result.strategy, Some(RecoveryStrategy::Repaired));
        assert_eq!(result.len(), 2);
        // "Prob" occurs right after, so B ends at the next heading.
        assert_eq!(
            result.get(&ProblemKey::new("1900", "B")),
            Some("Sort and use two pointers.")
        );
    }

    #[test]
    fn garbage_without_braces_fails_without_candidate() {
        let err = recover_segmentation("I could not find any problems.", ARTICLE).unwrap_err();
        assert_eq!(err.attempted_json, None);
    }

    #[test]
    fn unrepairable_json_reports_candidate() {
        let err = recover_segmentation("{broken json {{{", ARTICLE).unwrap_err();
        assert_eq!(err.attempted_json.as_deref(), Some("{broken json {{{"));
    }

    #[test]
    fn fenced_marker_array_is_parsed() {
        let response = r#"```json
[
  {"contest_id": "1900", "problem_id": "A", "start_marker": "Problem 1900A", "end_marker": "Problem 1900B"},
  {"contest_id": "1900", "problem_id": "B", "start_marker": "Problem 1900B", "end_marker": "Problem 1901A"}
]
```"#;
        let result = recover_segmentation(response, ARTICLE).unwrap();

        assert_eq!(result.strategy, Some(RecoveryStrategy::FencedBlock));
        assert_eq!(result.len(), 2);
        assert_eq!(result.count_for(&ContestRef::Unknown), 0);
        assert_eq!(
            result.get(&ProblemKey::new("1900", "A")),
            Some("Greedy: take the largest element first.")
        );
    }

    #[test]
    fn array_without_marker_objects_is_empty() {
        let result = recover_segmentation("```json\n[1, 2]\n```", ARTICLE).unwrap();
        assert_eq!(result.strategy, Some(RecoveryStrategy::FencedBlock));
        assert!(result.is_empty());
    }

    #[test]
    fn scalar_json_stops_recovery() {
        let response = "```json\n42\n```\n{\"A\": \"Greedy solution\"}";
        let err = recover_segmentation(response, ARTICLE).unwrap_err();
        assert_eq!(err.attempted_json.as_deref(), Some("42"));
    }

    #[test]
    fn legacy_shape_is_recovered_with_unknown_contest() {
        let response = r#"{"A": "Greedy solution", "B": "DP solution"}"#;
        let result = recover_segmentation(response, ARTICLE).unwrap();
        assert_eq!(result.count_for(&ContestRef::Unknown), 2);
    }

    #[test]
    fn recovery_is_deterministic() {
        let response = format!("```json\n{}\n```", marker_json());
        let first = recover_segmentation(&response, ARTICLE).unwrap();
        let second = recover_segmentation(&response, ARTICLE).unwrap();
        assert_eq!(first, second);
    }
}
