use std::borrow::Cow;

use crate::models::ProblemKey;

/// Appended to an article cut at the character budget.
pub const TRUNCATION_MARKER: &str = "\n\n[CONTENT TRUNCATED DUE TO LENGTH]";

pub const SEGMENTATION_SYSTEM_PROMPT: &str = r#"You are an expert at analyzing competitive programming contest editorials.
Your task is to find where each problem's solution starts and ends inside the editorial text.

RULES:
1. One editorial often covers SEVERAL contests (for example Div. 1 and Div. 2) in a single post.
   You MUST give the contest ID of every problem so divisions are never mixed up.
2. NEVER copy or rewrite the solution text. Only identify boundaries.
   For every problem give:
   - start_marker: a short snippet copied EXACTLY from the editorial where the solution STARTS
   - end_marker: a short snippet copied EXACTLY from the editorial where the solution ENDS
   Good markers are headings such as "Problem A", "1900A" or "Solution for A".
3. Return ONLY the boundary metadata as JSON, with no prose before or after it.

OUTPUT FORMAT:
{
  "problems": [
    {
      "contest_id": "1900",
      "problem_id": "A",
      "start_marker": "Problem A",
      "end_marker": "Problem B"
    },
    {
      "contest_id": "1900",
      "problem_id": "B",
      "start_marker": "Problem B",
      "end_marker": "Problem C"
    }
  ]
}

GUIDELINES:
- Contest IDs appear in problem headers (e.g. "1900A"), section titles and links.
- problem_id is an uppercase letter, optionally followed by one digit (A, B, C1, C2).
- contest_id is a numeric string ("1900", "1901").
- Markers must be unique snippets of 10-50 characters that occur verbatim in the editorial.
- For the last problem end_marker may be the empty string "".
- If the contest ID is ambiguous, infer it from context or use the primary contest ID."#;

/// Render the expected problem list for the prompt.
pub fn format_expected_problems(expected: Option<&[ProblemKey]>) -> String {
    match expected {
        None | Some([]) => "Unknown (parse all problems found)".to_string(),
        Some(keys) => keys
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Cut `text` to at most `max_chars` characters, appending the truncation marker.
/// Returns the text and whether it was cut.
pub fn truncate_article(text: &str, max_chars: usize) -> (Cow<'_, str>, bool) {
    match text.char_indices().nth(max_chars) {
        None => (Cow::Borrowed(text), false),
        Some((byte_idx, _)) => {
            let mut cut = String::with_capacity(byte_idx + TRUNCATION_MARKER.len());
            cut.push_str(&text[..byte_idx]);
            cut.push_str(TRUNCATION_MARKER);
            (Cow::Owned(cut), true)
        }
    }
}

/// Build the user prompt for one contest. `article_text` must already be truncated.
pub fn build_segmentation_prompt(
    contest_id: &str,
    article_text: &str,
    expected: Option<&[ProblemKey]>,
) -> String {
    let expected = format_expected_problems(expected);
    format!(
        r#"Contest ID: {contest_id}

Expected problems: {expected}

Full editorial text:
{article_text}

IMPORTANT: Identify the START and END markers of each problem's solution.
Markers must be snippets that occur verbatim in the editorial above.
Do NOT copy the solution text, only return the boundary markers.

Return JSON with contest_id, problem_id, start_marker and end_marker for each problem."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_problems_are_listed() {
        let expected = vec![
            ProblemKey::new("1900", "A"),
            ProblemKey::new("1900", "B"),
            ProblemKey::new("1901", "C1"),
        ];
        let rendered = format_expected_problems(Some(&expected));
        assert_eq!(rendered, "1900/A, 1900/B, 1901/C1");
    }

    #[test]
    fn missing_expected_problems_say_unknown() {
        assert!(format_expected_problems(None).starts_with("Unknown"));
        assert!(format_expected_problems(Some(&[])).starts_with("Unknown"));
    }

    #[test]
    fn short_article_is_not_truncated() {
        let (text, truncated) = truncate_article("short editorial", 100);
        assert!(!truncated);
        assert!(matches!(text, Cow::Borrowed("short editorial")));
    }

    #[test]
    fn long_article_is_cut_and_marked() {
        let article = "x".repeat(150);
        let (text, truncated) = truncate_article(&article, 100);
        assert!(truncated);
        assert!(text.starts_with(&"x".repeat(100)));
        assert!(!text.starts_with(&"x".repeat(101)));
        assert!(text.ends_with("[CONTENT TRUNCATED DUE TO LENGTH]"));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        // Cyrillic letters are two bytes each in UTF-8.
        let article = "задача".repeat(10);
        let (text, truncated) = truncate_article(&article, 6);
        assert!(truncated);
        assert!(text.starts_with("задача"));
        assert!(!text.starts_with("задачаз"));
    }

    #[test]
    fn article_exactly_at_budget_is_kept() {
        let article = "y".repeat(100);
        let (_, truncated) = truncate_article(&article, 100);
        assert!(!truncated);
    }

    #[test]
    fn prompt_contains_contest_article_and_hints() {
        let expected = vec![ProblemKey::new("1900", "A")];
        let prompt = build_segmentation_prompt("1900", "Problem A. Use DP.", Some(&expected));
        assert!(prompt.contains("Contest ID: 1900"));
        assert!(prompt.contains("Expected problems: 1900/A"));
        assert!(prompt.contains("Problem A. Use DP."));
    }

    #[test]
    fn system_prompt_demands_markers_only() {
        assert!(SEGMENTATION_SYSTEM_PROMPT.contains("NEVER copy"));
        assert!(SEGMENTATION_SYSTEM_PROMPT.contains("\"start_marker\""));
        assert!(SEGMENTATION_SYSTEM_PROMPT.contains("\"end_marker\""));
        assert!(SEGMENTATION_SYSTEM_PROMPT.contains("contest_id"));
    }
}
