use std::collections::btree_map::{self, BTreeMap};

use serde::Serialize;

use super::LlmError;
use crate::models::{ContestRef, Editorial, ProblemKey};

/// One segmentation job: a contest, its combined editorial text, and optional hints.
#[derive(Debug, Clone)]
pub struct SegmentationRequest {
    pub contest_id: String,
    pub article_text: String,
    /// Only used to enrich the prompt, never to validate the result.
    pub expected_problems: Option<Vec<ProblemKey>>,
}

impl SegmentationRequest {
    pub fn new(contest_id: impl Into<String>, article_text: impl Into<String>) -> Self {
        Self {
            contest_id: contest_id.into(),
            article_text: article_text.into(),
            expected_problems: None,
        }
    }

    pub fn with_expected_problems(mut self, expected: Vec<ProblemKey>) -> Self {
        self.expected_problems = Some(expected);
        self
    }
}

/// Boundary markers the model claims occur verbatim in the article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSpan {
    pub contest_id: String,
    pub problem_id: String,
    pub start_marker: String,
    /// Empty means "to the end of the article".
    pub end_marker: String,
}

/// Entry of the `"problems"` array after field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerEntry {
    Span(MarkerSpan),
    /// Transitional variant where the model wrote the analysis itself.
    Inline {
        contest_id: String,
        problem_id: String,
        analysis: String,
    },
}

/// Flat `{"A": "...", "B": "..."}` entry. Cannot name a contest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyEntry {
    pub problem_id: String,
    pub text: String,
}

/// The two response shapes a model may emit, resolved once by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentationResponse {
    Markers(Vec<MarkerEntry>),
    Legacy(Vec<LegacyEntry>),
}

/// Where a segment's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentSource {
    /// Verbatim slice of the article between markers.
    Span,
    /// Text supplied by the model.
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub source: SegmentSource,
}

/// Which step of the response pipeline produced the parsed JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    FencedBlock,
    BraceMatched,
    Repaired,
}

impl RecoveryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FencedBlock => "fenced_block",
            Self::BraceMatched => "brace_matched",
            Self::Repaired => "repaired",
        }
    }
}

/// (contest, problem) → solution text. Every stored text is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentationResult {
    segments: BTreeMap<ProblemKey, Segment>,
    pub strategy: Option<RecoveryStrategy>,
}

impl SegmentationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a segment, replacing any earlier one under the same key.
    /// Blank text is ignored; returns whether the segment was stored.
    pub fn insert(&mut self, key: ProblemKey, text: &str, source: SegmentSource) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.segments.insert(
            key,
            Segment {
                text: text.to_string(),
                source,
            },
        );
        true
    }

    pub fn get(&self, key: &ProblemKey) -> Option<&str> {
        self.segments.get(key).map(|s| s.text.as_str())
    }

    pub fn segment(&self, key: &ProblemKey) -> Option<&Segment> {
        self.segments.get(key)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ProblemKey, Segment> {
        self.segments.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ProblemKey> {
        self.segments.keys()
    }

    /// Number of entries attributed to `contest`.
    pub fn count_for(&self, contest: &ContestRef) -> usize {
        self.segments.keys().filter(|k| &k.contest == contest).count()
    }

    pub fn into_editorials(self) -> Vec<Editorial> {
        self.segments
            .into_iter()
            .map(|(key, segment)| Editorial {
                contest: key.contest,
                problem_id: key.problem,
                analysis_text: segment.text,
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a SegmentationResult {
    type Item = (&'a ProblemKey, &'a Segment);
    type IntoIter = btree_map::Iter<'a, ProblemKey, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Parameters of one chat completion.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Chat-completions provider abstraction (allows mocking).
pub trait LlmClient {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}
