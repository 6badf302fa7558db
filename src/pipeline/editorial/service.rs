use std::sync::Arc;

use super::matcher::{match_to_contest, MatchReport};
use super::sources::{collect_articles, ArticleSource};
use super::EditorialError;
use crate::models::{ContestEditorial, ContestProblem, ProblemKey};
use crate::pipeline::segmentation::{EditorialSegmenter, SegmentationRequest, SegmentationResult};

/// Result of optional editorial enrichment. The caller decides whether a
/// degraded outcome is acceptable.
#[derive(Debug)]
pub enum Enrichment {
    Enriched(MatchReport),
    Degraded(EditorialError),
}

impl Enrichment {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    pub fn report(&self) -> Option<&MatchReport> {
        match self {
            Self::Enriched(report) => Some(report),
            Self::Degraded(_) => None,
        }
    }

    pub fn into_result(self) -> Result<MatchReport, EditorialError> {
        match self {
            Self::Enriched(report) => Ok(report),
            Self::Degraded(e) => Err(e),
        }
    }
}

/// Fetches editorial articles for a contest and segments them per problem:
/// fetch → combine → segment → (match)
pub struct EditorialParser {
    source: Box<dyn ArticleSource + Send + Sync>,
    segmenter: Arc<EditorialSegmenter>,
}

impl EditorialParser {
    pub fn new(source: Box<dyn ArticleSource + Send + Sync>, segmenter: Arc<EditorialSegmenter>) -> Self {
        Self { source, segmenter }
    }

    /// Fetch, combine and segment every article for `contest_id`.
    pub fn segment_contest(
        &self,
        contest_id: &str,
        urls: &[String],
        expected: Option<Vec<ProblemKey>>,
    ) -> Result<SegmentationResult, EditorialError> {
        let _span = tracing::info_span!("parse_editorial", contest_id).entered();

        let collected = collect_articles(self.source.as_ref(), contest_id, urls)?;
        if !collected.failures.is_empty() {
            tracing::warn!(
                fetched = collected.texts.len(),
                failed = collected.failures.len(),
                "Some editorial sources could not be fetched"
            );
        }

        let mut request = SegmentationRequest::new(contest_id, collected.combined());
        if let Some(expected) = expected {
            request = request.with_expected_problems(expected);
        }

        Ok(self.segmenter.segment(&request)?)
    }

    /// Every analysis found in the contest's editorials, sibling divisions included.
    pub fn parse_editorial_content(
        &self,
        contest_id: &str,
        urls: &[String],
        expected: Option<Vec<ProblemKey>>,
    ) -> Result<ContestEditorial, EditorialError> {
        let result = self.segment_contest(contest_id, urls, expected)?;
        Ok(ContestEditorial {
            contest_id: contest_id.to_string(),
            editorials: result.into_editorials(),
        })
    }

    /// Attach editorial analyses to `problems` in place.
    ///
    /// The problems' own keys are sent as the expected list. Any failure is
    /// returned as `Enrichment::Degraded` with `problems` untouched.
    pub fn enrich_contest(
        &self,
        contest_id: &str,
        urls: &[String],
        problems: &mut [ContestProblem],
    ) -> Enrichment {
        let expected: Vec<ProblemKey> = problems.iter().map(ContestProblem::key).collect();

        match self.segment_contest(contest_id, urls, Some(expected)) {
            Ok(result) => Enrichment::Enriched(match_to_contest(contest_id, &result, problems)),
            Err(e) => {
                tracing::warn!(contest_id, error = %e, "Editorial enrichment degraded");
                Enrichment::Degraded(e)
            }
        }
    }
}
