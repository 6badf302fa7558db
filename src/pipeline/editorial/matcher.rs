use serde::Serialize;

use crate::models::{ContestProblem, ContestRef};
use crate::pipeline::segmentation::SegmentationResult;

/// Outcome of attaching segmented analyses to one contest's problems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    /// Problems of the requested contest that received an explanation.
    pub matched: usize,
    /// Problems of the requested contest.
    pub total: usize,
    /// Result entries attributed to another contest (sibling division).
    pub skipped_sibling: usize,
    /// Result entries without a contest (legacy response shape).
    pub skipped_unknown: usize,
}

impl MatchReport {
    /// Fraction of the contest's problems that were matched; 0 when there are none.
    pub fn coverage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.matched as f64 / self.total as f64
        }
    }
}

/// Attach analyses from `result` to the problems of `contest_id`.
///
/// Only entries whose contest equals `contest_id` are used. Every problem of
/// that contest has its explanation replaced, cleared when there is no
/// matching entry. Problems of other contests in `problems` are left alone.
pub fn match_to_contest(
    contest_id: &str,
    result: &SegmentationResult,
    problems: &mut [ContestProblem],
) -> MatchReport {
    let mut report = MatchReport::default();

    for key in result.keys() {
        match &key.contest {
            ContestRef::Id(id) if id == contest_id => {}
            ContestRef::Id(id) => {
                tracing::debug!(
                    problem = %key.problem,
                    from_contest = %id,
                    "Skipping editorial entry for another contest"
                );
                report.skipped_sibling += 1;
            }
            ContestRef::Unknown => report.skipped_unknown += 1,
        }
    }

    for problem in problems.iter_mut().filter(|p| p.contest_id == contest_id) {
        report.total += 1;
        let explanation = result.get(&problem.key()).map(str::to_owned);
        if explanation.is_some() {
            report.matched += 1;
        }
        problem.explanation = explanation;
    }

    if report.skipped_unknown > 0 {
        tracing::warn!(
            count = report.skipped_unknown,
            "Editorial entries without contest id were not matched"
        );
    }

    tracing::info!(
        contest_id,
        matched = report.matched,
        total = report.total,
        parsed = result.len(),
        skipped = report.skipped_sibling,
        "Matched {}/{} problems (parsed {} total, skipped {} from other contests)",
        report.matched,
        report.total,
        result.len(),
        report.skipped_sibling
    );

    report
}
