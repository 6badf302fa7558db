use std::fmt;

use serde::{Deserialize, Serialize};

/// Contest a segmented entry is attributed to.
///
/// Legacy-shape responses cannot name a contest, so their entries carry `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestRef {
    Id(String),
    Unknown,
}

impl ContestRef {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn as_id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Unknown => None,
        }
    }

    /// True only for a concrete id equal to `contest_id`.
    pub fn is(&self, contest_id: &str) -> bool {
        self.as_id() == Some(contest_id)
    }
}

impl fmt::Display for ContestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.write_str(id),
            Self::Unknown => f.write_str("?"),
        }
    }
}

/// (contest, problem letter) pair. Letters are already normalized ("A", "C1").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProblemKey {
    pub contest: ContestRef,
    pub problem: String,
}

impl ProblemKey {
    pub fn new(contest_id: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            contest: ContestRef::id(contest_id),
            problem: problem.into(),
        }
    }

    pub fn unknown_contest(problem: impl Into<String>) -> Self {
        Self {
            contest: ContestRef::Unknown,
            problem: problem.into(),
        }
    }
}

impl fmt::Display for ProblemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.contest, self.problem)
    }
}

/// A problem within a contest, as supplied by the contest collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContestProblem {
    pub contest_id: String,
    /// Problem letter as listed by the contest ("A", "c1", ...).
    pub id: String,
    pub title: String,
    pub explanation: Option<String>,
}

impl ContestProblem {
    pub fn new(contest_id: &str, id: &str, title: &str) -> Self {
        Self {
            contest_id: contest_id.to_string(),
            id: id.to_string(),
            title: title.to_string(),
            explanation: None,
        }
    }

    /// Key used to look this problem up in a segmentation result.
    pub fn key(&self) -> ProblemKey {
        ProblemKey::new(self.contest_id.clone(), self.id.to_uppercase())
    }
}
