use serde::{Deserialize, Serialize};

use super::problem::ContestRef;

/// Editorial analysis for a single problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Editorial {
    pub contest: ContestRef,
    pub problem_id: String,
    pub analysis_text: String,
}

/// Every analysis found while parsing the editorials of one contest.
///
/// May include entries for sibling divisions covered by the same article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContestEditorial {
    pub contest_id: String,
    pub editorials: Vec<Editorial>,
}

impl ContestEditorial {
    /// Analyses attributed to the contest this editorial was requested for.
    pub fn own_editorials(&self) -> impl Iterator<Item = &Editorial> {
        self.editorials
            .iter()
            .filter(|e| e.contest.is(&self.contest_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_editorials_excludes_siblings_and_unknown() {
        let editorial = ContestEditorial {
            contest_id: "1900".into(),
            editorials: vec![
                Editorial {
                    contest: ContestRef::id("1900"),
                    problem_id: "A".into(),
                    analysis_text: "div1".into(),
                },
                Editorial {
                    contest: ContestRef::id("1901"),
                    problem_id: "A".into(),
                    analysis_text: "div2".into(),
                },
                Editorial {
                    contest: ContestRef::Unknown,
                    problem_id: "B".into(),
                    analysis_text: "legacy".into(),
                },
            ],
        };

        let own: Vec<&str> = editorial
            .own_editorials()
            .map(|e| e.analysis_text.as_str())
            .collect();
        assert_eq!(own, vec!["div1"]);
    }

    #[test]
    fn editorial_serializes_contest_ref() {
        let e = Editorial {
            contest: ContestRef::id("1900"),
            problem_id: "A".into(),
            analysis_text: "text".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"contest\":{\"id\":\"1900\"}"));

        let unknown = Editorial {
            contest: ContestRef::Unknown,
            ..e
        };
        let json = serde_json::to_string(&unknown).unwrap();
        assert!(json.contains("\"contest\":\"unknown\""));
    }
}
