//! A flattened, tabular view of the index.
//!
//! Each row records the deepest populated path through the hierarchy: a
//! topic with no subtopics yields a bare topic row, a concept with no
//! questions yields a row without problem text, and so on. The view is
//! deliberately lossy — dependency edges and subquestions stay in the
//! snapshot — but it round-trips the hierarchy itself, so it suits
//! spreadsheet-style review and bulk authoring.

use serde::{Deserialize, Serialize};

use crate::domain::{
    name::NameString,
    node::Difficulty,
    topics::{QuestionSpec, Topics},
};

/// One flattened row of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// The topic name.
    pub topic: NameString,
    /// The subtopic name, when the row reaches that deep.
    #[serde(default)]
    pub subtopic: Option<NameString>,
    /// The concept name, when the row reaches that deep.
    #[serde(default)]
    pub concept: Option<NameString>,
    /// The problem statement, for question rows.
    #[serde(default)]
    pub problem: Option<String>,
    /// The worked solution, for question rows.
    #[serde(default)]
    pub solution: Option<String>,
    /// The difficulty, for question rows.
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

/// Flatten an index into rows, one per deepest populated path.
#[must_use]
pub fn to_rows(topics: &Topics) -> Vec<Row> {
    let mut rows = Vec::new();

    let name = |s: &str| NameString::new(s.to_string()).expect("stored names are valid");

    for topic in topics.topics() {
        if topic.subtopics().is_empty() {
            rows.push(Row {
                topic: name(topic.id().topic()),
                subtopic: None,
                concept: None,
                problem: None,
                solution: None,
                difficulty: None,
            });
        }
        for subtopic in topic.subtopics() {
            if subtopic.concepts().is_empty() {
                rows.push(Row {
                    topic: name(topic.id().topic()),
                    subtopic: Some(name(subtopic.id().subtopic())),
                    concept: None,
                    problem: None,
                    solution: None,
                    difficulty: None,
                });
            }
            for concept in subtopic.concepts() {
                if concept.questions().is_empty() {
                    rows.push(Row {
                        topic: name(topic.id().topic()),
                        subtopic: Some(name(subtopic.id().subtopic())),
                        concept: Some(name(concept.id().concept())),
                        problem: None,
                        solution: None,
                        difficulty: None,
                    });
                }
                for question in concept.questions() {
                    rows.push(Row {
                        topic: name(topic.id().topic()),
                        subtopic: Some(name(subtopic.id().subtopic())),
                        concept: Some(name(concept.id().concept())),
                        problem: Some(question.problem().to_string()),
                        solution: Some(question.solution().to_string()),
                        difficulty: Some(question.difficulty()),
                    });
                }
            }
        }
    }

    rows
}

/// Rebuild an index from flattened rows.
///
/// Rows are applied in order with the usual auto-vivifying insertion rules,
/// so question numbering restarts from the rows themselves.
pub fn from_rows<I: IntoIterator<Item = Row>>(rows: I) -> Topics {
    let mut topics = Topics::new();
    apply_rows(&mut topics, rows);
    topics
}

/// Apply flattened rows to an existing index.
///
/// Uses the usual auto-vivifying insertion rules, so applying rows to a
/// populated index merges rather than replaces.
pub fn apply_rows<I: IntoIterator<Item = Row>>(topics: &mut Topics, rows: I) {
    for row in rows {
        match (row.subtopic, row.concept, row.problem) {
            (None, _, _) => {
                topics.add_topic(row.topic);
            }
            (Some(subtopic), None, _) => {
                topics.add_subtopic(row.topic, subtopic);
            }
            (Some(subtopic), Some(concept), None) => {
                topics.add_concept(row.topic, subtopic, concept);
            }
            (Some(subtopic), Some(concept), Some(problem)) => {
                topics.add_question(QuestionSpec {
                    topic: row.topic,
                    subtopic,
                    concept,
                    problem,
                    solution: row.solution.unwrap_or_default(),
                    difficulty: row.difficulty.unwrap_or_default(),
                    subquestions: Vec::new(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Topics {
        let mut topics = Topics::new();
        topics.add_topic("Trigonometry".parse().unwrap());
        topics.add_subtopic("Geometry".parse().unwrap(), "Circles".parse().unwrap());
        topics.add_question(QuestionSpec {
            topic: "Algebra".parse().unwrap(),
            subtopic: "LinearEquations".parse().unwrap(),
            concept: "SolveForX".parse().unwrap(),
            problem: "Solve 2x=4".to_string(),
            solution: "x=2".to_string(),
            difficulty: Difficulty::Hard,
            subquestions: Vec::new(),
        });
        topics
    }

    #[test]
    fn rows_record_the_deepest_populated_path() {
        let rows = to_rows(&sample());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].topic.as_str(), "Trigonometry");
        assert!(rows[0].subtopic.is_none());

        assert_eq!(rows[1].topic.as_str(), "Geometry");
        assert_eq!(rows[1].subtopic.as_ref().unwrap().as_str(), "Circles");
        assert!(rows[1].concept.is_none());

        assert_eq!(rows[2].problem.as_deref(), Some("Solve 2x=4"));
        assert_eq!(rows[2].difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn hierarchy_round_trips_through_rows() {
        let original = sample();
        let rebuilt = from_rows(to_rows(&original));

        assert_eq!(rebuilt, original);
    }
}
