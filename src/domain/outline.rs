//! Structured course breakdowns produced by the content-generation
//! collaborator.
//!
//! The index consumes only the structured output — a topic name with ordered
//! subtopics and concept names — never the prompting that produced it.

use serde::Deserialize;

use crate::domain::{name::NameString, node_id::TopicId, topics::Topics};

/// One subtopic of a generated breakdown.
#[derive(Debug, Clone, Deserialize)]
pub struct SubtopicOutline {
    /// The subtopic name.
    pub name: NameString,
    /// Ordered concept names covered by the subtopic.
    pub concepts: Vec<NameString>,
}

/// A generated topic breakdown: a topic name with ordered subtopics.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicOutline {
    /// The topic name.
    pub name: NameString,
    /// Ordered subtopics with their concepts.
    pub subtopics: Vec<SubtopicOutline>,
}

impl Topics {
    /// Fold a generated breakdown into the index.
    ///
    /// Follows the same auto-vivifying, idempotent rules as element-wise
    /// insertion, so re-applying an outline is a no-op.
    pub fn add_outline(&mut self, outline: &TopicOutline) -> TopicId {
        let topic_id = self.add_topic(outline.name.clone());
        for subtopic in &outline.subtopics {
            for concept in &subtopic.concepts {
                self.add_concept(
                    outline.name.clone(),
                    subtopic.name.clone(),
                    concept.clone(),
                );
            }
            // A subtopic listed without concepts is still created.
            if subtopic.concepts.is_empty() {
                self.add_subtopic(outline.name.clone(), subtopic.name.clone());
            }
        }
        topic_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline_json() -> &'static str {
        r#"{
            "name": "Algebra",
            "subtopics": [
                {
                    "name": "LinearEquations",
                    "concepts": ["SolveForX", "Substitution"]
                },
                {
                    "name": "Graphing",
                    "concepts": ["PlotLines"]
                }
            ]
        }"#
    }

    #[test]
    fn outline_intake_matches_elementwise_insertion() {
        let outline: TopicOutline = serde_json::from_str(outline_json()).unwrap();

        let mut from_outline = Topics::new();
        from_outline.add_outline(&outline);

        let mut elementwise = Topics::new();
        for (subtopic, concept) in [
            ("LinearEquations", "SolveForX"),
            ("LinearEquations", "Substitution"),
            ("Graphing", "PlotLines"),
        ] {
            elementwise.add_concept(
                "Algebra".parse().unwrap(),
                subtopic.parse().unwrap(),
                concept.parse().unwrap(),
            );
        }

        assert_eq!(from_outline, elementwise);
    }

    #[test]
    fn invalid_names_fail_deserialization() {
        let result: Result<TopicOutline, _> =
            serde_json::from_str(r#"{"name": "Bad_Name", "subtopics": []}"#);
        assert!(result.is_err());
    }
}
