//! The JSON snapshot format.
//!
//! A snapshot mirrors the in-memory nesting exactly: a top-level
//! `{"topics": {...}}` object whose entries nest `subtopics`, `concepts`,
//! and `questions` maps, each entry keyed by its composite ID and repeating
//! its name fields. Key order is insertion order and is semantically
//! meaningful (it drives display and ordinal addressing), so maps are
//! (de)serialized through an order-preserving entry list rather than any
//! sorting container.
//!
//! The document types here are the storage representation; conversion into
//! domain types revalidates what the file claims. Entry keys that disagree
//! with the IDs derived from the name fields are diagnostics, not errors —
//! the name fields are authoritative, and a child's ancestor names are
//! overridden by the structure that actually contains it.

use std::{collections::BTreeSet, marker::PhantomData, num::NonZeroUsize};

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Serialize,
};
use tracing::warn;

use crate::domain::{
    name::NameString,
    node::{Concept, Difficulty, Links, Question, Subquestion, Subtopic, Topic},
    node_id::{ConceptId, NodeId, SubtopicId, TopicId},
    topics::Topics,
};

/// Serialize an index to the pretty-printed snapshot document.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn to_json(topics: &Topics) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&TopicsDoc::from(topics))
}

/// Parse a snapshot document into an index.
///
/// Structural problems (malformed JSON, invalid names, missing fields) are
/// errors; entry keys that disagree with the derived IDs are warned about
/// and resolved in favour of the name fields.
///
/// # Errors
///
/// Returns an error if the document cannot be parsed.
pub fn from_json(document: &str) -> serde_json::Result<Topics> {
    let doc: TopicsDoc = serde_json::from_str(document)?;
    Ok(doc.into_topics())
}

/// A map that keeps its entries in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entries<T>(Vec<(String, T)>);

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: Serialize> Serialize for Entries<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Entries<T>;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a map of composite IDs to entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TopicsDoc {
    topics: Entries<TopicDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TopicDoc {
    topic: NameString,
    #[serde(default)]
    prerequisite_ids: Vec<NodeId>,
    #[serde(default)]
    postrequisite_ids: Vec<NodeId>,
    #[serde(default)]
    subtopics: Entries<SubtopicDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubtopicDoc {
    topic: NameString,
    subtopic: NameString,
    #[serde(default)]
    prerequisite_ids: Vec<NodeId>,
    #[serde(default)]
    postrequisite_ids: Vec<NodeId>,
    #[serde(default)]
    concepts: Entries<ConceptDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConceptDoc {
    topic: NameString,
    subtopic: NameString,
    concept: NameString,
    #[serde(default)]
    prerequisite_ids: Vec<NodeId>,
    #[serde(default)]
    postrequisite_ids: Vec<NodeId>,
    #[serde(default)]
    questions: Entries<QuestionDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct QuestionDoc {
    topic: NameString,
    subtopic: NameString,
    concept: NameString,
    question_number: NonZeroUsize,
    problem: String,
    solution: String,
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default)]
    subquestions: Vec<Subquestion>,
    #[serde(default)]
    prerequisite_ids: Vec<NodeId>,
    #[serde(default)]
    postrequisite_ids: Vec<NodeId>,
}

fn links(owner: &NodeId, prerequisites: Vec<NodeId>, postrequisites: Vec<NodeId>) -> Links {
    let filter = |ids: Vec<NodeId>, direction: &str| -> BTreeSet<NodeId> {
        ids.into_iter()
            .filter(|id| {
                if id == owner {
                    warn!(%owner, "dropping self-referential {direction} edge");
                    false
                } else {
                    true
                }
            })
            .collect()
    };
    let prerequisites = filter(prerequisites, "prerequisite");
    let postrequisites = filter(postrequisites, "postrequisite");
    Links::from_sets(prerequisites, postrequisites)
}

fn check_key(key: &str, derived: &NodeId) {
    if key != derived.to_string() {
        warn!(key, %derived, "entry key disagrees with the ID derived from its fields");
    }
}

impl TopicsDoc {
    fn into_topics(self) -> Topics {
        let mut topics = Topics::new();
        for (key, doc) in self.topics.0 {
            let topic = doc.into_topic(&key);
            topics.insert_topic(topic);
        }
        topics
    }
}

impl TopicDoc {
    fn into_topic(self, key: &str) -> Topic {
        let id = TopicId::new(self.topic);
        check_key(key, &NodeId::Topic(id.clone()));

        let mut topic = Topic::new(id.clone());
        *topic.links_mut() = links(
            &NodeId::Topic(id.clone()),
            self.prerequisite_ids,
            self.postrequisite_ids,
        );
        for (subtopic_key, doc) in self.subtopics.0 {
            topic.push_subtopic(doc.into_subtopic(&id, &subtopic_key));
        }
        topic
    }
}

impl SubtopicDoc {
    fn into_subtopic(self, parent: &TopicId, key: &str) -> Subtopic {
        if self.topic.as_str() != parent.topic() {
            warn!(
                claimed = %self.topic,
                actual = %parent,
                "subtopic claims a different topic; the containing structure wins"
            );
        }
        let id = parent.subtopic(self.subtopic);
        check_key(key, &NodeId::Subtopic(id.clone()));

        let mut subtopic = Subtopic::new(id.clone());
        *subtopic.links_mut() = links(
            &NodeId::Subtopic(id.clone()),
            self.prerequisite_ids,
            self.postrequisite_ids,
        );
        for (concept_key, doc) in self.concepts.0 {
            subtopic.push_concept(doc.into_concept(&id, &concept_key));
        }
        subtopic
    }
}

impl ConceptDoc {
    fn into_concept(self, parent: &SubtopicId, key: &str) -> Concept {
        if self.topic.as_str() != parent.topic() || self.subtopic.as_str() != parent.subtopic() {
            warn!(
                claimed = %format!("{}_{}", self.topic, self.subtopic),
                actual = %parent,
                "concept claims a different ancestry; the containing structure wins"
            );
        }
        let id = parent.concept(self.concept);
        check_key(key, &NodeId::Concept(id.clone()));

        let mut concept = Concept::new(id.clone());
        *concept.links_mut() = links(
            &NodeId::Concept(id.clone()),
            self.prerequisite_ids,
            self.postrequisite_ids,
        );
        for (question_key, doc) in self.questions.0 {
            concept.push_question(doc.into_question(&id, &question_key));
        }
        concept
    }
}

impl QuestionDoc {
    fn into_question(self, parent: &ConceptId, key: &str) -> Question {
        if self.topic.as_str() != parent.topic()
            || self.subtopic.as_str() != parent.subtopic()
            || self.concept.as_str() != parent.concept()
        {
            warn!(
                claimed = %format!("{}_{}_{}", self.topic, self.subtopic, self.concept),
                actual = %parent,
                "question claims a different ancestry; the containing structure wins"
            );
        }
        let id = parent.question(self.question_number);
        check_key(key, &NodeId::Question(id.clone()));

        Question::from_parts(
            id.clone(),
            links(
                &NodeId::Question(id),
                self.prerequisite_ids,
                self.postrequisite_ids,
            ),
            self.problem,
            self.solution,
            self.difficulty,
            self.subquestions,
        )
    }
}

fn name(s: &str) -> NameString {
    NameString::new(s.to_string()).expect("stored names were validated on construction")
}

impl From<&Topics> for TopicsDoc {
    fn from(topics: &Topics) -> Self {
        let entries = topics
            .topics()
            .iter()
            .map(|topic| (topic.id().to_string(), TopicDoc::from(topic)))
            .collect();
        Self {
            topics: Entries(entries),
        }
    }
}

impl From<&Topic> for TopicDoc {
    fn from(topic: &Topic) -> Self {
        Self {
            topic: name(topic.id().topic()),
            prerequisite_ids: topic.links().prerequisites().cloned().collect(),
            postrequisite_ids: topic.links().postrequisites().cloned().collect(),
            subtopics: Entries(
                topic
                    .subtopics()
                    .iter()
                    .map(|subtopic| (subtopic.id().to_string(), SubtopicDoc::from(subtopic)))
                    .collect(),
            ),
        }
    }
}

impl From<&Subtopic> for SubtopicDoc {
    fn from(subtopic: &Subtopic) -> Self {
        Self {
            topic: name(subtopic.id().topic()),
            subtopic: name(subtopic.id().subtopic()),
            prerequisite_ids: subtopic.links().prerequisites().cloned().collect(),
            postrequisite_ids: subtopic.links().postrequisites().cloned().collect(),
            concepts: Entries(
                subtopic
                    .concepts()
                    .iter()
                    .map(|concept| (concept.id().to_string(), ConceptDoc::from(concept)))
                    .collect(),
            ),
        }
    }
}

impl From<&Concept> for ConceptDoc {
    fn from(concept: &Concept) -> Self {
        Self {
            topic: name(concept.id().topic()),
            subtopic: name(concept.id().subtopic()),
            concept: name(concept.id().concept()),
            prerequisite_ids: concept.links().prerequisites().cloned().collect(),
            postrequisite_ids: concept.links().postrequisites().cloned().collect(),
            questions: Entries(
                concept
                    .questions()
                    .iter()
                    .map(|question| (question.id().to_string(), QuestionDoc::from(question)))
                    .collect(),
            ),
        }
    }
}

impl From<&Question> for QuestionDoc {
    fn from(question: &Question) -> Self {
        Self {
            topic: name(question.id().topic()),
            subtopic: name(question.id().subtopic()),
            concept: name(question.id().concept()),
            question_number: question.id().number(),
            problem: question.problem().to_string(),
            solution: question.solution().to_string(),
            difficulty: question.difficulty(),
            subquestions: question.subquestions().to_vec(),
            prerequisite_ids: question.links().prerequisites().cloned().collect(),
            postrequisite_ids: question.links().postrequisites().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{node::Difficulty, topics::QuestionSpec};

    use super::*;

    fn sample() -> Topics {
        let mut topics = Topics::new();
        // Deliberately not alphabetical, so order preservation is visible.
        topics.add_topic("Trigonometry".parse().unwrap());
        topics.add_question(QuestionSpec {
            topic: "Algebra".parse().unwrap(),
            subtopic: "LinearEquations".parse().unwrap(),
            concept: "SolveForX".parse().unwrap(),
            problem: "Solve 2x=4".to_string(),
            solution: "x=2".to_string(),
            difficulty: Difficulty::Medium,
            subquestions: vec![Subquestion {
                problem: "Divide both sides by 2".to_string(),
                solution: "x=2".to_string(),
            }],
        });
        topics.add_question(QuestionSpec {
            topic: "Algebra".parse().unwrap(),
            subtopic: "Graphing".parse().unwrap(),
            concept: "PlotLines".parse().unwrap(),
            problem: "Plot y=x".to_string(),
            solution: "A diagonal line".to_string(),
            difficulty: Difficulty::Easy,
            subquestions: Vec::new(),
        });
        topics.add_prerequisites(
            &"Algebra_Graphing_PlotLines_1".parse().unwrap(),
            &["Algebra_LinearEquations_SolveForX_1".parse().unwrap()],
        );
        topics
    }

    #[test]
    fn round_trip_is_lossless() {
        let topics = sample();
        let document = to_json(&topics).unwrap();
        let reloaded = from_json(&document).unwrap();

        assert_eq!(reloaded, topics);
        // A second pass produces the identical document, key order included.
        assert_eq!(to_json(&reloaded).unwrap(), document);
    }

    #[test]
    fn document_keys_are_composite_ids_in_insertion_order() {
        let document = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();

        // serde_json's default map sorts keys, so probe order positionally
        // on the raw text instead.
        let trig = document.find("\"Trigonometry\"").unwrap();
        let algebra = document.find("\"Algebra\":").unwrap();
        assert!(trig < algebra, "insertion order must be preserved");

        let question = &value["topics"]["Algebra"]["subtopics"]["Algebra_LinearEquations"]
            ["concepts"]["Algebra_LinearEquations_SolveForX"]["questions"]
            ["Algebra_LinearEquations_SolveForX_1"];
        assert_eq!(question["problem"], "Solve 2x=4");
        assert_eq!(question["question_number"], 1);
        assert_eq!(question["difficulty"], "medium");
    }

    #[test]
    fn edges_survive_the_round_trip() {
        let topics = from_json(&to_json(&sample()).unwrap()).unwrap();

        let subtopic = topics.resolve("Algebra_Graphing").unwrap();
        let prerequisites: Vec<String> = subtopic
            .links()
            .prerequisites()
            .map(ToString::to_string)
            .collect();
        assert_eq!(prerequisites, vec!["Algebra_LinearEquations"]);
    }

    #[test]
    fn mismatched_keys_resolve_to_the_name_fields() {
        let document = r#"{
            "topics": {
                "WrongKey": {
                    "topic": "Algebra",
                    "prerequisite_ids": [],
                    "postrequisite_ids": [],
                    "subtopics": {}
                }
            }
        }"#;

        let topics = from_json(document).unwrap();
        assert!(topics.resolve("Algebra").is_some());
        assert!(topics.resolve("WrongKey").is_none());
    }

    #[test]
    fn self_referential_edges_are_dropped_on_load() {
        let document = r#"{
            "topics": {
                "Algebra": {
                    "topic": "Algebra",
                    "prerequisite_ids": ["Algebra"],
                    "postrequisite_ids": []
                }
            }
        }"#;

        let topics = from_json(document).unwrap();
        assert!(topics.resolve("Algebra").unwrap().links().is_empty());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(from_json("not json").is_err());
        assert!(from_json(r#"{"topics": {"A": {"topic": "With_Separator"}}}"#).is_err());
    }

    #[test]
    fn question_numbers_from_the_file_are_kept() {
        // A hand-edited snapshot with a gap in the numbering survives, and
        // the next insertion continues past the highest number.
        let document = r#"{
            "topics": {
                "A": {
                    "topic": "A",
                    "subtopics": {
                        "A_B": {
                            "topic": "A",
                            "subtopic": "B",
                            "concepts": {
                                "A_B_C": {
                                    "topic": "A",
                                    "subtopic": "B",
                                    "concept": "C",
                                    "questions": {
                                        "A_B_C_3": {
                                            "topic": "A",
                                            "subtopic": "B",
                                            "concept": "C",
                                            "question_number": 3,
                                            "problem": "p",
                                            "solution": "s"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }"#;

        let mut topics = from_json(document).unwrap();
        assert!(topics.resolve("A_B_C_3").is_some());

        let next = topics
            .add_question(QuestionSpec {
                topic: "A".parse().unwrap(),
                subtopic: "B".parse().unwrap(),
                concept: "C".parse().unwrap(),
                problem: "q".to_string(),
                solution: "t".to_string(),
                difficulty: Difficulty::default(),
                subquestions: Vec::new(),
            })
            .unwrap();
        assert_eq!(next.to_string(), "A_B_C_4");
    }
}
