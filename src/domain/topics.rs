//! The in-memory curriculum index.
//!
//! [`Topics`] owns the four-level hierarchy, resolves composite and ordinal
//! addresses to nodes, and maintains the same-level dependency relation as a
//! pair of mirrored adjacency sets.
//!
//! The index never raises for a bad lookup: not-found, malformed-id, and
//! ordinal-out-of-range all degrade to `None` with a diagnostic, so an
//! interactive caller can treat absence as "nothing to display".

use std::{collections::HashMap, fmt, num::NonZeroUsize};

use petgraph::{algo::tarjan_scc, graphmap::DiGraphMap};
use tracing::{debug, warn};

use crate::domain::{
    name::NameString,
    node::{Concept, Difficulty, Links, NodeMut, NodeRef, Question, Subquestion, Subtopic, Topic},
    node_id::{Address, ConceptId, Level, NodeId, OrdinalPath, QuestionId, SubtopicId, TopicId},
};

/// Input for inserting a question.
///
/// The ancestor chain is auto-created as needed; the question number is
/// assigned by the index at insertion time.
#[derive(Debug, Clone)]
pub struct QuestionSpec {
    /// Name of the topic the question belongs to.
    pub topic: NameString,
    /// Name of the subtopic within the topic.
    pub subtopic: NameString,
    /// Name of the concept within the subtopic.
    pub concept: NameString,
    /// The problem statement.
    pub problem: String,
    /// The worked solution.
    pub solution: String,
    /// Difficulty rating.
    pub difficulty: Difficulty,
    /// Ordered subquestion breakdown, possibly empty.
    pub subquestions: Vec<Subquestion>,
}

/// The result of processing one prerequisite in
/// [`Topics::add_prerequisites`].
///
/// None of these are fatal; the call reports what happened to each
/// prerequisite rather than failing part-way through a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// An edge pair was recorded (or already present) at the divergence
    /// level.
    Linked {
        /// The dependent node at the divergence level.
        node: NodeId,
        /// The prerequisite node at the divergence level.
        prerequisite: NodeId,
        /// The level the edge was recorded at.
        level: Level,
        /// Whether the edge already existed.
        already_linked: bool,
    },
    /// The prerequisite was the target itself; skipped.
    SelfReference {
        /// The ID that referenced itself.
        id: NodeId,
    },
    /// One path contains the other, so there is no divergence level to
    /// attach an edge to; skipped.
    NestedPaths {
        /// The dependent ID.
        id: NodeId,
        /// The prerequisite ID.
        prerequisite: NodeId,
    },
    /// The node at the divergence level does not exist in the index;
    /// skipped.
    NotFound {
        /// The missing node's ID.
        id: NodeId,
    },
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Linked {
                node,
                prerequisite,
                level,
                already_linked: false,
            } => write!(f, "linked {node} \u{2190} {prerequisite} ({level} level)"),
            Self::Linked {
                node,
                prerequisite,
                already_linked: true,
                ..
            } => write!(f, "{node} \u{2190} {prerequisite} already linked"),
            Self::SelfReference { id } => write!(f, "skipped {id}: self-reference"),
            Self::NestedPaths { id, prerequisite } => {
                write!(f, "skipped {id} \u{2190} {prerequisite}: nested paths")
            }
            Self::NotFound { id } => write!(f, "skipped: {id} not found"),
        }
    }
}

/// A dependency edge whose far end does not resolve to a node in the index.
///
/// These can only arise from hand-edited snapshots; the index itself never
/// records an edge to a missing node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingLink {
    /// The node holding the edge.
    pub node: NodeId,
    /// The referenced ID that does not resolve.
    pub target: NodeId,
    /// Whether the edge was a prerequisite (`true`) or postrequisite.
    pub prerequisite: bool,
}

/// The in-memory hierarchical curriculum index.
///
/// Topics are held in insertion order; so are each node's children. Growth
/// is monotonic: there is no removal operation, and re-inserting an existing
/// topic, subtopic, or concept is a no-op.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Topics {
    topics: Vec<Topic>,
    question_cap: Option<NonZeroUsize>,
}

impl Topics {
    /// Creates an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            topics: Vec::new(),
            question_cap: None,
        }
    }

    /// Limit the number of questions a single concept will accept.
    ///
    /// `None` removes the limit. [`Self::add_question`] declines (with a
    /// warning diagnostic) once a concept is full.
    pub const fn set_question_cap(&mut self, cap: Option<NonZeroUsize>) {
        self.question_cap = cap;
    }

    /// The configured per-concept question cap, if any.
    #[must_use]
    pub const fn question_cap(&self) -> Option<NonZeroUsize> {
        self.question_cap
    }

    /// The topics in insertion order.
    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Whether the index contains no topics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// All subtopics across all topics, in document order.
    pub fn subtopics(&self) -> impl Iterator<Item = &Subtopic> {
        self.topics.iter().flat_map(|topic| topic.subtopics().iter())
    }

    /// All concepts across all topics, in document order.
    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.subtopics()
            .flat_map(|subtopic| subtopic.concepts().iter())
    }

    /// All questions across all topics, in document order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.concepts()
            .flat_map(|concept| concept.questions().iter())
    }

    /// All nodes at every level, in document order (each node precedes its
    /// children).
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.topics.iter().flat_map(|topic| {
            std::iter::once(NodeRef::Topic(topic)).chain(topic.subtopics().iter().flat_map(
                |subtopic| {
                    std::iter::once(NodeRef::Subtopic(subtopic)).chain(
                        subtopic.concepts().iter().flat_map(|concept| {
                            std::iter::once(NodeRef::Concept(concept)).chain(
                                concept.questions().iter().map(NodeRef::Question),
                            )
                        }),
                    )
                },
            ))
        })
    }

    /// Insert a topic by name, or no-op if it already exists.
    pub fn add_topic(&mut self, name: NameString) -> TopicId {
        self.upsert_topic(&name).id().clone()
    }

    /// Insert a fully-built topic, or no-op if its ID is already present.
    ///
    /// Used when folding in externally-built structure (snapshot loading,
    /// outline intake).
    pub fn insert_topic(&mut self, topic: Topic) {
        if self.topic(topic.id()).is_some() {
            debug!(id = %topic.id(), "topic already present; insertion is a no-op");
            return;
        }
        self.topics.push(topic);
    }

    /// Insert a subtopic, auto-creating its topic if absent. No-ops if the
    /// subtopic already exists.
    pub fn add_subtopic(&mut self, topic: NameString, subtopic: NameString) -> SubtopicId {
        self.upsert_topic(&topic)
            .upsert_subtopic(&subtopic)
            .id()
            .clone()
    }

    /// Insert a concept, auto-creating its topic and subtopic if absent.
    /// No-ops if the concept already exists.
    pub fn add_concept(
        &mut self,
        topic: NameString,
        subtopic: NameString,
        concept: NameString,
    ) -> ConceptId {
        self.upsert_topic(&topic)
            .upsert_subtopic(&subtopic)
            .upsert_concept(&concept)
            .id()
            .clone()
    }

    /// Insert a question, auto-creating its whole ancestor chain if absent.
    ///
    /// The question is numbered one past the highest number already present
    /// in its concept, so numbers are monotonic and never reused. Returns
    /// `None` (with a warning diagnostic) when the concept is full per the
    /// configured cap.
    pub fn add_question(&mut self, spec: QuestionSpec) -> Option<QuestionId> {
        let cap = self.question_cap;
        let concept = self
            .upsert_topic(&spec.topic)
            .upsert_subtopic(&spec.subtopic)
            .upsert_concept(&spec.concept);

        if let Some(cap) = cap {
            if concept.questions().len() >= cap.get() {
                warn!(
                    concept = %concept.id(),
                    cap = cap.get(),
                    "concept already holds the maximum number of questions"
                );
                return None;
            }
        }

        let id = concept.id().question(concept.next_question_number());
        concept.push_question(Question::from_parts(
            id.clone(),
            Links::default(),
            spec.problem,
            spec.solution,
            spec.difficulty,
            spec.subquestions,
        ));
        Some(id)
    }

    /// Find a topic by ID.
    #[must_use]
    pub fn topic(&self, id: &TopicId) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.id() == id)
    }

    /// Find a subtopic by ID.
    #[must_use]
    pub fn subtopic(&self, id: &SubtopicId) -> Option<&Subtopic> {
        self.topic(&id.parent())?.subtopic(id)
    }

    /// Find a concept by ID.
    #[must_use]
    pub fn concept(&self, id: &ConceptId) -> Option<&Concept> {
        self.subtopic(&id.parent())?.concept(id)
    }

    /// Find a question by ID.
    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.concept(&id.parent())?.question(id)
    }

    /// Resolve a composite ID to a node, without diagnostics.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<NodeRef<'_>> {
        match id {
            NodeId::Topic(id) => self.topic(id).map(NodeRef::Topic),
            NodeId::Subtopic(id) => self.subtopic(id).map(NodeRef::Subtopic),
            NodeId::Concept(id) => self.concept(id).map(NodeRef::Concept),
            NodeId::Question(id) => self.question(id).map(NodeRef::Question),
        }
    }

    /// Resolve an address (name-based or ordinal) to a node.
    ///
    /// Misses are logged and return `None`; nothing here is fatal.
    #[must_use]
    pub fn get(&self, address: &Address) -> Option<NodeRef<'_>> {
        match address {
            Address::Name(id) => {
                let node = self.node(id);
                if node.is_none() {
                    warn!(%id, "no node found");
                }
                node
            }
            Address::Ordinal(path) => self.get_ordinal(path),
        }
    }

    /// Parse and resolve an address given as raw text.
    ///
    /// Malformed input is logged and returns `None`, like any other miss.
    #[must_use]
    pub fn resolve(&self, input: &str) -> Option<NodeRef<'_>> {
        match input.parse::<Address>() {
            Ok(address) => self.get(&address),
            Err(error) => {
                warn!(%input, %error, "unparseable address");
                None
            }
        }
    }

    /// Resolve a dotted 1-based ordinal path to a node.
    #[must_use]
    pub fn get_ordinal(&self, path: &OrdinalPath) -> Option<NodeRef<'_>> {
        let positions = path.positions();

        let Some(topic) = self.topics.get(positions[0].get() - 1) else {
            warn!(%path, position = positions[0].get(), "no topic at position");
            return None;
        };
        let Some(&position) = positions.get(1) else {
            return Some(NodeRef::Topic(topic));
        };

        let Some(subtopic) = topic.subtopics().get(position.get() - 1) else {
            warn!(%path, position = position.get(), "no subtopic at position");
            return None;
        };
        let Some(&position) = positions.get(2) else {
            return Some(NodeRef::Subtopic(subtopic));
        };

        let Some(concept) = subtopic.concepts().get(position.get() - 1) else {
            warn!(%path, position = position.get(), "no concept at position");
            return None;
        };
        let Some(&position) = positions.get(3) else {
            return Some(NodeRef::Concept(concept));
        };

        let Some(question) = concept.questions().get(position.get() - 1) else {
            warn!(%path, position = position.get(), "no question at position");
            return None;
        };
        Some(NodeRef::Question(question))
    }

    /// Record prerequisite edges from `id` to each of `prerequisites`.
    ///
    /// For each prerequisite the two ID paths are walked pairwise from the
    /// root; the edge pair (prerequisite on one side, mirrored postrequisite
    /// on the other) is recorded between the two nodes at the first depth
    /// where the paths diverge. The smallest structural unit at which the
    /// paths part ways carries the dependency; deeper levels are not
    /// duplicated.
    ///
    /// Self-references, nested paths, and unresolved scope nodes are skipped
    /// with a diagnostic. Returns one outcome per prerequisite, in order.
    pub fn add_prerequisites(
        &mut self,
        id: &NodeId,
        prerequisites: &[NodeId],
    ) -> Vec<LinkOutcome> {
        prerequisites
            .iter()
            .map(|prerequisite| self.add_prerequisite(id, prerequisite))
            .collect()
    }

    fn add_prerequisite(&mut self, id: &NodeId, prerequisite: &NodeId) -> LinkOutcome {
        if id == prerequisite {
            debug!(%id, "skipping self-referential prerequisite");
            return LinkOutcome::SelfReference { id: id.clone() };
        }

        let ours = id.segments();
        let theirs = prerequisite.segments();
        let divergence = ours
            .iter()
            .zip(theirs.iter())
            .position(|(a, b)| a != b);

        let Some(depth) = divergence else {
            debug!(%id, %prerequisite, "paths are nested; no level to attach the edge to");
            return LinkOutcome::NestedPaths {
                id: id.clone(),
                prerequisite: prerequisite.clone(),
            };
        };

        let level = Level::from_depth(depth).expect("divergence depth is within both paths");
        let node_scope = id
            .ancestor_at(level)
            .expect("divergence depth is within both paths");
        let prerequisite_scope = prerequisite
            .ancestor_at(level)
            .expect("divergence depth is within both paths");

        for scope in [&node_scope, &prerequisite_scope] {
            if self.node(scope).is_none() {
                warn!(id = %scope, "prerequisite scope node not found");
                return LinkOutcome::NotFound { id: scope.clone() };
            }
        }

        let inserted = self
            .node_mut(&node_scope)
            .expect("presence checked above")
            .links_mut()
            .insert_prerequisite(&node_scope, prerequisite_scope.clone());
        self.node_mut(&prerequisite_scope)
            .expect("presence checked above")
            .links_mut()
            .insert_postrequisite(&prerequisite_scope, node_scope.clone());

        LinkOutcome::Linked {
            node: node_scope,
            prerequisite: prerequisite_scope,
            level,
            already_linked: !inserted,
        }
    }

    /// Cycles in the prerequisite relation, as sorted groups of IDs.
    ///
    /// Edge addition is unconditional (apart from self-loops), so cycles can
    /// be recorded; this reports them for diagnostics without rejecting
    /// anything.
    #[must_use]
    pub fn prerequisite_cycles(&self) -> Vec<Vec<NodeId>> {
        let mut indices: HashMap<NodeId, usize> = HashMap::new();
        let mut ids: Vec<NodeId> = Vec::new();
        let mut index_of = |id: NodeId, ids: &mut Vec<NodeId>| -> usize {
            *indices.entry(id.clone()).or_insert_with(|| {
                ids.push(id);
                ids.len() - 1
            })
        };

        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
        let mut edges = Vec::new();
        for node in self.nodes() {
            let from = node.id();
            for target in node.links().prerequisites() {
                edges.push((from.clone(), target.clone()));
            }
        }
        for (from, to) in edges {
            let from = index_of(from, &mut ids);
            let to = index_of(to, &mut ids);
            graph.add_edge(from, to, ());
        }

        let mut cycles = Vec::new();
        for component in tarjan_scc(&graph) {
            if component.len() > 1 {
                let mut members: Vec<NodeId> =
                    component.iter().map(|&index| ids[index].clone()).collect();
                members.sort();
                cycles.push(members);
            }
        }
        cycles.sort();
        cycles
    }

    /// Edges whose far end does not resolve to a node in the index.
    #[must_use]
    pub fn dangling_links(&self) -> Vec<DanglingLink> {
        let mut dangling = Vec::new();
        for node in self.nodes() {
            let id = node.id();
            for target in node.links().prerequisites() {
                if self.node(target).is_none() {
                    dangling.push(DanglingLink {
                        node: id.clone(),
                        target: target.clone(),
                        prerequisite: true,
                    });
                }
            }
            for target in node.links().postrequisites() {
                if self.node(target).is_none() {
                    dangling.push(DanglingLink {
                        node: id.clone(),
                        target: target.clone(),
                        prerequisite: false,
                    });
                }
            }
        }
        dangling
    }

    fn upsert_topic(&mut self, name: &NameString) -> &mut Topic {
        if let Some(index) = self
            .topics
            .iter()
            .position(|topic| topic.id().topic() == name.as_str())
        {
            &mut self.topics[index]
        } else {
            self.topics.push(Topic::new(TopicId::new(name.clone())));
            self.topics.last_mut().expect("just pushed")
        }
    }

    fn node_mut(&mut self, id: &NodeId) -> Option<NodeMut<'_>> {
        match id {
            NodeId::Topic(id) => self
                .topics
                .iter_mut()
                .find(|topic| topic.id() == id)
                .map(NodeMut::Topic),
            NodeId::Subtopic(id) => self
                .topics
                .iter_mut()
                .find(|topic| *topic.id() == id.parent())?
                .subtopic_mut(id)
                .map(NodeMut::Subtopic),
            NodeId::Concept(id) => self
                .topics
                .iter_mut()
                .find(|topic| *topic.id() == id.parent().parent())?
                .subtopic_mut(&id.parent())?
                .concept_mut(id)
                .map(NodeMut::Concept),
            NodeId::Question(id) => self
                .topics
                .iter_mut()
                .find(|topic| *topic.id() == id.parent().parent().parent())?
                .subtopic_mut(&id.parent().parent())?
                .concept_mut(&id.parent())?
                .question_mut(id)
                .map(NodeMut::Question),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> NameString {
        NameString::new(s.to_string()).unwrap()
    }

    fn question_spec(topic: &str, subtopic: &str, concept: &str, problem: &str) -> QuestionSpec {
        QuestionSpec {
            topic: name(topic),
            subtopic: name(subtopic),
            concept: name(concept),
            problem: problem.to_string(),
            solution: String::new(),
            difficulty: Difficulty::default(),
            subquestions: Vec::new(),
        }
    }

    fn node_id(s: &str) -> NodeId {
        s.parse().unwrap()
    }

    #[test]
    fn get_returns_inserted_entity_with_matching_id() {
        let mut topics = Topics::new();
        let mut spec = question_spec("Algebra", "LinearEquations", "SolveForX", "Solve 2x=4");
        spec.solution = "x=2".to_string();
        topics.add_question(spec);

        let node = topics
            .resolve("Algebra_LinearEquations_SolveForX_1")
            .expect("question should resolve");
        assert_eq!(node.id().to_string(), "Algebra_LinearEquations_SolveForX_1");
        let question = node.as_question().unwrap();
        assert_eq!(question.problem(), "Solve 2x=4");
        assert_eq!(question.solution(), "x=2");
    }

    #[test]
    fn question_insertion_vivifies_ancestor_chain() {
        let mut topics = Topics::new();
        topics.add_question(question_spec("Algebra", "LinearEquations", "SolveForX", "p"));

        assert!(topics.resolve("Algebra").is_some());
        assert!(topics.resolve("Algebra_LinearEquations").is_some());
        assert!(topics.resolve("Algebra_LinearEquations_SolveForX").is_some());
    }

    #[test]
    fn repeated_insertion_is_idempotent() {
        let mut once = Topics::new();
        once.add_topic(name("Algebra"));
        once.add_subtopic(name("Algebra"), name("LinearEquations"));
        once.add_concept(name("Algebra"), name("LinearEquations"), name("SolveForX"));

        let mut twice = once.clone();
        twice.add_topic(name("Algebra"));
        twice.add_subtopic(name("Algebra"), name("LinearEquations"));
        twice.add_concept(name("Algebra"), name("LinearEquations"), name("SolveForX"));

        assert_eq!(once, twice);
    }

    #[test]
    fn readding_a_subtopic_keeps_existing_children() {
        let mut topics = Topics::new();
        topics.add_concept(name("Algebra"), name("LinearEquations"), name("SolveForX"));
        topics.add_subtopic(name("Algebra"), name("LinearEquations"));

        assert!(topics.resolve("Algebra_LinearEquations_SolveForX").is_some());
    }

    #[test]
    fn question_numbers_are_monotonic_per_concept() {
        let mut topics = Topics::new();
        let first = topics
            .add_question(question_spec("A", "B", "C", "one"))
            .unwrap();
        let second = topics
            .add_question(question_spec("A", "B", "C", "two"))
            .unwrap();
        let other = topics
            .add_question(question_spec("A", "B", "D", "other concept"))
            .unwrap();

        assert_eq!(first.to_string(), "A_B_C_1");
        assert_eq!(second.to_string(), "A_B_C_2");
        assert_eq!(other.to_string(), "A_B_D_1");
    }

    #[test]
    fn question_cap_declines_insertion() {
        let mut topics = Topics::new();
        topics.set_question_cap(NonZeroUsize::new(2));

        assert!(topics.add_question(question_spec("A", "B", "C", "1")).is_some());
        assert!(topics.add_question(question_spec("A", "B", "C", "2")).is_some());
        assert!(topics.add_question(question_spec("A", "B", "C", "3")).is_none());
        // Other concepts are unaffected.
        assert!(topics.add_question(question_spec("A", "B", "D", "1")).is_some());
    }

    #[test]
    fn prerequisites_are_mirrored_at_the_divergence_level() {
        let mut topics = Topics::new();
        topics.add_question(question_spec("Algebra", "LinearEquations", "SolveForX", "a"));
        topics.add_question(question_spec("Algebra", "Graphing", "PlotLines", "b"));

        // The two questions diverge at the subtopic level, so the edge lands
        // between the two subtopics, not between the questions themselves.
        let outcomes = topics.add_prerequisites(
            &node_id("Algebra_Graphing_PlotLines_1"),
            &[node_id("Algebra_LinearEquations_SolveForX_1")],
        );

        assert_eq!(
            outcomes,
            vec![LinkOutcome::Linked {
                node: node_id("Algebra_Graphing"),
                prerequisite: node_id("Algebra_LinearEquations"),
                level: Level::Subtopic,
                already_linked: false,
            }]
        );

        let dependent = topics.resolve("Algebra_Graphing").unwrap();
        let prerequisites: Vec<String> = dependent
            .links()
            .prerequisites()
            .map(ToString::to_string)
            .collect();
        assert_eq!(prerequisites, vec!["Algebra_LinearEquations"]);

        let prerequisite = topics.resolve("Algebra_LinearEquations").unwrap();
        let postrequisites: Vec<String> = prerequisite
            .links()
            .postrequisites()
            .map(ToString::to_string)
            .collect();
        assert_eq!(postrequisites, vec!["Algebra_Graphing"]);

        // Nothing was recorded on the questions or the shared topic.
        assert!(topics
            .resolve("Algebra_Graphing_PlotLines_1")
            .unwrap()
            .links()
            .is_empty());
        assert!(topics.resolve("Algebra").unwrap().links().is_empty());
    }

    #[test]
    fn cross_topic_prerequisites_link_the_topics() {
        let mut topics = Topics::new();
        topics.add_question(question_spec("Calculus", "Limits", "OneSided", "a"));
        topics.add_question(question_spec("Algebra", "Factoring", "Quadratics", "b"));

        let outcomes = topics.add_prerequisites(
            &node_id("Calculus_Limits_OneSided_1"),
            &[node_id("Algebra_Factoring_Quadratics_1")],
        );

        assert_eq!(
            outcomes,
            vec![LinkOutcome::Linked {
                node: node_id("Calculus"),
                prerequisite: node_id("Algebra"),
                level: Level::Topic,
                already_linked: false,
            }]
        );
    }

    #[test]
    fn self_prerequisite_is_a_no_op() {
        let mut topics = Topics::new();
        topics.add_question(question_spec("A", "B", "C", "p"));
        let id = node_id("A_B_C_1");

        let outcomes = topics.add_prerequisites(&id, std::slice::from_ref(&id));
        assert_eq!(outcomes, vec![LinkOutcome::SelfReference { id: id.clone() }]);

        let node = topics.node(&id).unwrap();
        assert!(node.links().is_empty());
    }

    #[test]
    fn nested_paths_carry_no_edge() {
        let mut topics = Topics::new();
        topics.add_question(question_spec("A", "B", "C", "p"));

        let outcomes =
            topics.add_prerequisites(&node_id("A_B_C_1"), &[node_id("A"), node_id("A_B")]);

        assert!(outcomes
            .iter()
            .all(|outcome| matches!(outcome, LinkOutcome::NestedPaths { .. })));
        assert!(topics.resolve("A").unwrap().links().is_empty());
    }

    #[test]
    fn linking_twice_is_idempotent() {
        let mut topics = Topics::new();
        topics.add_concept(name("A"), name("B"), name("C"));
        topics.add_concept(name("A"), name("B"), name("D"));

        let first = topics.add_prerequisites(&node_id("A_B_C"), &[node_id("A_B_D")]);
        let again = topics.add_prerequisites(&node_id("A_B_C"), &[node_id("A_B_D")]);

        assert!(matches!(
            first[0],
            LinkOutcome::Linked {
                already_linked: false,
                ..
            }
        ));
        assert!(matches!(
            again[0],
            LinkOutcome::Linked {
                already_linked: true,
                ..
            }
        ));
        assert_eq!(
            topics
                .resolve("A_B_C")
                .unwrap()
                .links()
                .prerequisites()
                .count(),
            1
        );
    }

    #[test]
    fn missing_prerequisite_is_reported_not_raised() {
        let mut topics = Topics::new();
        topics.add_topic(name("Algebra"));

        let outcomes =
            topics.add_prerequisites(&node_id("Algebra"), &[node_id("Geometry")]);
        assert_eq!(
            outcomes,
            vec![LinkOutcome::NotFound {
                id: node_id("Geometry")
            }]
        );
        assert!(topics.resolve("Algebra").unwrap().links().is_empty());
    }

    #[test]
    fn ordinal_and_name_addressing_agree_on_first_children() {
        let mut topics = Topics::new();
        topics.add_question(question_spec("Algebra", "LinearEquations", "SolveForX", "p"));

        for (ordinal, named) in [
            ("1", "Algebra"),
            ("1.1", "Algebra_LinearEquations"),
            ("1.1.1", "Algebra_LinearEquations_SolveForX"),
            ("1.1.1.1", "Algebra_LinearEquations_SolveForX_1"),
        ] {
            let by_ordinal = topics.resolve(ordinal).expect("ordinal should resolve");
            let by_name = topics.resolve(named).expect("name should resolve");
            assert_eq!(by_ordinal.id(), by_name.id());
        }
    }

    #[test]
    fn out_of_range_ordinal_returns_none() {
        let mut topics = Topics::new();
        topics.add_topic(name("Algebra"));

        assert!(topics.resolve("2.1").is_none());
        assert!(topics.resolve("1.1").is_none());
        // A bare numeral is a topic name, not an ordinal.
        assert!(topics.resolve("2").is_none());
    }

    #[test]
    fn malformed_address_returns_none() {
        let topics = Topics::new();
        assert!(topics.resolve("").is_none());
        assert!(topics.resolve("A_B_C_1_2").is_none());
        assert!(topics.resolve("A_B_C_zero").is_none());
    }

    #[test]
    fn prerequisite_cycles_are_detected() {
        let mut topics = Topics::new();
        topics.add_subtopic(name("A"), name("One"));
        topics.add_subtopic(name("A"), name("Two"));

        topics.add_prerequisites(&node_id("A_One"), &[node_id("A_Two")]);
        topics.add_prerequisites(&node_id("A_Two"), &[node_id("A_One")]);

        let cycles = topics.prerequisite_cycles();
        assert_eq!(cycles, vec![vec![node_id("A_One"), node_id("A_Two")]]);
    }

    #[test]
    fn acyclic_links_report_no_cycles() {
        let mut topics = Topics::new();
        topics.add_subtopic(name("A"), name("One"));
        topics.add_subtopic(name("A"), name("Two"));
        topics.add_prerequisites(&node_id("A_Two"), &[node_id("A_One")]);

        assert!(topics.prerequisite_cycles().is_empty());
        assert!(topics.dangling_links().is_empty());
    }

    #[test]
    fn flat_iterators_span_topics_without_collisions() {
        let mut topics = Topics::new();
        // The same subtopic and concept names under two different topics
        // yield distinct composite IDs, so nothing merges or shadows.
        topics.add_concept(name("Algebra"), name("Basics"), name("Notation"));
        topics.add_concept(name("Geometry"), name("Basics"), name("Notation"));

        let subtopic_ids: Vec<String> = topics
            .subtopics()
            .map(|subtopic| subtopic.id().to_string())
            .collect();
        assert_eq!(subtopic_ids, vec!["Algebra_Basics", "Geometry_Basics"]);
        assert_eq!(topics.concepts().count(), 2);
    }
}
