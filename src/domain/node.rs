//! Entity types for the four-level curriculum hierarchy.
//!
//! Each entity owns its children in insertion order (order is semantic: it
//! drives presentation and ordinal addressing) and carries a pair of
//! same-level dependency edge sets.

use std::{collections::BTreeSet, num::NonZeroUsize};

use serde::{Deserialize, Serialize};

use crate::domain::{
    name::NameString,
    node_id::{ConceptId, Level, NodeId, QuestionId, SubtopicId, TopicId},
};

/// Same-level dependency edges carried by every node.
///
/// The two sets are mirror views of one relation: `A` listing `B` as a
/// prerequisite implies `B` lists `A` as a postrequisite. The index is
/// responsible for keeping the mirror consistent; these are weak references
/// by ID only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    prerequisites: BTreeSet<NodeId>,
    postrequisites: BTreeSet<NodeId>,
}

impl Links {
    /// IDs of the nodes this node depends on.
    pub fn prerequisites(&self) -> impl Iterator<Item = &NodeId> {
        self.prerequisites.iter()
    }

    /// IDs of the nodes that depend on this node.
    pub fn postrequisites(&self) -> impl Iterator<Item = &NodeId> {
        self.postrequisites.iter()
    }

    /// Whether both edge sets are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prerequisites.is_empty() && self.postrequisites.is_empty()
    }

    /// Record a prerequisite edge. Self-references are ignored.
    ///
    /// Returns `true` if the edge was newly inserted.
    pub(crate) fn insert_prerequisite(&mut self, owner: &NodeId, id: NodeId) -> bool {
        if &id == owner {
            return false;
        }
        self.prerequisites.insert(id)
    }

    /// Record a postrequisite edge. Self-references are ignored.
    ///
    /// Returns `true` if the edge was newly inserted.
    pub(crate) fn insert_postrequisite(&mut self, owner: &NodeId, id: NodeId) -> bool {
        if &id == owner {
            return false;
        }
        self.postrequisites.insert(id)
    }

    pub(crate) fn from_sets(
        prerequisites: BTreeSet<NodeId>,
        postrequisites: BTreeSet<NodeId>,
    ) -> Self {
        Self {
            prerequisites,
            postrequisites,
        }
    }
}

/// How demanding a question is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Solvable in one step by a student who knows the concept.
    #[default]
    Easy,
    /// Requires combining steps within the concept.
    Medium,
    /// Requires insight beyond the concept itself.
    Hard,
}

/// A problem/solution pair nested inside a question.
///
/// Subquestions are a static, ordered breakdown of the parent question; they
/// are not addressable nodes and carry no edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subquestion {
    /// The subquestion's problem statement.
    pub problem: String,
    /// The worked solution.
    pub solution: String,
}

/// A question: the leaf level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    links: Links,
    problem: String,
    solution: String,
    difficulty: Difficulty,
    subquestions: Vec<Subquestion>,
}

impl Question {
    pub(crate) const fn from_parts(
        id: QuestionId,
        links: Links,
        problem: String,
        solution: String,
        difficulty: Difficulty,
        subquestions: Vec<Subquestion>,
    ) -> Self {
        Self {
            id,
            links,
            problem,
            solution,
            difficulty,
            subquestions,
        }
    }

    /// The question's composite ID.
    #[must_use]
    pub const fn id(&self) -> &QuestionId {
        &self.id
    }

    /// The problem statement.
    #[must_use]
    pub fn problem(&self) -> &str {
        &self.problem
    }

    /// The worked solution.
    #[must_use]
    pub fn solution(&self) -> &str {
        &self.solution
    }

    /// The question's difficulty rating.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// The ordered subquestion breakdown.
    #[must_use]
    pub fn subquestions(&self) -> &[Subquestion] {
        &self.subquestions
    }

    /// The question's dependency edges.
    #[must_use]
    pub const fn links(&self) -> &Links {
        &self.links
    }

    pub(crate) const fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

/// A concept: holds an ordered collection of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    id: ConceptId,
    links: Links,
    questions: Vec<Question>,
}

impl Concept {
    pub(crate) const fn new(id: ConceptId) -> Self {
        Self {
            id,
            links: Links {
                prerequisites: BTreeSet::new(),
                postrequisites: BTreeSet::new(),
            },
            questions: Vec::new(),
        }
    }

    /// The concept's composite ID.
    #[must_use]
    pub const fn id(&self) -> &ConceptId {
        &self.id
    }

    /// The questions under this concept, in insertion order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Find a question by ID.
    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id() == id)
    }

    /// The concept's dependency edges.
    #[must_use]
    pub const fn links(&self) -> &Links {
        &self.links
    }

    pub(crate) const fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }

    /// The number the next inserted question receives: one past the highest
    /// existing number, so numbers are never reused.
    pub(crate) fn next_question_number(&self) -> NonZeroUsize {
        self.questions
            .iter()
            .map(|question| question.id().number())
            .max()
            .map_or(NonZeroUsize::MIN, |highest| {
                highest.checked_add(1).expect("question number overflow!")
            })
    }

    pub(crate) fn question_mut(&mut self, id: &QuestionId) -> Option<&mut Question> {
        self.questions
            .iter_mut()
            .find(|question| question.id() == id)
    }

    pub(crate) fn push_question(&mut self, question: Question) {
        self.questions.push(question);
    }
}

/// A subtopic: holds an ordered collection of concepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtopic {
    id: SubtopicId,
    links: Links,
    concepts: Vec<Concept>,
}

impl Subtopic {
    pub(crate) const fn new(id: SubtopicId) -> Self {
        Self {
            id,
            links: Links {
                prerequisites: BTreeSet::new(),
                postrequisites: BTreeSet::new(),
            },
            concepts: Vec::new(),
        }
    }

    /// The subtopic's composite ID.
    #[must_use]
    pub const fn id(&self) -> &SubtopicId {
        &self.id
    }

    /// The concepts under this subtopic, in insertion order.
    #[must_use]
    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    /// Find a concept by ID.
    #[must_use]
    pub fn concept(&self, id: &ConceptId) -> Option<&Concept> {
        self.concepts.iter().find(|concept| concept.id() == id)
    }

    /// The subtopic's dependency edges.
    #[must_use]
    pub const fn links(&self) -> &Links {
        &self.links
    }

    pub(crate) const fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }

    /// Find or insert the concept with the given name, returning it.
    pub(crate) fn upsert_concept(&mut self, name: &NameString) -> &mut Concept {
        if let Some(index) = self
            .concepts
            .iter()
            .position(|concept| concept.id().concept() == name.as_str())
        {
            &mut self.concepts[index]
        } else {
            self.concepts.push(Concept::new(self.id.concept(name.clone())));
            self.concepts.last_mut().expect("just pushed")
        }
    }

    pub(crate) fn concept_mut(&mut self, id: &ConceptId) -> Option<&mut Concept> {
        self.concepts.iter_mut().find(|concept| concept.id() == id)
    }

    pub(crate) fn push_concept(&mut self, concept: Concept) {
        self.concepts.push(concept);
    }
}

/// A topic: the root level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    id: TopicId,
    links: Links,
    subtopics: Vec<Subtopic>,
}

impl Topic {
    pub(crate) const fn new(id: TopicId) -> Self {
        Self {
            id,
            links: Links {
                prerequisites: BTreeSet::new(),
                postrequisites: BTreeSet::new(),
            },
            subtopics: Vec::new(),
        }
    }

    /// The topic's composite ID.
    #[must_use]
    pub const fn id(&self) -> &TopicId {
        &self.id
    }

    /// The subtopics under this topic, in insertion order.
    #[must_use]
    pub fn subtopics(&self) -> &[Subtopic] {
        &self.subtopics
    }

    /// Find a subtopic by ID.
    #[must_use]
    pub fn subtopic(&self, id: &SubtopicId) -> Option<&Subtopic> {
        self.subtopics.iter().find(|subtopic| subtopic.id() == id)
    }

    /// The topic's dependency edges.
    #[must_use]
    pub const fn links(&self) -> &Links {
        &self.links
    }

    pub(crate) const fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }

    /// Find or insert the subtopic with the given name, returning it.
    pub(crate) fn upsert_subtopic(&mut self, name: &NameString) -> &mut Subtopic {
        if let Some(index) = self
            .subtopics
            .iter()
            .position(|subtopic| subtopic.id().subtopic() == name.as_str())
        {
            &mut self.subtopics[index]
        } else {
            self.subtopics.push(Subtopic::new(self.id.subtopic(name.clone())));
            self.subtopics.last_mut().expect("just pushed")
        }
    }

    pub(crate) fn subtopic_mut(&mut self, id: &SubtopicId) -> Option<&mut Subtopic> {
        self.subtopics
            .iter_mut()
            .find(|subtopic| subtopic.id() == id)
    }

    pub(crate) fn push_subtopic(&mut self, subtopic: Subtopic) {
        self.subtopics.push(subtopic);
    }
}

/// A borrowed view of any node in the hierarchy, tagged with its kind.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    /// A topic.
    Topic(&'a Topic),
    /// A subtopic.
    Subtopic(&'a Subtopic),
    /// A concept.
    Concept(&'a Concept),
    /// A question.
    Question(&'a Question),
}

impl NodeRef<'_> {
    /// The node's composite ID.
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Self::Topic(topic) => NodeId::Topic(topic.id().clone()),
            Self::Subtopic(subtopic) => NodeId::Subtopic(subtopic.id().clone()),
            Self::Concept(concept) => NodeId::Concept(concept.id().clone()),
            Self::Question(question) => NodeId::Question(question.id().clone()),
        }
    }

    /// The node's hierarchy level.
    #[must_use]
    pub const fn level(&self) -> Level {
        match self {
            Self::Topic(_) => Level::Topic,
            Self::Subtopic(_) => Level::Subtopic,
            Self::Concept(_) => Level::Concept,
            Self::Question(_) => Level::Question,
        }
    }

    /// The node's dependency edges.
    #[must_use]
    pub const fn links(&self) -> &Links {
        match self {
            Self::Topic(topic) => topic.links(),
            Self::Subtopic(subtopic) => subtopic.links(),
            Self::Concept(concept) => concept.links(),
            Self::Question(question) => question.links(),
        }
    }

    /// The question behind this view, if it is one.
    #[must_use]
    pub const fn as_question(&self) -> Option<&Question> {
        match self {
            Self::Question(question) => Some(question),
            _ => None,
        }
    }
}

pub(crate) enum NodeMut<'a> {
    Topic(&'a mut Topic),
    Subtopic(&'a mut Subtopic),
    Concept(&'a mut Concept),
    Question(&'a mut Question),
}

impl NodeMut<'_> {
    pub(crate) const fn links_mut(&mut self) -> &mut Links {
        match self {
            Self::Topic(topic) => topic.links_mut(),
            Self::Subtopic(subtopic) => subtopic.links_mut(),
            Self::Concept(concept) => concept.links_mut(),
            Self::Question(question) => question.links_mut(),
        }
    }
}
