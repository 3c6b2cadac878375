use std::{fmt, num::NonZeroUsize, str::FromStr};

use crate::domain::name::{InvalidNameError, NameString};

/// The character that joins name segments into a composite ID.
pub const SEPARATOR: char = '_';

/// The character that joins positions in a dotted ordinal address.
pub const ORDINAL_SEPARATOR: char = '.';

/// The four levels of the curriculum hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// A top-level topic.
    Topic,
    /// A subtopic within a topic.
    Subtopic,
    /// A concept within a subtopic.
    Concept,
    /// A question within a concept.
    Question,
}

impl Level {
    /// The zero-based depth of this level (`Topic` is 0).
    #[must_use]
    pub const fn depth(self) -> usize {
        match self {
            Self::Topic => 0,
            Self::Subtopic => 1,
            Self::Concept => 2,
            Self::Question => 3,
        }
    }

    /// The level at the given zero-based depth, if any.
    #[must_use]
    pub const fn from_depth(depth: usize) -> Option<Self> {
        match depth {
            0 => Some(Self::Topic),
            1 => Some(Self::Subtopic),
            2 => Some(Self::Concept),
            3 => Some(Self::Question),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Topic => "topic",
            Self::Subtopic => "subtopic",
            Self::Concept => "concept",
            Self::Question => "question",
        };
        write!(f, "{name}")
    }
}

/// The composite ID of a topic: `{topic}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopicId {
    topic: NameString,
}

impl TopicId {
    /// Create a topic ID from a validated name.
    #[must_use]
    pub const fn new(topic: NameString) -> Self {
        Self { topic }
    }

    /// The topic name.
    #[must_use]
    pub fn topic(&self) -> &str {
        self.topic.as_str()
    }

    /// The ID of a subtopic under this topic.
    #[must_use]
    pub fn subtopic(&self, subtopic: NameString) -> SubtopicId {
        SubtopicId {
            topic: self.topic.clone(),
            subtopic,
        }
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.topic)
    }
}

/// The composite ID of a subtopic: `{topic}_{subtopic}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubtopicId {
    topic: NameString,
    subtopic: NameString,
}

impl SubtopicId {
    /// Create a subtopic ID from validated names.
    #[must_use]
    pub const fn new(topic: NameString, subtopic: NameString) -> Self {
        Self { topic, subtopic }
    }

    /// The topic name.
    #[must_use]
    pub fn topic(&self) -> &str {
        self.topic.as_str()
    }

    /// The subtopic name.
    #[must_use]
    pub fn subtopic(&self) -> &str {
        self.subtopic.as_str()
    }

    /// The ID of the containing topic.
    #[must_use]
    pub fn parent(&self) -> TopicId {
        TopicId::new(self.topic.clone())
    }

    /// The ID of a concept under this subtopic.
    #[must_use]
    pub fn concept(&self, concept: NameString) -> ConceptId {
        ConceptId {
            topic: self.topic.clone(),
            subtopic: self.subtopic.clone(),
            concept,
        }
    }
}

impl fmt::Display for SubtopicId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.topic, self.subtopic)
    }
}

/// The composite ID of a concept: `{topic}_{subtopic}_{concept}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConceptId {
    topic: NameString,
    subtopic: NameString,
    concept: NameString,
}

impl ConceptId {
    /// Create a concept ID from validated names.
    #[must_use]
    pub const fn new(topic: NameString, subtopic: NameString, concept: NameString) -> Self {
        Self {
            topic,
            subtopic,
            concept,
        }
    }

    /// The topic name.
    #[must_use]
    pub fn topic(&self) -> &str {
        self.topic.as_str()
    }

    /// The subtopic name.
    #[must_use]
    pub fn subtopic(&self) -> &str {
        self.subtopic.as_str()
    }

    /// The concept name.
    #[must_use]
    pub fn concept(&self) -> &str {
        self.concept.as_str()
    }

    /// The ID of the containing subtopic.
    #[must_use]
    pub fn parent(&self) -> SubtopicId {
        SubtopicId::new(self.topic.clone(), self.subtopic.clone())
    }

    /// The ID of a question under this concept.
    #[must_use]
    pub fn question(&self, number: NonZeroUsize) -> QuestionId {
        QuestionId {
            topic: self.topic.clone(),
            subtopic: self.subtopic.clone(),
            concept: self.concept.clone(),
            number,
        }
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.topic, self.subtopic, self.concept
        )
    }
}

/// The composite ID of a question:
/// `{topic}_{subtopic}_{concept}_{question_number}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuestionId {
    topic: NameString,
    subtopic: NameString,
    concept: NameString,
    number: NonZeroUsize,
}

impl QuestionId {
    /// Create a question ID from validated names and a 1-based number.
    #[must_use]
    pub const fn new(
        topic: NameString,
        subtopic: NameString,
        concept: NameString,
        number: NonZeroUsize,
    ) -> Self {
        Self {
            topic,
            subtopic,
            concept,
            number,
        }
    }

    /// The topic name.
    #[must_use]
    pub fn topic(&self) -> &str {
        self.topic.as_str()
    }

    /// The subtopic name.
    #[must_use]
    pub fn subtopic(&self) -> &str {
        self.subtopic.as_str()
    }

    /// The concept name.
    #[must_use]
    pub fn concept(&self) -> &str {
        self.concept.as_str()
    }

    /// The 1-based question number within its concept.
    #[must_use]
    pub const fn number(&self) -> NonZeroUsize {
        self.number
    }

    /// The ID of the containing concept.
    #[must_use]
    pub fn parent(&self) -> ConceptId {
        ConceptId::new(
            self.topic.clone(),
            self.subtopic.clone(),
            self.concept.clone(),
        )
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            self.topic, self.subtopic, self.concept, self.number
        )
    }
}

/// A single path segment of a composite ID, used when comparing two IDs
/// position by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A name segment (topic, subtopic, or concept).
    Name(&'a NameString),
    /// A question-number segment.
    Number(NonZeroUsize),
}

/// The composite ID of any node in the hierarchy, tagged with its level.
///
/// The number of separators in the textual form determines the level: zero
/// separators address a topic, one a subtopic, two a concept, and three a
/// question.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeId {
    /// A topic ID.
    Topic(TopicId),
    /// A subtopic ID.
    Subtopic(SubtopicId),
    /// A concept ID.
    Concept(ConceptId),
    /// A question ID.
    Question(QuestionId),
}

impl NodeId {
    /// The hierarchy level this ID addresses.
    #[must_use]
    pub const fn level(&self) -> Level {
        match self {
            Self::Topic(_) => Level::Topic,
            Self::Subtopic(_) => Level::Subtopic,
            Self::Concept(_) => Level::Concept,
            Self::Question(_) => Level::Question,
        }
    }

    /// The ID of the containing topic.
    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        match self {
            Self::Topic(id) => id.clone(),
            Self::Subtopic(id) => id.parent(),
            Self::Concept(id) => id.parent().parent(),
            Self::Question(id) => id.parent().parent().parent(),
        }
    }

    /// The path segments of this ID, root first.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment<'_>> {
        match self {
            Self::Topic(id) => vec![Segment::Name(&id.topic)],
            Self::Subtopic(id) => vec![Segment::Name(&id.topic), Segment::Name(&id.subtopic)],
            Self::Concept(id) => vec![
                Segment::Name(&id.topic),
                Segment::Name(&id.subtopic),
                Segment::Name(&id.concept),
            ],
            Self::Question(id) => vec![
                Segment::Name(&id.topic),
                Segment::Name(&id.subtopic),
                Segment::Name(&id.concept),
                Segment::Number(id.number),
            ],
        }
    }

    /// The ancestor of this ID (or the ID itself) at the given level.
    ///
    /// Returns `None` if `level` is deeper than the ID.
    #[must_use]
    pub fn ancestor_at(&self, level: Level) -> Option<Self> {
        if level.depth() > self.level().depth() {
            return None;
        }
        let id = match (self, level) {
            (id, _) if level == id.level() => id.clone(),
            (Self::Subtopic(id), Level::Topic) => Self::Topic(id.parent()),
            (Self::Concept(id), Level::Topic) => Self::Topic(id.parent().parent()),
            (Self::Concept(id), Level::Subtopic) => Self::Subtopic(id.parent()),
            (Self::Question(id), Level::Topic) => Self::Topic(id.parent().parent().parent()),
            (Self::Question(id), Level::Subtopic) => Self::Subtopic(id.parent().parent()),
            (Self::Question(id), Level::Concept) => Self::Concept(id.parent()),
            _ => unreachable!("depth comparison covers all remaining combinations"),
        };
        Some(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Topic(id) => id.fmt(f),
            Self::Subtopic(id) => id.fmt(f),
            Self::Concept(id) => id.fmt(f),
            Self::Question(id) => id.fmt(f),
        }
    }
}

impl From<TopicId> for NodeId {
    fn from(id: TopicId) -> Self {
        Self::Topic(id)
    }
}

impl From<SubtopicId> for NodeId {
    fn from(id: SubtopicId) -> Self {
        Self::Subtopic(id)
    }
}

impl From<ConceptId> for NodeId {
    fn from(id: ConceptId) -> Self {
        Self::Concept(id)
    }
}

impl From<QuestionId> for NodeId {
    fn from(id: QuestionId) -> Self {
        Self::Question(id)
    }
}

/// Errors that can occur when parsing an ID or address.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The input is empty or structurally malformed.
    #[error("Invalid ID '{0}': empty or malformed")]
    Syntax(String),

    /// A name segment failed validation.
    #[error("Invalid ID '{id}': {source}")]
    Name {
        /// The full input that failed to parse.
        id: String,
        /// The underlying name validation error.
        source: InvalidNameError,
    },

    /// More than four segments.
    #[error("Invalid ID '{0}': more segments than a question path")]
    Depth(String),

    /// The final segment of a question ID is not a positive integer.
    #[error("Invalid question number in ID '{0}': expected a positive integer, got '{1}'")]
    QuestionNumber(String, String),

    /// A dotted address is not one to four positive integers.
    #[error("Invalid ordinal address '{0}': expected 1-4 dot-separated positive integers")]
    Ordinal(String),
}

fn parse_name(id: &str, segment: &str) -> Result<NameString, Error> {
    NameString::new(segment.to_string()).map_err(|source| Error::Name {
        id: id.to_string(),
        source,
    })
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::Syntax(s.to_string()));
        }

        let parts: Vec<&str> = s.split(SEPARATOR).collect();
        match parts.as_slice() {
            [topic] => Ok(Self::Topic(TopicId::new(parse_name(s, topic)?))),
            [topic, subtopic] => Ok(Self::Subtopic(SubtopicId::new(
                parse_name(s, topic)?,
                parse_name(s, subtopic)?,
            ))),
            [topic, subtopic, concept] => Ok(Self::Concept(ConceptId::new(
                parse_name(s, topic)?,
                parse_name(s, subtopic)?,
                parse_name(s, concept)?,
            ))),
            [topic, subtopic, concept, number] => {
                let number = number
                    .parse::<NonZeroUsize>()
                    .map_err(|_| Error::QuestionNumber(s.to_string(), (*number).to_string()))?;
                Ok(Self::Question(QuestionId::new(
                    parse_name(s, topic)?,
                    parse_name(s, subtopic)?,
                    parse_name(s, concept)?,
                    number,
                )))
            }
            _ => Err(Error::Depth(s.to_string())),
        }
    }
}

impl TryFrom<&str> for NodeId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}

impl serde::Serialize for NodeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for NodeId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A dotted 1-based ordinal address, e.g. `"2.1.3"` for the third concept of
/// the first subtopic of the second topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrdinalPath(Vec<NonZeroUsize>);

impl OrdinalPath {
    /// Create an ordinal path from 1-based positions, root first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Ordinal`] if `positions` is empty or longer than the
    /// hierarchy is deep.
    pub fn new(positions: Vec<NonZeroUsize>) -> Result<Self, Error> {
        if positions.is_empty() || positions.len() > 4 {
            let joined = positions
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(".");
            return Err(Error::Ordinal(joined));
        }
        Ok(Self(positions))
    }

    /// The 1-based positions, root first.
    #[must_use]
    pub fn positions(&self) -> &[NonZeroUsize] {
        &self.0
    }

    /// The hierarchy level this address points at.
    #[must_use]
    pub fn level(&self) -> Level {
        Level::from_depth(self.0.len() - 1).expect("length is validated on construction")
    }
}

impl fmt::Display for OrdinalPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for position in &self.0 {
            if !first {
                write!(f, "{ORDINAL_SEPARATOR}")?;
            }
            write!(f, "{position}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for OrdinalPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let positions = s
            .split(ORDINAL_SEPARATOR)
            .map(|part| part.parse::<NonZeroUsize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| Error::Ordinal(s.to_string()))?;
        Self::new(positions)
    }
}

/// An address accepted by lookup: either a name-based composite ID or a
/// dotted ordinal path.
///
/// Classification follows the composite grammar: anything containing the
/// `_` separator (or neither metacharacter) is name-based; a dotted string
/// of positive integers is ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// A name-based composite ID.
    Name(NodeId),
    /// A 1-based positional address.
    Ordinal(OrdinalPath),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Name(id) => id.fmt(f),
            Self::Ordinal(path) => path.fmt(f),
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::Syntax(s.to_string()));
        }
        if !s.contains(SEPARATOR) && s.contains(ORDINAL_SEPARATOR) {
            return Ok(Self::Ordinal(s.parse()?));
        }
        Ok(Self::Name(s.parse()?))
    }
}

impl From<NodeId> for Address {
    fn from(id: NodeId) -> Self {
        Self::Name(id)
    }
}

impl From<OrdinalPath> for Address {
    fn from(path: OrdinalPath) -> Self {
        Self::Ordinal(path)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn name(s: &str) -> NameString {
        NameString::new(s.to_string()).unwrap()
    }

    #[test_case("Algebra", Level::Topic; "topic depth")]
    #[test_case("Algebra_LinearEquations", Level::Subtopic; "subtopic depth")]
    #[test_case("Algebra_LinearEquations_SolveForX", Level::Concept; "concept depth")]
    #[test_case("Algebra_LinearEquations_SolveForX_1", Level::Question; "question depth")]
    fn separator_count_determines_level(id: &str, level: Level) {
        let parsed: NodeId = id.parse().unwrap();
        assert_eq!(parsed.level(), level);
        assert_eq!(parsed.to_string(), id);
    }

    #[test]
    fn question_id_parses_number() {
        let parsed: NodeId = "Algebra_LinearEquations_SolveForX_3".parse().unwrap();
        let NodeId::Question(question) = parsed else {
            panic!("expected question ID");
        };
        assert_eq!(question.number().get(), 3);
        assert_eq!(question.concept(), "SolveForX");
        assert_eq!(question.topic(), "Algebra");
    }

    #[test_case(""; "empty")]
    #[test_case("A_B_C_1_extra"; "five segments")]
    fn malformed_ids_are_rejected(id: &str) {
        assert!(id.parse::<NodeId>().is_err());
    }

    #[test]
    fn question_number_must_be_positive_integer() {
        assert!(matches!(
            "A_B_C_zero".parse::<NodeId>(),
            Err(Error::QuestionNumber(_, _))
        ));
        assert!(matches!(
            "A_B_C_0".parse::<NodeId>(),
            Err(Error::QuestionNumber(_, _))
        ));
    }

    #[test]
    fn empty_segment_is_rejected() {
        assert!(matches!(
            "Algebra__SolveForX".parse::<NodeId>(),
            Err(Error::Name { .. })
        ));
    }

    #[test]
    fn ancestors_truncate_the_path() {
        let id: NodeId = "Algebra_LinearEquations_SolveForX_1".parse().unwrap();
        assert_eq!(
            id.ancestor_at(Level::Subtopic).unwrap().to_string(),
            "Algebra_LinearEquations"
        );
        assert_eq!(id.ancestor_at(Level::Question), Some(id.clone()));

        let topic: NodeId = "Algebra".parse().unwrap();
        assert_eq!(topic.ancestor_at(Level::Concept), None);
    }

    #[test]
    fn segments_compare_by_position() {
        let a: NodeId = "Algebra_LinearEquations_SolveForX_1".parse().unwrap();
        let b: NodeId = "Algebra_Graphing_SolveForX_1".parse().unwrap();
        let (a, b) = (a.segments(), b.segments());
        assert_eq!(a[0], b[0]);
        assert_ne!(a[1], b[1]);
        assert_eq!(a[2], b[2]);
        assert_eq!(a[3], b[3]);
    }

    #[test_case("1", &[1]; "single position")]
    #[test_case("1.2", &[1, 2]; "two positions")]
    #[test_case("2.1.3.4", &[2, 1, 3, 4]; "full path")]
    fn ordinal_paths_parse(address: &str, expected: &[usize]) {
        let parsed: OrdinalPath = address.parse().unwrap();
        let positions: Vec<usize> = parsed.positions().iter().map(|p| p.get()).collect();
        assert_eq!(positions, expected);
        assert_eq!(parsed.to_string(), address);
    }

    #[test_case("0.1"; "zero position")]
    #[test_case("1.2.3.4.5"; "too deep")]
    #[test_case("1..2"; "empty position")]
    fn malformed_ordinals_are_rejected(address: &str) {
        assert!(matches!(
            address.parse::<OrdinalPath>(),
            Err(Error::Ordinal(_))
        ));
    }

    #[test]
    fn address_classification() {
        assert!(matches!(
            "Algebra_LinearEquations".parse::<Address>(),
            Ok(Address::Name(_))
        ));
        assert!(matches!(
            "1.2.1".parse::<Address>(),
            Ok(Address::Ordinal(_))
        ));
        // A bare token is a topic name, even when numeric.
        assert!(matches!("3".parse::<Address>(), Ok(Address::Name(_))));
    }

    #[test]
    fn child_id_constructors_compose() {
        let concept = TopicId::new(name("Algebra"))
            .subtopic(name("LinearEquations"))
            .concept(name("SolveForX"));
        let question = concept.question(NonZeroUsize::new(2).unwrap());
        assert_eq!(question.to_string(), "Algebra_LinearEquations_SolveForX_2");
        assert_eq!(question.parent(), concept);
    }
}
