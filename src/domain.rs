//! Domain models for the curriculum knowledge graph.
//!
//! This module contains the core types: the four-level hierarchy, composite
//! and ordinal addressing, the in-memory index, and configuration.

mod config;
pub use config::Config;

/// Validated name segments.
pub mod name;
pub use name::NameString;

/// Composite IDs, ordinal paths, and address classification.
pub mod node_id;
pub use node_id::{Address, Level, NodeId};

/// Entity types and the typed node view.
pub mod node;
pub use node::{Difficulty, NodeRef, Question, Subquestion};

/// Structured breakdowns from the content-generation collaborator.
pub mod outline;
pub use outline::TopicOutline;

/// The in-memory index.
pub mod topics;
pub use topics::{LinkOutcome, QuestionSpec, Topics};
