//! Plain-text Curriculum Knowledge-Graph Management
//!
//! A curriculum is a four-level hierarchy of topics, subtopics, concepts,
//! and questions, stored as a JSON snapshot in a directory. Nodes at the
//! same level can depend on one another through mirrored
//! prerequisite/postrequisite edges.

pub mod domain;
pub use domain::{
    Address, Config, Difficulty, Level, NameString, NodeId, NodeRef, QuestionSpec, Topics,
};

/// Snapshot persistence and store management.
pub mod storage;
pub use storage::Store;
