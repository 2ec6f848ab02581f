//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::{NavId, NodeId, StructureId};

/// Domain errors represent business rule violations on plain values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid {kind} id: {value:?}")]
    InvalidId { kind: &'static str, value: String },

    #[error("invalid navigation handle: {0:?}")]
    InvalidHandle(String),

    #[error("invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("invalid active match mode: {0:?}")]
    InvalidActiveMatch(String),
}

/// Failures of the ordered tree structure.
///
/// Every variant leaves the structure untouched: mutations validate before they
/// detach anything.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("structure not found: {0}")]
    StructureMissing(StructureId),

    #[error("node {0} is not placed in the structure")]
    NodeMissing(NodeId),

    #[error("parent node {0} is not placed in the structure")]
    ParentMissing(NodeId),

    #[error("node {node} cannot be placed under itself or its descendant {parent}")]
    Cycle { node: NodeId, parent: NodeId },

    #[error("node {node} would reach level {level}, the limit is {max}")]
    TooDeep { node: NodeId, level: u32, max: u32 },

    #[error("sibling {sibling} does not share the requested parent of node {node}")]
    SiblingMismatch { node: NodeId, sibling: NodeId },

    #[error("structure state corrupted: {0}")]
    Corrupt(String),
}

/// Result type for structure operations.
pub type StructureResult<T> = Result<T, StructureError>;

/// Record store failures (node repository and navigation registry).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("node record not found: {0}")]
    NodeNotFound(NodeId),

    #[error("navigation not found: {0}")]
    NavigationNotFound(NavId),

    #[error("navigation handle already in use: {0}")]
    DuplicateHandle(String),
}

/// Result type for record store operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
