//! Application-level errors (wraps domain errors)

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{DomainError, NodeId, RepositoryError, SiteId, StructureError};

/// One invalid input field and what is wrong with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    itertools::join(errors, "; ")
}

/// Coarse classification the front-ends map to responses and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing scalar input
    Validation,
    /// A submitted id does not resolve, or would create a cycle
    Reference,
    /// Missing or unknown navigation, unknown site, bad settings
    Configuration,
    /// Tree mutation failed
    Structure,
    /// File or serialization failure
    Io,
}

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("node {node} cannot be moved under {parent}: it is the node itself or one of its descendants")]
    Cycle { node: NodeId, parent: NodeId },

    #[error("parent {parent} belongs to another navigation")]
    ForeignParent { parent: NodeId },

    #[error("node is missing its navigation id")]
    MissingNavigation,

    #[error("unknown navigation: {0}")]
    UnknownNavigation(String),

    #[error("unknown site: {0}")]
    UnknownSite(SiteId),

    /// Scalar fields of `node_id` are committed, its tree position is not.
    #[error("node {node_id} was saved but could not be placed: {source}")]
    PlacementFailed {
        node_id: NodeId,
        #[source]
        source: StructureError,
    },

    #[error("{0}")]
    Structure(#[from] StructureError),

    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub fn not_found(what: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            what,
            id: id.to_string(),
        }
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) | Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } | Self::Cycle { .. } | Self::ForeignParent { .. } => {
                ErrorKind::Reference
            }
            Self::MissingNavigation
            | Self::UnknownNavigation(_)
            | Self::UnknownSite(_)
            | Self::Config { .. } => ErrorKind::Configuration,
            Self::PlacementFailed { .. } => ErrorKind::Structure,
            Self::Structure(StructureError::Cycle { .. })
            | Self::Structure(StructureError::SiblingMismatch { .. }) => ErrorKind::Reference,
            Self::Structure(StructureError::TooDeep { .. }) => ErrorKind::Validation,
            Self::Structure(_) => ErrorKind::Structure,
            Self::Repository(RepositoryError::DuplicateHandle(_)) => ErrorKind::Validation,
            Self::Repository(_) => ErrorKind::Reference,
            Self::OperationFailed { .. } => ErrorKind::Io,
        }
    }

    /// Field errors to highlight in a form; empty for non-validation failures.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
