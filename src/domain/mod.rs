//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod entities;
pub mod error;
pub mod url;

pub use arena::{FlatEntry, StructureArena, TreeNode};
pub use entities::*;
pub use error::{DomainError, RepositoryError, RepositoryResult, StructureError, StructureResult};
pub use url::{ActiveMatch, ActiveMatcher};
