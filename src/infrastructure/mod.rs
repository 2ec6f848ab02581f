//! Infrastructure layer: storage implementations and DI container
//!
//! This layer implements the storage boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod memory;
pub mod traits;
pub mod workspace;

pub use error::{InfraError, InfraResult};
pub use workspace::Workspace;
