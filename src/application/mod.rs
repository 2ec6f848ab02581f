//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on storage boundary traits.

pub mod error;
pub mod response;
pub mod services;

pub use error::{ApplicationError, ApplicationResult, ErrorKind, FieldError};
pub use response::ActionResponse;
