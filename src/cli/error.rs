//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::{ApplicationError, ErrorKind, FieldError};
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    fn application(&self) -> Option<&ApplicationError> {
        match self {
            CliError::Infra(InfraError::Application(e)) => Some(e),
            _ => None,
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Json(_) => crate::exitcode::SOFTWARE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } | InfraError::Workspace { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app.kind() {
                    ErrorKind::Validation => crate::exitcode::DATAERR,
                    ErrorKind::Reference => crate::exitcode::NOINPUT,
                    ErrorKind::Configuration => crate::exitcode::CONFIG,
                    ErrorKind::Structure => crate::exitcode::SOFTWARE,
                    ErrorKind::Io => crate::exitcode::IOERR,
                },
            },
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        self.application().map(|e| e.field_errors()).unwrap_or(&[])
    }

    /// True if part of the request was committed before the failure, so the
    /// workspace must still be written.
    pub fn committed_partially(&self) -> bool {
        matches!(
            self.application(),
            Some(ApplicationError::PlacementFailed { .. })
        )
    }
}
