//! CLI-level errors (wraps library errors)

use thiserror::Error;

use crate::config::SettingsError;
use crate::errors::TreeError;
use crate::outline::OutlineError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Outline(#[from] OutlineError),

    #[error("no question at path: {0}")]
    UnknownPath(String),

    #[error("{invalid} invalid question(s)")]
    InvalidTree { invalid: usize },

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) | CliError::UnknownPath(_) => crate::exitcode::USAGE,
            CliError::InvalidTree { .. } => crate::exitcode::DATAERR,
            CliError::Settings(_) => crate::exitcode::CONFIG,
            CliError::Outline(e) => match e {
                OutlineError::Read { .. } => crate::exitcode::NOINPUT,
                OutlineError::Parse { .. } => crate::exitcode::DATAERR,
            },
            CliError::Tree(e) => match e {
                TreeError::InvalidPosition(_)
                | TreeError::SelfReference { .. }
                | TreeError::CyclicMove { .. } => crate::exitcode::USAGE,
                TreeError::MissingValue
                | TreeError::DuplicateMug { .. }
                | TreeError::StaleNode => crate::exitcode::SOFTWARE,
            },
        }
    }
}
