use bubblewatch_core::{RefreshError, ValidationError, WriteError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to publish snapshot: {0}")]
    Write(#[from] WriteError),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Write(_) => 10,
        }
    }
}

impl From<RefreshError> for CliError {
    fn from(error: RefreshError) -> Self {
        match error {
            RefreshError::Config(error) => Self::Validation(error),
            RefreshError::Write(error) => Self::Write(error),
        }
    }
}
