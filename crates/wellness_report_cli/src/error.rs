//! Errors surfaced by CLI commands.

use thiserror::Error;
use wellness_report_core::ReportError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    /// One-line message printed to the user; details go to the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            CliError::Report(e) => e.user_message(),
            CliError::Serialization(_) => "output could not be produced",
        }
    }
}

/// Result type alias for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
