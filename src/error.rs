//! CLI error types and exit codes

use thiserror::Error;

use crate::store::StoreError;

/// Exit codes for the CLI
/// - 0: Verification passed (including the "no tenants in scope" case)
/// - 1: Internal fault (I/O, report writing)
/// - 2: Verification found discrepant tenants
/// - 3: Document store connection or query failure
pub type CliResult<T> = Result<T, CliError>;

/// Exit code reported when one or more tenants are discrepant.
///
/// Discrepancies are findings, not errors; they never surface as a
/// `CliError`, only as this aggregate exit code.
pub const EXIT_DISCREPANCIES: i32 = 2;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to write report: {0}")]
    Report(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Store(_) => 3,
            CliError::Report(_) | CliError::Config(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        if std::env::var("NO_COLOR").is_err() {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Report(format!("I/O error: {}", e))
    }
}

impl From<csv::Error> for CliError {
    fn from(e: csv::Error) -> Self {
        CliError::Report(format!("CSV error: {}", e))
    }
}
