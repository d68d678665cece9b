//! Exit codes and structured error output.

use serde::Serialize;

use crate::actions::DeleteListError;
use crate::config::ConfigError;
use crate::duplicates::FinderError;
use crate::output::OutputError;

/// Process exit codes.
///
/// - 0: Success
/// - 1: General error (unexpected failure)
/// - 2: Invalid input (bad directory, output path, config or deletion list)
/// - 3: Partial success (deletion run where some removals failed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Completed normally.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Rejected before any work was done.
    InvalidInput = 2,
    /// Completed, but some items failed.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DF000",
            Self::GeneralError => "DF001",
            Self::InvalidInput => "DF002",
            Self::PartialSuccess => "DF003",
        }
    }

    /// Exit code for a fatal error returned by [`run_app`](crate::run_app).
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        let invalid = err.chain().any(|cause| {
            cause.is::<FinderError>()
                || cause.is::<OutputError>()
                || cause.is::<DeleteListError>()
                || cause.is::<ConfigError>()
        });
        if invalid {
            Self::InvalidInput
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DF002")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including causes
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
