//! Structured error handling and exit codes.

use serde::Serialize;

use crate::pipeline::{RunError, ScanSummary};

/// Exit codes for the dupsweep binary.
///
/// - 0: Success (duplicates removed, or planned in a dry run)
/// - 1: General error (unexpected failure)
/// - 2: No duplicates found
/// - 3: Partial success (some removals failed)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: duplicates were removed or planned.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: the run completed without finding duplicates.
    NoDuplicates = 2,
    /// Partial success: some removals failed.
    PartialSuccess = 3,
    /// Interrupted: the run was stopped by the user (Ctrl+C).
    Interrupted = 130,
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
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoDuplicates => "DS002",
            Self::PartialSuccess => "DS003",
            Self::Interrupted => "DS130",
        }
    }

    /// Exit code for a completed run.
    #[must_use]
    pub fn for_summary(summary: &ScanSummary) -> Self {
        if summary.stopped {
            Self::Interrupted
        } else if !summary.has_duplicates() {
            Self::NoDuplicates
        } else if summary.is_partial() {
            Self::PartialSuccess
        } else {
            Self::Success
        }
    }

    /// Exit code for an error returned by the application.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if err
            .downcast_ref::<RunError>()
            .is_some_and(RunError::is_cancelled)
        {
            Self::Interrupted
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
