//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur in HAL operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Backend is not available.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// Job execution failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job was cancelled.
    #[error("Job cancelled")]
    JobCancelled,

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Invalid circuit.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Timeout waiting for job.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// Circuit exceeds backend capabilities.
    #[error("Circuit exceeds backend capabilities: {0}")]
    CircuitTooLarge(String),

    /// Invalid number of trials.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// An outcome table is ragged or holds values other than 0 and 1.
    #[error("Invalid outcome table: {0}")]
    InvalidOutcomes(String),

    /// A backend returned a table whose shape does not match the request.
    #[error(
        "Result shape mismatch: expected {expected_trials}x{expected_sites}, got {got_trials}x{got_sites}"
    )]
    ResultShapeMismatch {
        /// Requested number of trials.
        expected_trials: usize,
        /// Number of classical bits in the submitted circuit.
        expected_sites: usize,
        /// Rows in the returned table.
        got_trials: usize,
        /// Columns in the returned table.
        got_sites: usize,
    },

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
