//! Error types for the evolve crate.

use thiserror::Error;

/// Errors produced while building evolution programs or reducing outcomes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvolveError {
    /// Trotter step duration must be positive and finite.
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    /// Total evolution time must be non-negative and finite.
    #[error("total evolution time must be non-negative and finite, got {0}")]
    NegativeDuration(f64),

    /// `T / Δt` is not a representable step count.
    #[error("total time {total_time} in steps of {delta_t} gives too many steps (limit {limit})")]
    TooManySteps {
        /// Step duration.
        delta_t: f64,
        /// Total evolution time.
        total_time: f64,
        /// Largest accepted step count.
        limit: usize,
    },

    /// The chain has no sites.
    #[error("spin chain is empty")]
    EmptyChain,

    /// The same site appears twice in the chain.
    #[error("site {0} appears more than once in the chain")]
    DuplicateSite(u32),

    /// A site index has no room for a successor wire.
    #[error("site {0} is out of range")]
    SiteOutOfRange(u32),

    /// A physical constant is out of range.
    #[error("invalid value {value} for {name}")]
    InvalidConstant {
        /// Name of the constant.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An outcome table has no trials.
    #[error("outcome table has no trials")]
    EmptyOutcomeTable,

    /// An outcome table has the wrong number of columns.
    #[error("outcome table has {got} sites, expected {expected}")]
    SiteCountMismatch {
        /// Expected number of sites.
        expected: usize,
        /// Number of sites in the table.
        got: usize,
    },

    /// An outcome table has the wrong number of rows.
    #[error("outcome table has {got} trials, expected {expected}")]
    TrialCountMismatch {
        /// Expected number of trials.
        expected: usize,
        /// Number of trials in the table.
        got: usize,
    },

    /// A measured value is not 0 or 1.
    #[error("outcome value {value} at trial {trial}, site {site} is not a bit")]
    InvalidOutcome {
        /// The offending value.
        value: u8,
        /// Row index.
        trial: usize,
        /// Column index.
        site: usize,
    },

    /// Circuit builder returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] spinchain_ir::IrError),
}

/// Result type for evolution and reduction operations.
pub type EvolveResult<T> = Result<T, EvolveError>;
