//! Error types for generation and configuration failures.
//!
//! Property failures and assumption violations are *not* errors in this sense: they are
//! reported as [`TryOutcome`](crate::falsifier::TryOutcome) values by a falsifier.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while describing, generating or enumerating values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A filter, uniqueness constraint or retry loop ran out of its miss budget
    #[error("{context}: too many misses ({misses}) while trying to generate a value")]
    TooManyFilterMisses { misses: usize, context: String },

    /// No arbitrary could be resolved for a parameter
    #[error("cannot find an arbitrary for parameter {parameter}")]
    CannotFindArbitrary { parameter: String },

    /// Exhaustive generation was requested but at least one arbitrary cannot enumerate
    #[error("exhaustive generation is not possible: {reason}")]
    NotExhaustive { reason: String },

    /// Exhaustive generation would need more samples than allowed
    #[error("exhaustive generation needs {required} samples but only {allowed} are allowed")]
    TooManyCombinations { required: u64, allowed: u64 },

    /// A choice was requested from an empty set of values
    #[error("cannot choose from an empty set of {what}")]
    EmptyChoice { what: String },

    /// Lower bound greater than upper bound, or similar
    #[error("invalid range: {message}")]
    InvalidRange { message: String },

    /// A recursive arbitrary nested deeper than the configured maximum depth
    #[error("recursion deeper than {max_depth} levels")]
    RecursionTooDeep { max_depth: usize },

    /// A worker thread running property checks panicked outside of a property
    #[error("worker running check '{check}' panicked")]
    WorkerPanicked { check: String },

    /// Configuration did not validate
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a too-many-misses error with context
    pub fn too_many_misses(misses: usize, context: impl Into<String>) -> Self {
        Self::TooManyFilterMisses {
            misses,
            context: context.into(),
        }
    }

    /// Create a cannot-find-arbitrary error
    pub fn cannot_find_arbitrary(parameter: impl Into<String>) -> Self {
        Self::CannotFindArbitrary {
            parameter: parameter.into(),
        }
    }

    /// Create a not-exhaustive error
    pub fn not_exhaustive(reason: impl Into<String>) -> Self {
        Self::NotExhaustive {
            reason: reason.into(),
        }
    }

    /// Create an invalid range error
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange {
            message: message.into(),
        }
    }

    /// Create an empty choice error
    pub fn empty_choice(what: impl Into<String>) -> Self {
        Self::EmptyChoice { what: what.into() }
    }

    /// Whether this error is fatal for a whole property run.
    ///
    /// Only generation exhaustion may be locally retried by a caller; everything else
    /// describes an unusable setup.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::TooManyFilterMisses { .. })
    }
}
