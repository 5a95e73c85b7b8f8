#![allow(clippy::result_large_err)]
#![allow(clippy::type_complexity)]

//! # Falsify - generation and shrinking for property-based testing
//!
//! Falsify describes value spaces as [`Arbitrary`] values, generates parameters from them
//! (randomly, exhaustively or from explicit data), runs a property against them and, when
//! the property fails, shrinks the failing parameters to a minimal sample.
//!
//! ## Quick Start
//!
//! ```rust
//! use falsify::{Arbitrary, CheckConfig, CheckStatus, Falsifier, PropertyCheck, ShrinkingMode, arbitraries};
//!
//! let check = PropertyCheck::new(
//!     "sum of list stays small",
//!     vec![arbitraries::lists(arbitraries::integers::<u32>().between(0, 100)).boxed()],
//!     Falsifier::predicate(|values: &Vec<Vec<u32>>| values[0].iter().sum::<u32>() <= 50),
//! )
//! .with_config(CheckConfig::default().with_seed(42).with_shrinking(ShrinkingMode::Full));
//!
//! let result = check.run().unwrap();
//! assert_eq!(result.status, CheckStatus::Falsified);
//! let shrunk = result.shrunk_sample.unwrap();
//! assert_eq!(shrunk.parameters()[0].iter().sum::<u32>(), 51);
//! ```
//!
//! ## Building blocks
//!
//! - [`Shrinkable`]: a generated value together with its [`ShrinkingDistance`] and lazily
//!   computed smaller candidates.
//! - [`Arbitrary`]: random generators, edge cases and exhaustive enumeration of a value
//!   space; see [`arbitraries`] and [`combinators`].
//! - [`Falsifier`]: evaluates a candidate to a [`TryOutcome`].
//! - [`ShrinkEngine`]: shrinks a [`FalsifiedSample`] to a [`ShrunkFalsifiedSample`].
//! - [`PropertyCheck`]: the try loop tying these together.
//!
//! ## Numeric limits
//!
//! Integers of every width up to 64 bits, plus `i128`, are generated and shrunk as `i128`;
//! there is no arbitrary for `u128` or unbounded big integers. A [`Decimal`] holds its
//! unscaled value in an `i128` and has at most [`decimal::MAX_SCALE`] decimal places;
//! ranges whose bounds do not fit at the requested scale are rejected when generating.

pub mod arbitraries;
pub mod arbitrary;
pub mod check;
pub mod combinatorics;
pub mod combinators;
pub mod config;
pub mod decimal;
pub mod distance;
pub mod edge_cases;
pub mod error;
pub mod exhaustive;
pub mod falsifier;
pub mod generator;
pub mod parallel;
pub mod parameters;
#[cfg(feature = "persistence")]
pub mod persistence;
pub mod rng;
pub mod sample;
pub mod sequence;
pub mod shrinkable;
pub mod shrinking;

// Re-export the main public API
pub use arbitrary::{Arbitrary, BoxedArbitrary};
pub use check::{CheckResult, CheckStatus, PropertyCheck};
pub use combinators::{combine_list, combine2, combine3, combine4, with_builder, zip};
pub use config::{CheckConfig, ConfigError, EdgeCasesMode, GenerationMode, GeneratorConfig, ShrinkingMode};
pub use decimal::Decimal;
pub use distance::ShrinkingDistance;
pub use edge_cases::EdgeCases;
pub use error::{Error, Result};
pub use exhaustive::ExhaustiveGenerator;
pub use falsifier::{
    Falsifier, PropertyFailure, TryError, TryExecutionResult, TryOutcome, TryStatus, assume, ensure,
};
pub use generator::{BoxedGenerator, RandomGenerator};
pub use parallel::{ParallelConfig, run_all};
pub use parameters::{GenerationInfo, ParametersGenerator};
#[cfg(feature = "persistence")]
pub use persistence::{ReplayRecord, ReplayStore};
pub use rng::SourceOfRandomness;
pub use sample::{FalsificationResult, FalsifiedSample, ShrunkFalsifiedSample};
pub use sequence::ShrinkingSequence;
pub use shrinkable::{Shrinkable, ShrinkableValue, Value};
pub use shrinking::{ShrinkConfig, ShrinkEngine, ShrunkSampleRecreator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_start_shape() {
        let check = PropertyCheck::new(
            "below five",
            vec![arbitraries::integers::<i32>().between(-100, 100).boxed()],
            Falsifier::predicate(|values: &Vec<i32>| values[0] < 5),
        )
        .with_config(
            CheckConfig::default()
                .with_seed(3)
                .with_generation(GenerationMode::Randomized)
                .with_shrinking(ShrinkingMode::Full),
        );
        let result = check.run().unwrap();
        assert_eq!(result.status, CheckStatus::Falsified);
        assert_eq!(result.shrunk_sample.unwrap().parameters(), &[5]);
    }
}
