//! Generation of complete parameter lists for a property.
//!
//! A [`ParametersGenerator`] yields one list of shrinkables per try. Which generator runs is
//! decided by [`GenerationMode`]: random values (with edge cases first, mixed in or not at
//! all), the exhaustive cartesian product of all parameters, or explicit data tuples.

use std::fmt;
use std::sync::Arc;

use log::{debug, info};

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::combinatorics::{self, Source};
use crate::config::{CheckConfig, DEFAULT_MAX_EDGE_CASES, GenerationMode};
use crate::error::{Error, Result};
use crate::exhaustive::ExhaustiveGenerator;
use crate::generator::{BoxedGenerator, RandomGenerator};
use crate::rng::SourceOfRandomness;
use crate::shrinkable::{Shrinkable, Value};

/// Where a generated parameter list came from, for reproducing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationInfo {
    /// Seed of the random source; `None` for exhaustive and data-driven generation
    pub seed: Option<u64>,
    /// Number of parameter lists generated so far
    pub generation_index: usize,
}

impl fmt::Display for GenerationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.seed {
            Some(seed) => write!(f, "seed {} at index {}", seed, self.generation_index),
            None => write!(f, "index {}", self.generation_index),
        }
    }
}

/// Yields one parameter list per try
pub trait ParametersGenerator<P> {
    /// The next parameter list, or `None` when the generator has no more values
    fn next_parameters(&mut self) -> Option<Result<Vec<Shrinkable<P>>>>;

    /// Number of edge case combinations this generator offers first
    fn edge_cases_total(&self) -> usize {
        0
    }

    /// Number of edge case combinations handed out so far
    fn edge_cases_tried(&self) -> usize {
        0
    }

    fn generation_info(&self) -> GenerationInfo;
}

type EdgeCaseTuples<P> = Box<dyn Iterator<Item = Vec<Shrinkable<P>>>>;

/// Random parameter lists, optionally preceded by all edge case combinations
pub struct RandomizedParametersGenerator<P> {
    generators: Vec<BoxedGenerator<P>>,
    edge_cases: EdgeCaseTuples<P>,
    edge_cases_total: usize,
    edge_cases_tried: usize,
    random: SourceOfRandomness,
    generated: usize,
}

impl<P: Value> RandomizedParametersGenerator<P> {
    pub fn new(arbitraries: &[BoxedArbitrary<P>], config: &CheckConfig) -> Self {
        let generator_config = config.generator_config();
        let mode = config.edge_cases;
        let generators = arbitraries
            .iter()
            .map(|arbitrary| {
                if mode.mix_in() {
                    arbitrary.generator_with_embedded_edge_cases(&generator_config)
                } else {
                    arbitrary.generator(&generator_config.embedding_edge_cases(false))
                }
            })
            .collect();

        let (edge_cases, edge_cases_total) = if mode.generate_first() {
            Self::edge_case_tuples(arbitraries, config.tries)
        } else {
            (Box::new(std::iter::empty()) as EdgeCaseTuples<P>, 0)
        };
        Self {
            generators,
            edge_cases,
            edge_cases_total,
            edge_cases_tried: 0,
            random: SourceOfRandomness::from_optional_seed(config.seed),
            generated: 0,
        }
    }

    /// The cartesian product of all parameters' edge cases, at most `tries` of them
    fn edge_case_tuples(arbitraries: &[BoxedArbitrary<P>], tries: usize) -> (EdgeCaseTuples<P>, usize) {
        let per_parameter: Vec<Vec<Shrinkable<P>>> = arbitraries
            .iter()
            .map(|arbitrary| arbitrary.edge_cases(DEFAULT_MAX_EDGE_CASES).into_vec())
            .collect();
        if per_parameter.iter().any(Vec::is_empty) {
            return (Box::new(std::iter::empty()), 0);
        }
        let combinations = per_parameter
            .iter()
            .try_fold(1usize, |count, cases| count.checked_mul(cases.len()))
            .unwrap_or(usize::MAX);
        if combinations >= tries {
            info!(
                "Combinatorial explosion of edge case generation: {} combinations, {} tries. \
                 Edge case generation exceeds number of tries.",
                combinations, tries
            );
        }
        let sources: Vec<Source<Shrinkable<P>>> = per_parameter
            .into_iter()
            .map(|cases| {
                let cases = Arc::new(cases);
                Arc::new(move || Box::new(cases.as_ref().clone().into_iter()) as Box<dyn Iterator<Item = _>>)
                    as Source<Shrinkable<P>>
            })
            .collect();
        let total = combinations.min(tries);
        (Box::new(combinatorics::product(sources).take(total)), total)
    }
}

impl<P: Value> ParametersGenerator<P> for RandomizedParametersGenerator<P> {
    fn next_parameters(&mut self) -> Option<Result<Vec<Shrinkable<P>>>> {
        self.generated += 1;
        if let Some(tuple) = self.edge_cases.next() {
            self.edge_cases_tried += 1;
            return Some(Ok(tuple));
        }
        let random = &mut self.random;
        Some(self.generators.iter().map(|generator| generator.next(random.rng())).collect())
    }

    fn edge_cases_total(&self) -> usize {
        self.edge_cases_total
    }

    fn edge_cases_tried(&self) -> usize {
        self.edge_cases_tried
    }

    fn generation_info(&self) -> GenerationInfo {
        GenerationInfo {
            seed: Some(self.random.seed()),
            generation_index: self.generated,
        }
    }
}

/// Every combination of all parameters' values, each exactly once
pub struct ExhaustiveParametersGenerator<P> {
    tuples: Box<dyn Iterator<Item = Vec<P>>>,
    max_count: u64,
    generated: usize,
}

impl<P: Value> ExhaustiveParametersGenerator<P> {
    /// Fails if a parameter cannot be enumerated or there are more than `max_tries`
    /// combinations
    pub fn new(arbitraries: &[BoxedArbitrary<P>], max_tries: u64) -> Result<Self> {
        let generators = match Self::exhaustive_generators(arbitraries, max_tries) {
            Some(generators) => generators,
            None => return Err(Self::refusal(arbitraries, max_tries)),
        };
        let max_count = Self::combinations(&generators);
        if max_count > max_tries {
            return Err(Error::TooManyCombinations {
                required: max_count,
                allowed: max_tries,
            });
        }
        let sources: Vec<Source<P>> = generators
            .iter()
            .map(|generator| {
                let generator = generator.clone();
                Arc::new(move || generator.iter()) as Source<P>
            })
            .collect();
        Ok(Self {
            tuples: Box::new(combinatorics::product(sources)),
            max_count,
            generated: 0,
        })
    }

    fn exhaustive_generators(arbitraries: &[BoxedArbitrary<P>], max_tries: u64) -> Option<Vec<ExhaustiveGenerator<P>>> {
        arbitraries
            .iter()
            .map(|arbitrary| arbitrary.exhaustive(max_tries))
            .collect()
    }

    /// Why the first parameter without an enumeration within `max_tries` has none: a finite
    /// space that is too large, or values that cannot be enumerated at all
    fn refusal(arbitraries: &[BoxedArbitrary<P>], max_tries: u64) -> Error {
        for (index, arbitrary) in arbitraries.iter().enumerate() {
            if arbitrary.exhaustive(max_tries).is_some() {
                continue;
            }
            return match arbitrary.exhaustive(u64::MAX) {
                Some(unbounded) => Error::TooManyCombinations {
                    required: unbounded.max_count(),
                    allowed: max_tries,
                },
                None => Error::not_exhaustive(format!("parameter {} cannot be enumerated", index)),
            };
        }
        Error::not_exhaustive("no parameter can be enumerated")
    }

    fn combinations(generators: &[ExhaustiveGenerator<P>]) -> u64 {
        generators
            .iter()
            .try_fold(1u64, |count, generator| count.checked_mul(generator.max_count()))
            .unwrap_or(u64::MAX)
    }

    /// Number of combinations, if all parameters can be enumerated within `max_tries`
    pub fn max_count(arbitraries: &[BoxedArbitrary<P>], max_tries: u64) -> Option<u64> {
        let generators = Self::exhaustive_generators(arbitraries, max_tries)?;
        Some(Self::combinations(&generators))
    }

    /// Upper bound of the number of parameter lists
    pub fn count(&self) -> u64 {
        self.max_count
    }
}

impl<P: Value> ParametersGenerator<P> for ExhaustiveParametersGenerator<P> {
    fn next_parameters(&mut self) -> Option<Result<Vec<Shrinkable<P>>>> {
        let tuple = self.tuples.next()?;
        self.generated += 1;
        Some(Ok(tuple.into_iter().map(Shrinkable::unshrinkable).collect()))
    }

    fn generation_info(&self) -> GenerationInfo {
        GenerationInfo {
            seed: None,
            generation_index: self.generated,
        }
    }
}

/// Explicit parameter lists; they do not shrink
pub struct DataDrivenParametersGenerator<P> {
    tuples: std::vec::IntoIter<Vec<P>>,
    generated: usize,
}

impl<P: Value> DataDrivenParametersGenerator<P> {
    pub fn new(tuples: Vec<Vec<P>>) -> Self {
        Self {
            tuples: tuples.into_iter(),
            generated: 0,
        }
    }
}

impl<P: Value> ParametersGenerator<P> for DataDrivenParametersGenerator<P> {
    fn next_parameters(&mut self) -> Option<Result<Vec<Shrinkable<P>>>> {
        let tuple = self.tuples.next()?;
        self.generated += 1;
        Some(Ok(tuple.into_iter().map(Shrinkable::unshrinkable).collect()))
    }

    fn generation_info(&self) -> GenerationInfo {
        GenerationInfo {
            seed: None,
            generation_index: self.generated,
        }
    }
}

/// Choose the parameters generator for `config`.
///
/// `GenerationMode::Auto` runs explicit data if given, otherwise all combinations when
/// they fit into the try budget, otherwise random values.
pub fn resolve<P: Value>(
    arbitraries: &[BoxedArbitrary<P>],
    config: &CheckConfig,
    data: Option<Vec<Vec<P>>>,
) -> Result<Box<dyn ParametersGenerator<P>>> {
    let tries = config.tries as u64;
    match config.generation {
        GenerationMode::Randomized => Ok(Box::new(RandomizedParametersGenerator::new(arbitraries, config))),
        GenerationMode::Exhaustive => Ok(Box::new(ExhaustiveParametersGenerator::new(arbitraries, tries)?)),
        GenerationMode::DataDriven => {
            let data = data.ok_or_else(|| Error::empty_choice("data-driven parameter lists"))?;
            Ok(Box::new(DataDrivenParametersGenerator::new(data)))
        }
        GenerationMode::Auto => {
            if let Some(data) = data {
                debug!("Generation mode AUTO: using {} data-driven parameter lists", data.len());
                return Ok(Box::new(DataDrivenParametersGenerator::new(data)));
            }
            match ExhaustiveParametersGenerator::max_count(arbitraries, tries) {
                Some(count) if count <= tries => {
                    debug!("Generation mode AUTO: {} combinations fit into {} tries, generating exhaustively", count, tries);
                    Ok(Box::new(ExhaustiveParametersGenerator::new(arbitraries, tries)?))
                }
                _ => {
                    debug!("Generation mode AUTO: generating randomized values");
                    Ok(Box::new(RandomizedParametersGenerator::new(arbitraries, config)))
                }
            }
        }
    }
}
