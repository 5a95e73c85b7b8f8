//! Running a property: the try loop around generation, falsification and shrinking.
//!
//! ```rust
//! use falsify::{Arbitrary, CheckConfig, CheckStatus, Falsifier, PropertyCheck, ShrinkingMode, arbitraries};
//!
//! let check = PropertyCheck::new(
//!     "below five",
//!     vec![arbitraries::integers::<i32>().between(-100, 100).boxed()],
//!     Falsifier::predicate(|values: &Vec<i32>| values[0] < 5),
//! )
//! .with_config(CheckConfig::default().with_seed(7).with_shrinking(ShrinkingMode::Full));
//!
//! let result = check.run().unwrap();
//! assert_eq!(result.status, CheckStatus::Falsified);
//! assert_eq!(result.shrunk_sample.unwrap().parameters(), &[5]);
//! ```

use std::fmt;
use std::hash::Hash;

use log::{debug, info};

use crate::arbitrary::BoxedArbitrary;
use crate::config::CheckConfig;
use crate::error::Result;
use crate::falsifier::{Falsifier, TryStatus};
use crate::parameters::{self, GenerationInfo};
use crate::sample::{FalsifiedSample, ShrunkFalsifiedSample};
use crate::shrinkable::Value;
use crate::shrinking::{ShrinkConfig, ShrinkEngine};

/// Final status of a property check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub enum CheckStatus {
    /// All tries satisfied the property
    Satisfied,
    /// A try falsified the property
    Falsified,
    /// Too many tries were invalid
    Exhausted,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Satisfied => write!(f, "SATISFIED"),
            CheckStatus::Falsified => write!(f, "FALSIFIED"),
            CheckStatus::Exhausted => write!(f, "EXHAUSTED"),
        }
    }
}

/// Outcome of [`PropertyCheck::run`]
#[derive(Debug, Clone)]
pub struct CheckResult<P> {
    pub name: String,
    pub status: CheckStatus,
    /// Parameter lists evaluated
    pub tries: usize,
    /// Tries that were not invalid
    pub checks: usize,
    pub generation_info: GenerationInfo,
    pub edge_cases_total: usize,
    pub edge_cases_tried: usize,
    /// The first falsifying sample as generated
    pub original_sample: Option<FalsifiedSample<P>>,
    /// The first falsifying sample after shrinking
    pub shrunk_sample: Option<ShrunkFalsifiedSample<P>>,
}

impl<P> CheckResult<P> {
    pub fn is_satisfied(&self) -> bool {
        self.status == CheckStatus::Satisfied
    }

    pub fn discards(&self) -> usize {
        self.tries - self.checks
    }
}

/// A property over parameters of one type, together with how to generate them
pub struct PropertyCheck<P> {
    name: String,
    arbitraries: Vec<BoxedArbitrary<P>>,
    falsifier: Falsifier<Vec<P>>,
    config: CheckConfig,
    data: Option<Vec<Vec<P>>>,
}

impl<P> Clone for PropertyCheck<P>
where
    P: Clone,
{
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            arbitraries: self.arbitraries.clone(),
            falsifier: self.falsifier.clone(),
            config: self.config.clone(),
            data: self.data.clone(),
        }
    }
}

impl<P: Value + Eq + Hash> PropertyCheck<P> {
    pub fn new(name: impl Into<String>, arbitraries: Vec<BoxedArbitrary<P>>, falsifier: Falsifier<Vec<P>>) -> Self {
        Self {
            name: name.into(),
            arbitraries,
            falsifier,
            config: CheckConfig::default(),
            data: None,
        }
    }

    pub fn with_config(mut self, config: CheckConfig) -> Self {
        self.config = config;
        self
    }

    /// Run these parameter lists instead of generated ones
    pub fn with_data(mut self, data: Vec<Vec<P>>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Try the property until it is falsified or the tries are used up.
    ///
    /// Generation failures (a filter giving up, an unusable range, too many combinations)
    /// are returned as errors; they are not property failures.
    pub fn run(&self) -> Result<CheckResult<P>> {
        self.config.validate()?;
        let mut generator = parameters::resolve(&self.arbitraries, &self.config, self.data.clone())?;

        let mut tries = 0;
        let mut checks = 0;
        while tries < self.config.tries {
            let Some(next) = generator.next_parameters() else {
                break;
            };
            let shrinkables = next?;
            let parameters: Vec<P> = shrinkables.iter().map(|s| s.value()).collect();
            let result = self.falsifier.execute(&parameters);
            tries += 1;
            match result.status() {
                TryStatus::Satisfied => checks += 1,
                TryStatus::Invalid => {}
                TryStatus::Falsified => {
                    checks += 1;
                    let sample = FalsifiedSample::new(shrinkables, result.error().cloned(), result.footnotes().to_vec());
                    info!(
                        "Property '{}' falsified after {} tries ({}) with {:?}",
                        self.name,
                        tries,
                        generator.generation_info(),
                        sample.parameters()
                    );
                    let shrunk = self.shrink(sample.clone());
                    return Ok(CheckResult {
                        name: self.name.clone(),
                        status: CheckStatus::Falsified,
                        tries,
                        checks,
                        generation_info: generator.generation_info(),
                        edge_cases_total: generator.edge_cases_total(),
                        edge_cases_tried: generator.edge_cases_tried(),
                        original_sample: Some(sample),
                        shrunk_sample: Some(shrunk),
                    });
                }
            }
        }

        let status = if self.too_many_discards(tries, checks) {
            CheckStatus::Exhausted
        } else {
            CheckStatus::Satisfied
        };
        debug!("Property '{}' {} after {} tries, {} checks", self.name, status, tries, checks);
        Ok(CheckResult {
            name: self.name.clone(),
            status,
            tries,
            checks,
            generation_info: generator.generation_info(),
            edge_cases_total: generator.edge_cases_total(),
            edge_cases_tried: generator.edge_cases_tried(),
            original_sample: None,
            shrunk_sample: None,
        })
    }

    fn too_many_discards(&self, tries: usize, checks: usize) -> bool {
        if tries == 0 {
            return false;
        }
        checks == 0 || (tries - checks) / checks > self.config.max_discard_ratio
    }

    fn shrink(&self, sample: FalsifiedSample<P>) -> ShrunkFalsifiedSample<P> {
        let engine = ShrinkEngine::with_config(ShrinkConfig::from(&self.config));
        let shrunk = engine.shrink_reporting(
            sample,
            &self.falsifier,
            &mut |step| debug!("Shrinking step to {:?}", step.parameters()),
            &mut |_| {},
        );
        info!(
            "Property '{}' shrunk in {} steps to {:?}",
            self.name,
            shrunk.steps(),
            shrunk.parameters()
        );
        shrunk
    }
}
