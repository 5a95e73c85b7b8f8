//! Shrinking of falsified samples.
//!
//! The [`ShrinkEngine`] takes a [`FalsifiedSample`] and searches for a smaller sample that
//! still falsifies the property with an equivalent error. It repeats three strategies
//! until none of them improves the sample:
//!
//! 1. each parameter on its own, left to right
//! 2. pairs of parameters shrunk together
//! 3. one parameter shrunk while another grows by the freed amount
//!
//! Every strategy runs through the same loop: candidates with a larger distance than the
//! best sample are skipped, already tried parameter lists are never evaluated again and
//! invalid candidates with a smaller distance are remembered so the search can continue
//! from them when nothing falsifies.

mod recreator;
mod sample_shrinker;
mod strategies;

use std::hash::Hash;

use log::{debug, warn};

use crate::combinatorics::{distinct_pairs, ordered_pairs};
use crate::config::{CheckConfig, DEFAULT_BOUNDED_SHRINKING_ATTEMPTS, ShrinkingMode};
use crate::falsifier::Falsifier;
use crate::sample::{FalsifiedSample, ShrunkFalsifiedSample};
use crate::shrinkable::Value;

pub use recreator::ShrunkSampleRecreator;

use sample_shrinker::{BoundReached, SampleShrinker};

/// Called with samples during shrinking
pub type SampleReporter<'a, P> = &'a mut dyn FnMut(&FalsifiedSample<P>);

/// Configuration for shrinking behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShrinkConfig {
    /// How far shrinking goes
    pub mode: ShrinkingMode,
    /// Falsifier invocations allowed in [`ShrinkingMode::Bounded`]
    pub bounded_attempts: usize,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            mode: ShrinkingMode::default(),
            bounded_attempts: DEFAULT_BOUNDED_SHRINKING_ATTEMPTS,
        }
    }
}

impl ShrinkConfig {
    /// Create a shrink configuration with the given mode
    pub fn with_mode(mode: ShrinkingMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Create a bounded shrink configuration with a custom attempt budget
    pub fn bounded(bounded_attempts: usize) -> Self {
        Self {
            mode: ShrinkingMode::Bounded,
            bounded_attempts,
        }
    }

    fn budget(&self) -> Option<usize> {
        match self.mode {
            ShrinkingMode::Bounded => Some(self.bounded_attempts),
            _ => None,
        }
    }
}

impl From<&CheckConfig> for ShrinkConfig {
    fn from(config: &CheckConfig) -> Self {
        Self {
            mode: config.shrinking,
            bounded_attempts: config.bounded_shrinking_attempts,
        }
    }
}

/// Shrinking engine that coordinates the shrinking strategies
#[derive(Debug, Clone, Default)]
pub struct ShrinkEngine {
    config: ShrinkConfig,
}

impl ShrinkEngine {
    /// Create a new shrinking engine with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new shrinking engine with custom configuration
    pub fn with_config(config: ShrinkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ShrinkConfig {
        &self.config
    }

    /// Shrink `sample` against `falsifier`
    pub fn shrink<P>(&self, sample: FalsifiedSample<P>, falsifier: &Falsifier<Vec<P>>) -> ShrunkFalsifiedSample<P>
    where
        P: Value + Eq + Hash,
    {
        self.shrink_reporting(sample, falsifier, &mut |_| {}, &mut |_| {})
    }

    /// Shrink `sample`, reporting every accepted step and every rejected attempt
    pub fn shrink_reporting<P>(
        &self,
        sample: FalsifiedSample<P>,
        falsifier: &Falsifier<Vec<P>>,
        on_step: SampleReporter<'_, P>,
        on_attempt: SampleReporter<'_, P>,
    ) -> ShrunkFalsifiedSample<P>
    where
        P: Value + Eq + Hash,
    {
        if self.config.mode == ShrinkingMode::Off {
            return ShrunkFalsifiedSample::unshrunk(sample);
        }
        let shrunk = shrink_sample(sample, falsifier, self.config.budget(), on_step, on_attempt);
        if !shrunk.completed() {
            warn!(
                "Shrinking bound reached after {} attempts ({} steps). \
                 Use ShrinkingMode::Full to shrink further.",
                self.config.bounded_attempts,
                shrunk.steps()
            );
        }
        shrunk
    }
}

pub(crate) fn shrink_sample<P>(
    sample: FalsifiedSample<P>,
    falsifier: &Falsifier<Vec<P>>,
    budget: Option<usize>,
    on_step: SampleReporter<'_, P>,
    on_attempt: SampleReporter<'_, P>,
) -> ShrunkFalsifiedSample<P>
where
    P: Value + Eq + Hash,
{
    let gated = falsifier.requiring_equivalent_error(sample.error().cloned());
    let mut shrinker = SampleShrinker::new(sample, gated, budget, on_step, on_attempt);
    let completed = match run_strategies(&mut shrinker) {
        Ok(()) => true,
        Err(BoundReached) => false,
    };
    shrinker.finish(completed)
}

fn run_strategies<P>(shrinker: &mut SampleShrinker<'_, P>) -> Result<(), BoundReached>
where
    P: Value + Eq + Hash,
{
    let size = shrinker.best().size();
    loop {
        let mut improved = false;
        for position in 0..size {
            improved |= shrinker.shrink_with(&strategies::one_position(position), false)?;
        }
        for (first, second) in distinct_pairs(size) {
            improved |= shrinker.shrink_with(&strategies::pair(first, second), false)?;
        }
        for (shrunk, grown) in ordered_pairs(size) {
            improved |= shrinker.shrink_with(&strategies::shrink_and_grow(shrunk, grown), true)?;
        }
        if !improved {
            debug!("shrinking reached a fixed point");
            return Ok(());
        }
    }
}
