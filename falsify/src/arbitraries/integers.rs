use rand::{Rng, RngCore};

use crate::arbitrary::Arbitrary;
use crate::config::GeneratorConfig;
use crate::edge_cases::EdgeCases;
use crate::error::{Error, Result};
use crate::exhaustive::{self, ExhaustiveGenerator};
use crate::generator::BoxedGenerator;
use crate::shrinkable::{IntegralShrinkable, IntegralValue, Shrinkable};

/// How random numbers spread over their range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RandomDistribution {
    /// Every value in the range is equally likely
    Uniform,
    /// Values near the shrinking target are more likely; the magnitude of the distance
    /// to the target is chosen uniformly
    #[default]
    Biased,
}

impl RandomDistribution {
    /// Pick a value in `[min, max]`
    pub fn next_value(&self, rng: &mut dyn RngCore, min: i128, max: i128, target: i128) -> i128 {
        if min >= max {
            return min;
        }
        match self {
            RandomDistribution::Uniform => rng.gen_range(min..=max),
            RandomDistribution::Biased => {
                let span = max.abs_diff(min);
                let bits = u128::BITS - span.leading_zeros();
                let window_bits = rng.gen_range(0..=bits);
                let window = if window_bits >= 127 {
                    i128::MAX
                } else {
                    (1i128 << window_bits) - 1
                };
                let low = target.saturating_sub(window).max(min);
                let high = target.saturating_add(window).min(max);
                rng.gen_range(low..=high)
            }
        }
    }
}

/// Integers of one primitive type inside a range, shrinking towards a target
#[derive(Debug, Clone)]
pub struct IntegerArbitrary<T> {
    min: T,
    max: T,
    target: Option<T>,
    distribution: RandomDistribution,
}

impl<T: IntegralValue> Default for IntegerArbitrary<T> {
    fn default() -> Self {
        Self {
            min: T::min_value(),
            max: T::max_value(),
            target: None,
            distribution: RandomDistribution::default(),
        }
    }
}

impl<T: IntegralValue> IntegerArbitrary<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values in `[min, max]`
    pub fn between(mut self, min: T, max: T) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn greater_or_equal(mut self, min: T) -> Self {
        self.min = min;
        self
    }

    pub fn less_or_equal(mut self, max: T) -> Self {
        self.max = max;
        self
    }

    /// Shrink towards `target` instead of zero
    pub fn shrink_towards(mut self, target: T) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_distribution(mut self, distribution: RandomDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    fn bounds(&self) -> (i128, i128) {
        (self.min.to_wide(), self.max.to_wide())
    }

    /// The explicit target, otherwise zero moved into the range
    fn shrinking_target(&self) -> i128 {
        let (min, max) = self.bounds();
        match self.target {
            Some(target) => target.to_wide(),
            None if min > max => min,
            None => 0i128.clamp(min, max),
        }
    }

    fn check_range(&self) -> Result<()> {
        let (min, max) = self.bounds();
        if min > max {
            return Err(Error::invalid_range(format!(
                "min {:?} is greater than max {:?}",
                self.min, self.max
            )));
        }
        let target = self.shrinking_target();
        if !(min..=max).contains(&target) {
            return Err(Error::invalid_range(format!(
                "shrinking target {} is outside [{:?}, {:?}]",
                target, self.min, self.max
            )));
        }
        Ok(())
    }

    fn shrinkable(&self, value: i128) -> Shrinkable<T> {
        let (min, max) = self.bounds();
        IntegralShrinkable::shrinkable(
            T::from_wide(value),
            T::from_wide(min),
            T::from_wide(max),
            T::from_wide(self.shrinking_target()),
        )
    }
}

impl<T: IntegralValue> Arbitrary for IntegerArbitrary<T> {
    type Value = T;

    fn generator(&self, _config: &GeneratorConfig) -> BoxedGenerator<T> {
        let this = self.clone();
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            this.check_range()?;
            let (min, max) = this.bounds();
            let value = this
                .distribution
                .next_value(rng, min, max, this.shrinking_target());
            Ok(this.shrinkable(value))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        self.check_range().ok()?;
        let (min, max) = self.bounds();
        let generator = exhaustive::integral_range(min, max, max_samples)?;
        Some(generator.map(std::sync::Arc::new(T::from_wide)))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        if self.check_range().is_err() {
            return EdgeCases::none();
        }
        let (min, max) = self.bounds();
        let target = self.shrinking_target();
        let mut values: Vec<i128> = Vec::new();
        for candidate in [
            Some(target),
            Some(min),
            min.checked_add(1),
            Some(-1),
            Some(0),
            Some(1),
            max.checked_sub(1),
            Some(max),
        ]
        .into_iter()
        .flatten()
        {
            if (min..=max).contains(&candidate) && !values.contains(&candidate) {
                values.push(candidate);
            }
        }
        EdgeCases::from_shrinkables(values.into_iter().map(|v| self.shrinkable(v)).collect())
            .truncate(max_edge_cases)
    }
}
