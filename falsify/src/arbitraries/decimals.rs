use std::sync::Arc;

use rand::RngCore;

use super::RandomDistribution;
use crate::arbitrary::Arbitrary;
use crate::config::GeneratorConfig;
use crate::decimal::{Decimal, MAX_SCALE, pow10};
use crate::edge_cases::EdgeCases;
use crate::error::{Error, Result};
use crate::exhaustive::{self, ExhaustiveGenerator};
use crate::generator::BoxedGenerator;
use crate::shrinkable::DecimalShrinkable;

const DEFAULT_SCALE: u32 = 2;
const DEFAULT_BOUND: i64 = 1_000_000_000;

/// Bounds and shrinking target of a decimal arbitrary as unscaled values
#[derive(Debug, Clone, Copy)]
struct UnscaledRange {
    min: i128,
    max: i128,
    target: i128,
}

/// Decimals with a fixed number of decimal places inside a range
#[derive(Debug, Clone)]
pub struct DecimalArbitrary {
    min: Decimal,
    max: Decimal,
    scale: u32,
    target: Option<Decimal>,
    distribution: RandomDistribution,
}

impl Default for DecimalArbitrary {
    fn default() -> Self {
        Self {
            min: Decimal::from_integer(-DEFAULT_BOUND),
            max: Decimal::from_integer(DEFAULT_BOUND),
            scale: DEFAULT_SCALE,
            target: None,
            distribution: RandomDistribution::default(),
        }
    }
}

impl DecimalArbitrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(mut self, min: Decimal, max: Decimal) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn greater_or_equal(mut self, min: Decimal) -> Self {
        self.min = min;
        self
    }

    pub fn less_or_equal(mut self, max: Decimal) -> Self {
        self.max = max;
        self
    }

    /// Number of decimal places of generated values
    pub fn of_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn shrink_towards(mut self, target: Decimal) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_distribution(mut self, distribution: RandomDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    fn unscaled(&self, decimal: &Decimal, what: &str) -> Result<i128> {
        decimal.rescale(self.scale).map(|d| d.unscaled()).ok_or_else(|| {
            Error::invalid_range(format!(
                "{} {} cannot be represented with {} decimal places",
                what, decimal, self.scale
            ))
        })
    }

    fn unscaled_range(&self) -> Result<UnscaledRange> {
        if self.scale > MAX_SCALE {
            return Err(Error::invalid_range(format!(
                "scale {} exceeds maximum of {}",
                self.scale, MAX_SCALE
            )));
        }
        let min = self.unscaled(&self.min, "min")?;
        let max = self.unscaled(&self.max, "max")?;
        if min > max {
            return Err(Error::invalid_range(format!(
                "min {} is greater than max {}",
                self.min, self.max
            )));
        }
        let target = match &self.target {
            Some(target) => self.unscaled(target, "shrinking target")?,
            None => 0i128.clamp(min, max),
        };
        if !(min..=max).contains(&target) {
            return Err(Error::invalid_range(format!(
                "shrinking target is outside [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(UnscaledRange { min, max, target })
    }
}

impl Arbitrary for DecimalArbitrary {
    type Value = Decimal;

    fn generator(&self, _config: &GeneratorConfig) -> BoxedGenerator<Decimal> {
        let range = self.unscaled_range();
        let scale = self.scale;
        let distribution = self.distribution;
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            let range = range.clone()?;
            let unscaled = distribution.next_value(rng, range.min, range.max, range.target);
            Ok(DecimalShrinkable::shrinkable(
                unscaled,
                range.min,
                range.max,
                range.target,
                scale,
            ))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Decimal>> {
        let range = self.unscaled_range().ok()?;
        let scale = self.scale;
        let generator = exhaustive::integral_range(range.min, range.max, max_samples)?;
        Some(generator.map(Arc::new(move |unscaled| Decimal::from_parts(unscaled, scale))))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Decimal> {
        let Ok(range) = self.unscaled_range() else {
            return EdgeCases::none();
        };
        let one = pow10(self.scale);
        let mut values: Vec<i128> = Vec::new();
        for candidate in [
            Some(range.target),
            Some(range.min),
            Some(range.max),
            range.target.checked_add(1),
            range.target.checked_sub(1),
            Some(one),
            Some(-one),
        ]
        .into_iter()
        .flatten()
        {
            if (range.min..=range.max).contains(&candidate) && !values.contains(&candidate) {
                values.push(candidate);
            }
        }
        let shrinkables = values
            .into_iter()
            .map(|unscaled| {
                DecimalShrinkable::shrinkable(unscaled, range.min, range.max, range.target, self.scale)
            })
            .collect();
        EdgeCases::from_shrinkables(shrinkables).truncate(max_edge_cases)
    }
}
