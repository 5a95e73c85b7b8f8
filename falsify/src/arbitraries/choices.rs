use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::arbitrary::{Arbitrary, BoxedArbitrary, FlatMap};
use crate::config::GeneratorConfig;
use crate::distance::ShrinkingDistance;
use crate::edge_cases::EdgeCases;
use crate::error::{Error, Result};
use crate::exhaustive::{self, ExhaustiveGenerator};
use crate::generator::BoxedGenerator;
use crate::shrinkable::{ContainerKind, ContainerShrinkable, IntegralShrinkable, Shrinkable, Value};

/// Always the same value
#[derive(Debug, Clone)]
pub struct Just<T> {
    value: T,
}

impl<T: Value> Just<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Value> Arbitrary for Just<T> {
    type Value = T;

    fn generator(&self, _config: &GeneratorConfig) -> BoxedGenerator<T> {
        BoxedGenerator::constant(Shrinkable::unshrinkable(self.value.clone()))
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        exhaustive::from_values(vec![self.value.clone()], max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        EdgeCases::from_values(vec![self.value.clone()]).truncate(max_edge_cases)
    }
}

/// A fresh value from a supplier for every try
pub struct Create<T> {
    supplier: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T: Value> Arbitrary for Create<T> {
    type Value = T;

    fn generator(&self, _config: &GeneratorConfig) -> BoxedGenerator<T> {
        let supplier = Arc::clone(&self.supplier);
        BoxedGenerator::new(move |_rng: &mut dyn RngCore| {
            let supplier = Arc::clone(&supplier);
            Ok(Shrinkable::supply_unshrinkable(move || supplier()))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        let supplier = Arc::clone(&self.supplier);
        ExhaustiveGenerator::bounded(1, max_samples, move || Box::new(std::iter::once(supplier())))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        let supplier = Arc::clone(&self.supplier);
        EdgeCases::from_shrinkables(vec![Shrinkable::supply_unshrinkable(move || supplier())])
            .truncate(max_edge_cases)
    }
}

/// One of a fixed list of values, shrinking towards earlier values.
///
/// With weights, values are picked in proportion to their weight; values of weight zero
/// are never picked.
#[derive(Debug, Clone)]
pub struct Choice<T> {
    values: Arc<Vec<T>>,
    weights: Option<Vec<u32>>,
}

impl<T: Value> Choice<T> {
    fn shrinkable(values: &Arc<Vec<T>>, index: usize) -> Shrinkable<T> {
        let values = Arc::clone(values);
        let max = values.len().saturating_sub(1);
        IntegralShrinkable::shrinkable(index, 0, max, 0).map(move |index| values[index].clone())
    }

    fn check(&self) -> Result<()> {
        if self.values.is_empty() {
            return Err(Error::empty_choice(if self.weights.is_some() { "frequency" } else { "of" }));
        }
        Ok(())
    }

    fn pick(weights: Option<&[u32]>, rng: &mut dyn RngCore, count: usize) -> usize {
        let Some(weights) = weights else {
            return rng.gen_range(0..count);
        };
        let total: u64 = weights.iter().map(|w| u64::from(*w)).sum();
        let mut point = rng.gen_range(0..total);
        for (index, weight) in weights.iter().enumerate() {
            let weight = u64::from(*weight);
            if point < weight {
                return index;
            }
            point -= weight;
        }
        count - 1
    }
}

impl<T: Value> Arbitrary for Choice<T> {
    type Value = T;

    fn generator(&self, _config: &GeneratorConfig) -> BoxedGenerator<T> {
        let checked = self.check();
        let this = self.clone();
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            checked.clone()?;
            let index = Self::pick(this.weights.as_deref(), rng, this.values.len());
            Ok(Self::shrinkable(&this.values, index))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        exhaustive::from_values(self.values.as_ref().clone(), max_samples)
    }

    /// The first and the last value
    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        let last = self.values.len().saturating_sub(1);
        let indices: Vec<usize> = match self.values.len() {
            0 => Vec::new(),
            1 => vec![0],
            _ => vec![0, last],
        };
        EdgeCases::from_shrinkables(indices.into_iter().map(|index| Self::shrinkable(&self.values, index)).collect())
            .truncate(max_edge_cases)
    }
}

/// Values of one of several arbitraries, shrinking towards earlier arbitraries
pub struct OneOf<T: 'static> {
    choices: Vec<BoxedArbitrary<T>>,
    chosen: FlatMap<Choice<BoxedArbitrary<T>>, T>,
}

impl<T: Value> OneOf<T> {
    fn new(choices: Choice<BoxedArbitrary<T>>) -> Self {
        Self {
            choices: choices.values.as_ref().clone(),
            chosen: choices.flat_map(|arbitrary| arbitrary),
        }
    }
}

impl<T: Value> Arbitrary for OneOf<T> {
    type Value = T;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<T> {
        self.chosen.generator(config)
    }

    fn generator_with_embedded_edge_cases(&self, config: &GeneratorConfig) -> BoxedGenerator<T> {
        self.chosen.generator_with_embedded_edge_cases(config)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        self.chosen.exhaustive(max_samples)
    }

    /// The edge cases of all arbitraries
    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        let all = self.choices.iter().map(|choice| choice.edge_cases(max_edge_cases)).collect();
        EdgeCases::concat(all, max_edge_cases)
    }
}

/// All orderings of a list of values, shrinking towards the given order
#[derive(Debug, Clone)]
pub struct Shuffle<T> {
    values: Vec<T>,
}

impl<T: Value + PartialEq> Arbitrary for Shuffle<T> {
    type Value = Vec<T>;

    fn generator(&self, _config: &GeneratorConfig) -> BoxedGenerator<Vec<T>> {
        let values = self.values.clone();
        let kind = Arc::new(ContainerKind::list());
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            let mut order: Vec<usize> = (0..values.len()).collect();
            order.shuffle(rng);
            // the original position is the distance, so sorting restores the original order
            let elements = order
                .into_iter()
                .map(|index| {
                    Shrinkable::unshrinkable_with_distance(values[index].clone(), ShrinkingDistance::of(&[index as u64]))
                })
                .collect();
            Ok(ContainerShrinkable::shrinkable(elements, values.len(), Arc::clone(&kind)))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Vec<T>>> {
        exhaustive::permutations(self.values.clone(), max_samples)
    }
}

/// Always `value`
pub fn just<T: Value>(value: T) -> Just<T> {
    Just::new(value)
}

/// A value from `supplier`, called anew for every try; never shrinks
pub fn create<T: Value>(supplier: impl Fn() -> T + Send + Sync + 'static) -> Create<T> {
    Create {
        supplier: Arc::new(supplier),
    }
}

/// One of `values`, each equally likely
pub fn of<T: Value>(values: Vec<T>) -> Choice<T> {
    Choice {
        values: Arc::new(values),
        weights: None,
    }
}

/// One of the values, picked in proportion to its weight
pub fn frequency<T: Value>(weighted: Vec<(u32, T)>) -> Choice<T> {
    let (weights, values): (Vec<u32>, Vec<T>) = weighted.into_iter().filter(|(weight, _)| *weight > 0).unzip();
    Choice {
        values: Arc::new(values),
        weights: Some(weights),
    }
}

/// A value of one of the arbitraries, each equally likely
pub fn one_of<T: Value>(choices: Vec<BoxedArbitrary<T>>) -> OneOf<T> {
    OneOf::new(of(choices))
}

/// A value of one of the arbitraries, picked in proportion to its weight
pub fn frequency_of<T: Value>(weighted: Vec<(u32, BoxedArbitrary<T>)>) -> OneOf<T> {
    OneOf::new(frequency(weighted))
}

/// The values in random order
pub fn shuffle<T: Value + PartialEq>(values: Vec<T>) -> Shuffle<T> {
    Shuffle { values }
}

/// `false` and `true`, shrinking towards `false`
pub fn booleans() -> Choice<bool> {
    of(vec![false, true])
}
