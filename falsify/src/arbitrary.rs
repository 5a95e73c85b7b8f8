//! The `Arbitrary` trait: a description of how to produce values of one type.
//!
//! An arbitrary can be turned into a random generator, an exhaustive generator (when the
//! value space is small enough) and a set of edge cases. Operators like
//! [`Arbitrary::map`] and [`Arbitrary::filter`] derive new arbitraries whose generators,
//! exhaustive generators and edge cases are derived accordingly.

use std::hash::Hash;
use std::sync::Arc;

use rand::RngCore;

use crate::arbitraries::{ListArbitrary, SetArbitrary};
use crate::config::{DEFAULT_MAX_EDGE_CASES, DEFAULT_MAX_MISSES, GeneratorConfig};
use crate::edge_cases::EdgeCases;
use crate::error::Result;
use crate::exhaustive::{self, ExhaustiveGenerator};
use crate::generator::{BoxedGenerator, RandomGenerator};
use crate::shrinkable::{OptionalShrinkable, Shrinkable, Value};

type Mapper<T, U> = Arc<dyn Fn(T) -> U + Send + Sync>;
type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Probability of `None` used by [`Arbitrary::optional`]
pub const DEFAULT_NONE_PROBABILITY: f64 = 0.05;

/// A source of values of one type
pub trait Arbitrary: Send + Sync {
    /// The type of generated values
    type Value: Value;

    /// A random generator for the given generation settings
    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<Self::Value>;

    /// A random generator that mixes in this arbitrary's edge cases.
    ///
    /// Does not mix anything in when the config disables embedded edge cases.
    fn generator_with_embedded_edge_cases(&self, config: &GeneratorConfig) -> BoxedGenerator<Self::Value> {
        let generator = self.generator(config);
        if !config.with_edge_cases {
            return generator;
        }
        generator.with_edge_cases(self.edge_cases(DEFAULT_MAX_EDGE_CASES), config.gen_size)
    }

    /// An enumeration of all values, or `None` if there are more than `max_samples` or
    /// the values cannot be enumerated
    fn exhaustive(&self, _max_samples: u64) -> Option<ExhaustiveGenerator<Self::Value>> {
        None
    }

    /// At most `max_edge_cases` edge cases
    fn edge_cases(&self, _max_edge_cases: usize) -> EdgeCases<Self::Value> {
        EdgeCases::none()
    }

    /// Generate a single value with default settings
    fn sample(&self, rng: &mut dyn RngCore) -> Result<Self::Value> {
        let generator = self.generator(&GeneratorConfig::default());
        Ok(generator.next(rng)?.value())
    }

    fn map<U, F>(self, mapper: F) -> Map<Self, U>
    where
        Self: Sized + 'static,
        U: Value,
        F: Fn(Self::Value) -> U + Send + Sync + 'static,
    {
        Map {
            inner: self,
            mapper: Arc::new(mapper),
        }
    }

    /// Only values satisfying `predicate`, giving up after [`DEFAULT_MAX_MISSES`] misses in a row
    fn filter<F>(self, predicate: F) -> Filter<Self>
    where
        Self: Sized + 'static,
        F: Fn(&Self::Value) -> bool + Send + Sync + 'static,
    {
        self.filter_with_max_misses(predicate, DEFAULT_MAX_MISSES)
    }

    fn filter_with_max_misses<F>(self, predicate: F, max_misses: usize) -> Filter<Self>
    where
        Self: Sized + 'static,
        F: Fn(&Self::Value) -> bool + Send + Sync + 'static,
    {
        Filter {
            inner: self,
            predicate: Arc::new(predicate),
            max_misses,
        }
    }

    /// Use each value to choose the arbitrary of the final value
    fn flat_map<A, F>(self, mapper: F) -> FlatMap<Self, A::Value>
    where
        Self: Sized + 'static,
        A: Arbitrary + 'static,
        F: Fn(Self::Value) -> A + Send + Sync + 'static,
    {
        FlatMap {
            inner: self,
            mapper: Arc::new(move |value| mapper(value).boxed()),
        }
    }

    /// `None` with the given probability, `Some` value otherwise
    fn inject_none(self, probability: f64) -> InjectNone<Self>
    where
        Self: Sized + 'static,
    {
        InjectNone {
            inner: self,
            probability,
        }
    }

    /// `None` with a probability of [`DEFAULT_NONE_PROBABILITY`]
    fn optional(self) -> InjectNone<Self>
    where
        Self: Sized + 'static,
    {
        self.inject_none(DEFAULT_NONE_PROBABILITY)
    }

    /// Never the same value twice from one generator
    fn unique(self) -> Unique<Self>
    where
        Self: Sized + 'static,
        Self::Value: Eq + Hash,
    {
        Unique { inner: self }
    }

    fn dont_shrink(self) -> DontShrink<Self>
    where
        Self: Sized + 'static,
    {
        DontShrink { inner: self }
    }

    /// No edge cases, neither for this arbitrary nor for the arbitraries it is built from
    fn without_edge_cases(self) -> WithoutEdgeCases<Self>
    where
        Self: Sized + 'static,
    {
        WithoutEdgeCases { inner: self }
    }

    /// Additional edge cases after the arbitrary's own
    fn with_edge_cases(self, values: Vec<Self::Value>) -> WithEdgeCases<Self>
    where
        Self: Sized + 'static,
    {
        WithEdgeCases {
            inner: self,
            values,
        }
    }

    /// Generate with a fixed genSize regardless of the configuration
    fn fix_gen_size(self, gen_size: usize) -> FixGenSize<Self>
    where
        Self: Sized + 'static,
    {
        FixGenSize {
            inner: self,
            gen_size,
        }
    }

    fn list(self) -> ListArbitrary<Self::Value>
    where
        Self: Sized + 'static,
        Self::Value: PartialEq,
    {
        ListArbitrary::new(self.boxed())
    }

    fn set(self) -> SetArbitrary<Self::Value>
    where
        Self: Sized + 'static,
        Self::Value: Ord,
    {
        SetArbitrary::new(self.boxed())
    }

    fn boxed(self) -> BoxedArbitrary<Self::Value>
    where
        Self: Sized + 'static,
    {
        BoxedArbitrary::new(self)
    }
}

/// A shareable, type-erased arbitrary
pub struct BoxedArbitrary<T> {
    inner: Arc<dyn Arbitrary<Value = T>>,
}

impl<T> Clone for BoxedArbitrary<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Value> BoxedArbitrary<T> {
    pub fn new(arbitrary: impl Arbitrary<Value = T> + 'static) -> Self {
        Self {
            inner: Arc::new(arbitrary),
        }
    }

    /// Identifies the shared arbitrary; clones have the same identity
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl<T: Value> Arbitrary for BoxedArbitrary<T> {
    type Value = T;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<T> {
        self.inner.generator(config)
    }

    fn generator_with_embedded_edge_cases(&self, config: &GeneratorConfig) -> BoxedGenerator<T> {
        self.inner.generator_with_embedded_edge_cases(config)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        self.inner.exhaustive(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        self.inner.edge_cases(max_edge_cases)
    }

    fn boxed(self) -> BoxedArbitrary<T> {
        self
    }
}

impl<T> std::fmt::Debug for BoxedArbitrary<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BoxedArbitrary")
    }
}

pub struct Map<A: Arbitrary, U> {
    inner: A,
    mapper: Mapper<A::Value, U>,
}

impl<A: Arbitrary, U: Value> Arbitrary for Map<A, U> {
    type Value = U;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<U> {
        self.inner.generator(config).map(Arc::clone(&self.mapper))
    }

    fn generator_with_embedded_edge_cases(&self, config: &GeneratorConfig) -> BoxedGenerator<U> {
        self.inner
            .generator_with_embedded_edge_cases(config)
            .map(Arc::clone(&self.mapper))
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<U>> {
        Some(self.inner.exhaustive(max_samples)?.map(Arc::clone(&self.mapper)))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<U> {
        self.inner.edge_cases(max_edge_cases).map(Arc::clone(&self.mapper))
    }
}

pub struct Filter<A: Arbitrary> {
    inner: A,
    predicate: Predicate<A::Value>,
    max_misses: usize,
}

impl<A: Arbitrary> Arbitrary for Filter<A> {
    type Value = A::Value;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<A::Value> {
        self.inner
            .generator(config)
            .filter(Arc::clone(&self.predicate), self.max_misses)
    }

    fn generator_with_embedded_edge_cases(&self, config: &GeneratorConfig) -> BoxedGenerator<A::Value> {
        self.inner
            .generator_with_embedded_edge_cases(config)
            .filter(Arc::clone(&self.predicate), self.max_misses)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        Some(self.inner.exhaustive(max_samples)?.filter(Arc::clone(&self.predicate)))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<A::Value> {
        self.inner
            .edge_cases(max_edge_cases)
            .filter(Arc::clone(&self.predicate))
    }
}

pub struct FlatMap<A: Arbitrary, U> {
    inner: A,
    mapper: Mapper<A::Value, BoxedArbitrary<U>>,
}

impl<A: Arbitrary, U: Value> Arbitrary for FlatMap<A, U> {
    type Value = U;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<U> {
        self.inner
            .generator(config)
            .flat_map(Arc::clone(&self.mapper), config)
    }

    fn generator_with_embedded_edge_cases(&self, config: &GeneratorConfig) -> BoxedGenerator<U> {
        self.inner
            .generator_with_embedded_edge_cases(config)
            .flat_map(Arc::clone(&self.mapper), config)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<U>> {
        let base = self.inner.exhaustive(max_samples)?;
        let mapper = Arc::clone(&self.mapper);
        exhaustive::flat_map(
            &base,
            Arc::new(move |value| mapper(value).exhaustive(max_samples)),
            max_samples,
        )
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<U> {
        let config = GeneratorConfig::default();
        let mut cases = Vec::new();
        for outer in self.inner.edge_cases(max_edge_cases).iter() {
            let inner_cases = (self.mapper)(outer.value()).edge_cases(max_edge_cases);
            for inner in inner_cases.iter() {
                if cases.len() >= max_edge_cases {
                    return EdgeCases::from_shrinkables(cases);
                }
                let seed = cases.len() as u64;
                cases.push(outer.flat_mapped_with_inner(
                    inner.clone(),
                    Arc::clone(&self.mapper),
                    &config,
                    seed,
                ));
            }
        }
        EdgeCases::from_shrinkables(cases)
    }
}

pub struct InjectNone<A> {
    inner: A,
    probability: f64,
}

impl<A: Arbitrary> Arbitrary for InjectNone<A> {
    type Value = Option<A::Value>;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<Option<A::Value>> {
        self.inner.generator(config).inject_none(self.probability)
    }

    fn generator_with_embedded_edge_cases(&self, config: &GeneratorConfig) -> BoxedGenerator<Option<A::Value>> {
        self.inner
            .generator_with_embedded_edge_cases(config)
            .inject_none(self.probability)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Option<A::Value>>> {
        let generator = self.inner.exhaustive(max_samples)?.inject_none();
        (generator.max_count() <= max_samples).then_some(generator)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Option<A::Value>> {
        let some = self
            .inner
            .edge_cases(max_edge_cases)
            .map_shrinkables(|case| OptionalShrinkable::some(case.clone()));
        if self.probability <= 0.0 {
            return some;
        }
        let none = EdgeCases::from_shrinkables(vec![OptionalShrinkable::none()]);
        EdgeCases::concat(vec![none, some], max_edge_cases)
    }
}

pub struct Unique<A> {
    inner: A,
}

impl<A> Arbitrary for Unique<A>
where
    A: Arbitrary,
    A::Value: Eq + Hash,
{
    type Value = A::Value;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<A::Value> {
        self.inner.generator(config).unique(DEFAULT_MAX_MISSES)
    }

    fn generator_with_embedded_edge_cases(&self, config: &GeneratorConfig) -> BoxedGenerator<A::Value> {
        self.inner
            .generator_with_embedded_edge_cases(config)
            .unique(DEFAULT_MAX_MISSES)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        Some(self.inner.exhaustive(max_samples)?.unique())
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<A::Value> {
        self.inner.edge_cases(max_edge_cases)
    }
}

pub struct DontShrink<A> {
    inner: A,
}

impl<A: Arbitrary> Arbitrary for DontShrink<A> {
    type Value = A::Value;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<A::Value> {
        self.inner.generator(config).dont_shrink()
    }

    fn generator_with_embedded_edge_cases(&self, config: &GeneratorConfig) -> BoxedGenerator<A::Value> {
        self.inner.generator_with_embedded_edge_cases(config).dont_shrink()
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        self.inner.exhaustive(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<A::Value> {
        self.inner
            .edge_cases(max_edge_cases)
            .map_shrinkables(Shrinkable::make_unshrinkable)
    }
}

pub struct WithoutEdgeCases<A> {
    inner: A,
}

impl<A: Arbitrary> Arbitrary for WithoutEdgeCases<A> {
    type Value = A::Value;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<A::Value> {
        self.inner.generator(&config.embedding_edge_cases(false))
    }

    fn generator_with_embedded_edge_cases(&self, config: &GeneratorConfig) -> BoxedGenerator<A::Value> {
        self.generator(config)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        self.inner.exhaustive(max_samples)
    }
}

pub struct WithEdgeCases<A: Arbitrary> {
    inner: A,
    values: Vec<A::Value>,
}

impl<A: Arbitrary> Arbitrary for WithEdgeCases<A> {
    type Value = A::Value;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<A::Value> {
        self.inner.generator(config)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        self.inner.exhaustive(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<A::Value> {
        EdgeCases::concat(
            vec![
                self.inner.edge_cases(max_edge_cases),
                EdgeCases::from_values(self.values.clone()),
            ],
            max_edge_cases,
        )
    }
}

pub struct FixGenSize<A> {
    inner: A,
    gen_size: usize,
}

impl<A: Arbitrary> Arbitrary for FixGenSize<A> {
    type Value = A::Value;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<A::Value> {
        self.inner.generator(&config.with_gen_size(self.gen_size))
    }

    fn generator_with_embedded_edge_cases(&self, config: &GeneratorConfig) -> BoxedGenerator<A::Value> {
        self.inner
            .generator_with_embedded_edge_cases(&config.with_gen_size(self.gen_size))
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        self.inner.exhaustive(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<A::Value> {
        self.inner.edge_cases(max_edge_cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitraries;
    use rand::SeedableRng;
    use std::collections::BTreeSet;
    use rand::rngs::StdRng;

    fn config() -> GeneratorConfig {
        GeneratorConfig::default()
    }

    #[test]
    fn test_map_derives_everything() {
        let doubled = arbitraries::integers::<i32>().between(0, 10).map(|v| v * 2);
        let mut rng = StdRng::seed_from_u64(1);
        let value = doubled.sample(&mut rng).unwrap();
        assert!(value % 2 == 0 && (0..=20).contains(&value));

        let all: Vec<i32> = doubled.exhaustive(100).unwrap().iter().collect();
        assert_eq!(all.len(), 11);
        assert_eq!(all[10], 20);
        assert!(doubled.edge_cases(10).values().contains(&20));
    }

    #[test]
    fn test_filter() {
        let odd = arbitraries::integers::<i32>().between(0, 10).filter(|v| v % 2 == 1);
        let generator = odd.generator(&config());
        let mut rng = StdRng::seed_from_u64(2);
        for value in generator.samples(&mut rng, 100).unwrap() {
            assert_eq!(value % 2, 1);
        }
        assert_eq!(odd.exhaustive(100).unwrap().iter().count(), 5);
        assert!(odd.edge_cases(10).values().iter().all(|v| v % 2 == 1));
    }

    #[test]
    fn test_filter_with_impossible_predicate_fails() {
        let never = arbitraries::integers::<i32>().between(0, 10).filter_with_max_misses(|v| *v > 10, 50);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(never.sample(&mut rng).is_err());
    }

    #[test]
    fn test_flat_map() {
        let sized = arbitraries::integers::<usize>()
            .between(1, 3)
            .flat_map(|n| arbitraries::strings().alpha().of_length(n));
        let mut rng = StdRng::seed_from_u64(4);
        let generator = sized.generator(&config());
        for value in generator.samples(&mut rng, 50).unwrap() {
            assert!((1..=3).contains(&value.chars().count()));
        }
        let edge_cases = sized.edge_cases(100);
        assert!(!edge_cases.is_empty());
    }

    #[test]
    fn test_inject_none_edge_cases() {
        let optional = arbitraries::integers::<u8>().between(0, 3).optional();
        let edge_cases = optional.edge_cases(100).values();
        assert_eq!(edge_cases[0], None);
        assert!(edge_cases.contains(&Some(0)));
        let all: Vec<Option<u8>> = optional.exhaustive(100).unwrap().iter().collect();
        assert_eq!(all, vec![None, Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_dont_shrink_and_without_edge_cases() {
        let frozen = arbitraries::integers::<i64>().dont_shrink().without_edge_cases();
        assert!(frozen.edge_cases(100).is_empty());
        let mut rng = StdRng::seed_from_u64(5);
        let shrinkable = frozen.generator(&config()).next(&mut rng).unwrap();
        assert_eq!(shrinkable.shrink().count(), 0);
    }

    #[test]
    fn test_with_edge_cases_appends() {
        let ints = arbitraries::integers::<i32>().between(0, 100).with_edge_cases(vec![42]);
        assert_eq!(ints.edge_cases(100).values().last(), Some(&42));
    }

    #[test]
    fn test_unique_generator() {
        let unique = arbitraries::integers::<u8>().between(0, 9).unique();
        let generator = unique.generator(&config());
        let mut rng = StdRng::seed_from_u64(6);
        let values = generator.samples(&mut rng, 10).unwrap();
        assert_eq!(values.into_iter().collect::<BTreeSet<u8>>().len(), 10);
    }

    #[test]
    fn test_boxed_delegates() {
        let boxed = arbitraries::just(7).boxed();
        assert_eq!(boxed.clone().exhaustive(10).unwrap().iter().collect::<Vec<_>>(), vec![7]);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(boxed.sample(&mut rng).unwrap(), 7);
    }
}
