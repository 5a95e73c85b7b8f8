//! Random generators producing shrinkables.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use rand::{Rng, RngCore};

use crate::arbitrary::BoxedArbitrary;
use crate::config::GeneratorConfig;
use crate::edge_cases::EdgeCases;
use crate::error::{Error, Result};
use crate::shrinkable::{OptionalShrinkable, Shrinkable, Value};

/// Produces one shrinkable per call from a source of randomness.
///
/// All randomness must come from `rng` so that runs with the same seed reproduce.
pub trait RandomGenerator<T>: Send + Sync {
    /// Generate the next value
    fn next(&self, rng: &mut dyn RngCore) -> Result<Shrinkable<T>>;
}

impl<T, F> RandomGenerator<T> for F
where
    F: Fn(&mut dyn RngCore) -> Result<Shrinkable<T>> + Send + Sync,
{
    fn next(&self, rng: &mut dyn RngCore) -> Result<Shrinkable<T>> {
        self(rng)
    }
}

/// A shareable, type-erased random generator
pub struct BoxedGenerator<T> {
    generator: Arc<dyn RandomGenerator<T>>,
}

impl<T> Clone for BoxedGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
        }
    }
}

impl<T> RandomGenerator<T> for BoxedGenerator<T> {
    fn next(&self, rng: &mut dyn RngCore) -> Result<Shrinkable<T>> {
        self.generator.next(rng)
    }
}

/// Chance of one in `ratio` to pick an embedded edge case instead of a random value
pub(crate) fn edge_case_ratio(gen_size: usize, edge_cases: usize) -> usize {
    let per_edge_case = (100 / edge_cases.max(1)).max(1);
    (gen_size / 5).clamp(1, per_edge_case) + 1
}

impl<T: Value> BoxedGenerator<T> {
    /// Box a generator
    pub fn new(generator: impl RandomGenerator<T> + 'static) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    /// A generator that always yields `shrinkable`
    pub fn constant(shrinkable: Shrinkable<T>) -> Self {
        Self::new(move |_: &mut dyn RngCore| Ok(shrinkable.clone()))
    }

    /// Transform generated values
    pub fn map<U: Value>(self, mapper: Arc<dyn Fn(T) -> U + Send + Sync>) -> BoxedGenerator<U> {
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            Ok(self.next(rng)?.map_shared(Arc::clone(&mapper)))
        })
    }

    /// Transform generated shrinkables
    pub fn map_shrinkable<U: Value>(
        self,
        mapper: impl Fn(Shrinkable<T>) -> Shrinkable<U> + Send + Sync + 'static,
    ) -> BoxedGenerator<U> {
        BoxedGenerator::new(move |rng: &mut dyn RngCore| Ok(mapper(self.next(rng)?)))
    }

    /// Regenerate until `predicate` holds, at most `max_misses` times in a row
    pub fn filter(self, predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>, max_misses: usize) -> Self {
        Self::new(move |rng: &mut dyn RngCore| {
            for _ in 0..max_misses {
                let candidate = self.next(rng)?;
                if predicate(&candidate.value()) {
                    return Ok(candidate.filter_shared(Arc::clone(&predicate)));
                }
            }
            Err(Error::too_many_misses(max_misses, "filter"))
        })
    }

    /// Only yield values this generator has not yielded before
    pub fn unique(self, max_misses: usize) -> Self
    where
        T: Eq + Hash,
    {
        let used: Arc<Mutex<HashSet<T>>> = Arc::new(Mutex::new(HashSet::new()));
        Self::new(move |rng: &mut dyn RngCore| {
            for _ in 0..max_misses {
                let candidate = self.next(rng)?;
                let value = candidate.value();
                let fresh = match used.lock() {
                    Ok(mut used) => used.insert(value),
                    Err(poisoned) => poisoned.into_inner().insert(value),
                };
                if fresh {
                    return Ok(candidate);
                }
            }
            Err(Error::too_many_misses(max_misses, "unique"))
        })
    }

    /// Yield `None` with the given probability
    pub fn inject_none(self, probability: f64) -> BoxedGenerator<Option<T>> {
        let probability = probability.clamp(0.0, 1.0);
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            if rng.gen_bool(probability) {
                Ok(OptionalShrinkable::none())
            } else {
                Ok(OptionalShrinkable::some(self.next(rng)?))
            }
        })
    }

    /// Mix `edge_cases` in with a frequency depending on `gen_size`
    pub fn with_edge_cases(self, edge_cases: EdgeCases<T>, gen_size: usize) -> Self {
        if edge_cases.is_empty() {
            return self;
        }
        let ratio = edge_case_ratio(gen_size, edge_cases.len());
        Self::new(move |rng: &mut dyn RngCore| {
            if rng.gen_range(0..ratio) == 0 {
                let index = rng.gen_range(0..edge_cases.len());
                if let Some(edge_case) = edge_cases.get(index) {
                    return Ok(edge_case.clone());
                }
            }
            self.next(rng)
        })
    }

    /// Generated values no longer shrink
    pub fn dont_shrink(self) -> Self {
        self.map_shrinkable(|shrinkable| shrinkable.make_unshrinkable())
    }

    /// Generate a value, then an inner value from the arbitrary it selects
    pub fn flat_map<U: Value>(
        self,
        mapper: Arc<dyn Fn(T) -> BoxedArbitrary<U> + Send + Sync>,
        config: &GeneratorConfig,
    ) -> BoxedGenerator<U> {
        let config = config.clone();
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            let outer = self.next(rng)?;
            let seed = rng.next_u64();
            outer.flat_map(Arc::clone(&mapper), &config, seed)
        })
    }

    /// Generate `count` values
    pub fn samples(&self, rng: &mut dyn RngCore, count: usize) -> Result<Vec<T>> {
        (0..count).map(|_| Ok(self.next(rng)?.value())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shrinkable::IntegralShrinkable;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn counter() -> BoxedGenerator<i32> {
        BoxedGenerator::new(|rng: &mut dyn RngCore| {
            let value = rng.gen_range(0..100);
            Ok(IntegralShrinkable::shrinkable(value, 0, 99, 0))
        })
    }

    #[test]
    fn test_constant_generator() {
        let mut rng = rand::thread_rng();
        let generator = BoxedGenerator::constant(Shrinkable::unshrinkable("x"));
        assert_eq!(generator.next(&mut rng).unwrap().value(), "x");
    }

    #[test]
    fn test_map_keeps_shrinking() {
        let mut rng = StdRng::seed_from_u64(1);
        let generator = counter().map(Arc::new(|v: i32| v + 1000));
        let shrinkable = generator.next(&mut rng).unwrap();
        assert!(shrinkable.value() >= 1000);
        assert!(shrinkable.shrink().all(|s| s.value() >= 1000));
    }

    #[test]
    fn test_filter() {
        let mut rng = StdRng::seed_from_u64(2);
        let generator = counter().filter(Arc::new(|v: &i32| v % 2 == 0), 1000);
        for value in generator.samples(&mut rng, 50).unwrap() {
            assert_eq!(value % 2, 0);
        }
    }

    #[test]
    fn test_filter_gives_up() {
        let mut rng = StdRng::seed_from_u64(3);
        let generator = counter().filter(Arc::new(|v: &i32| *v > 1000), 10);
        let error = generator.next(&mut rng).unwrap_err();
        assert_eq!(error, Error::too_many_misses(10, "filter"));
    }

    #[test]
    fn test_unique() {
        let mut rng = StdRng::seed_from_u64(4);
        let generator = counter().unique(10_000);
        let values = generator.samples(&mut rng, 100).unwrap();
        let distinct: HashSet<i32> = values.iter().copied().collect();
        assert_eq!(distinct.len(), 100);
        assert!(generator.next(&mut rng).is_err());
    }

    #[test]
    fn test_inject_none() {
        let mut rng = StdRng::seed_from_u64(5);
        let always = counter().inject_none(1.0);
        assert_eq!(always.next(&mut rng).unwrap().value(), None);
        let never = counter().inject_none(0.0);
        assert!(never.next(&mut rng).unwrap().value().is_some());
    }

    #[test]
    fn test_with_edge_cases_mixes_in() {
        let mut rng = StdRng::seed_from_u64(6);
        let edge_cases = EdgeCases::from_values(vec![-1]);
        let generator = counter().with_edge_cases(edge_cases, 5);
        let values = generator.samples(&mut rng, 200).unwrap();
        assert!(values.contains(&-1));
        assert!(values.iter().any(|v| *v >= 0));
    }

    #[test]
    fn test_edge_case_ratio() {
        assert_eq!(edge_case_ratio(1000, 3), 34);
        assert_eq!(edge_case_ratio(1000, 1), 101);
        assert_eq!(edge_case_ratio(10, 1), 3);
        assert_eq!(edge_case_ratio(1, 500), 2);
    }

    #[test]
    fn test_dont_shrink() {
        let mut rng = StdRng::seed_from_u64(7);
        let shrinkable = counter().dont_shrink().next(&mut rng).unwrap();
        assert_eq!(shrinkable.shrink().count(), 0);
    }
}
