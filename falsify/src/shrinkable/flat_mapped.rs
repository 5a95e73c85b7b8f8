use std::sync::Arc;

use super::{Candidates, LazyConcat, Shrinkable, ShrinkableValue, Value};
use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::config::GeneratorConfig;
use crate::distance::ShrinkingDistance;
use crate::error::Result;
use crate::generator::RandomGenerator;
use crate::rng::rng_for_seed;

type FlatMapper<T, U> = Arc<dyn Fn(T) -> BoxedArbitrary<U> + Send + Sync>;

/// A value generated from an arbitrary that an outer value selected.
///
/// The inner value is regenerated from a fixed seed whenever the outer value shrinks, so
/// every candidate is reproducible.
pub(super) struct FlatMapped<T, U> {
    outer: Shrinkable<T>,
    inner: Shrinkable<U>,
    mapper: FlatMapper<T, U>,
    config: GeneratorConfig,
    seed: u64,
}

impl<T: Value, U: Value> FlatMapped<T, U> {
    pub(super) fn create(
        outer: Shrinkable<T>,
        mapper: FlatMapper<T, U>,
        config: GeneratorConfig,
        seed: u64,
    ) -> Result<Self> {
        let generator = mapper(outer.value()).generator_with_embedded_edge_cases(&config);
        let inner = generator.next(&mut rng_for_seed(seed))?;
        Ok(Self::with_inner(outer, inner, mapper, config, seed))
    }

    pub(super) fn with_inner(
        outer: Shrinkable<T>,
        inner: Shrinkable<U>,
        mapper: FlatMapper<T, U>,
        config: GeneratorConfig,
        seed: u64,
    ) -> Self {
        Self {
            outer,
            inner,
            mapper,
            config,
            seed,
        }
    }

    fn snapshot(&self) -> Self {
        Self::with_inner(
            self.outer.clone(),
            self.inner.clone(),
            Arc::clone(&self.mapper),
            self.config.clone(),
            self.seed,
        )
    }

    fn shrink_inner(&self) -> Candidates<U> {
        let this = self.snapshot();
        Box::new(self.inner.shrink().map(move |candidate| {
            Shrinkable::new(Self::with_inner(
                this.outer.clone(),
                candidate,
                Arc::clone(&this.mapper),
                this.config.clone(),
                this.seed,
            ))
        }))
    }

    fn shrink_outer(&self) -> Candidates<U> {
        let this = self.snapshot();
        Box::new(self.outer.shrink().filter_map(move |candidate| {
            Self::create(candidate, Arc::clone(&this.mapper), this.config.clone(), this.seed)
                .ok()
                .map(Shrinkable::new)
        }))
    }
}

impl<T: Value, U: Value> ShrinkableValue<U> for FlatMapped<T, U> {
    fn value(&self) -> U {
        self.inner.value()
    }

    fn distance(&self) -> ShrinkingDistance {
        self.outer.distance().append(&self.inner.distance())
    }

    fn shrink(&self) -> Candidates<U> {
        let outer = self.snapshot();
        let inner = self.snapshot();
        LazyConcat::new()
            .then(move || inner.shrink_inner())
            .then(move || outer.shrink_outer())
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitraries;
    use crate::shrinkable::IntegralShrinkable;

    fn below(n: i32) -> BoxedArbitrary<i32> {
        arbitraries::integers::<i32>().between(0, n).boxed()
    }

    #[test]
    fn test_inner_shrinks_before_outer() {
        let outer = IntegralShrinkable::shrinkable(10, 0, 10, 0);
        let inner = IntegralShrinkable::shrinkable(7, 0, 10, 0);
        let flat = FlatMapped::with_inner(outer, inner, Arc::new(below), GeneratorConfig::default(), 3);
        assert_eq!(flat.distance(), ShrinkingDistance::of(&[10, 7]));

        let candidates: Vec<Shrinkable<i32>> = flat.shrink().collect();
        assert_eq!(candidates[0].value(), 0);
        assert_eq!(candidates[0].distance().dimensions()[0], 10);
        let outer_shrunk = candidates.iter().find(|c| c.distance().dimensions()[0] == 0);
        assert_eq!(outer_shrunk.map(Shrinkable::value), Some(0));
    }

    #[test]
    fn test_outer_candidates_regenerate_within_new_bounds() {
        let outer = IntegralShrinkable::shrinkable(50, 0, 100, 0);
        let flat = FlatMapped::create(outer, Arc::new(below), GeneratorConfig::default(), 11).unwrap();
        for candidate in flat.shrink_outer() {
            let bound = candidate.distance().dimensions()[0] as i32;
            assert!(candidate.value() <= bound);
        }
    }
}
