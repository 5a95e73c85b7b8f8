use std::sync::Arc;

use rand::{Rng, RngCore};

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::generator::{BoxedGenerator, RandomGenerator};
use crate::shrinkable::{IntegralShrinkable, Shrinkable, Value};

use super::integers;

/// Deferred construction of an arbitrary
pub type Supplier<T> = Arc<dyn Fn() -> BoxedArbitrary<T> + Send + Sync>;

fn too_deep<T>(config: &GeneratorConfig) -> Result<T> {
    Err(Error::RecursionTooDeep {
        max_depth: config.max_depth,
    })
}

/// An arbitrary built only when a value is generated.
///
/// Every evaluation goes one level deeper; generation fails once the configured
/// maximum depth is exceeded.
pub struct Lazy<T> {
    supplier: Supplier<T>,
}

impl<T: Value> Lazy<T> {
    fn deferred(&self, config: &GeneratorConfig, embed_edge_cases: bool) -> BoxedGenerator<T> {
        let supplier = Arc::clone(&self.supplier);
        let config = config.clone();
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            if config.depth_exhausted() {
                return too_deep(&config);
            }
            let arbitrary = supplier();
            let deeper = config.deeper();
            let generator = if embed_edge_cases {
                arbitrary.generator_with_embedded_edge_cases(&deeper)
            } else {
                arbitrary.generator(&deeper)
            };
            generator.next(rng)
        })
    }
}

impl<T: Value> Arbitrary for Lazy<T> {
    type Value = T;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<T> {
        self.deferred(config, false)
    }

    fn generator_with_embedded_edge_cases(&self, config: &GeneratorConfig) -> BoxedGenerator<T> {
        self.deferred(config, config.with_edge_cases)
    }
}

/// One of several deferred arbitraries.
///
/// Once the depth budget is used up only the first supplier is chosen, so it should be
/// the one that does not recurse. Values shrink towards the first supplier.
pub struct LazyOf<T> {
    suppliers: Arc<Vec<Supplier<T>>>,
}

impl<T: Value> Arbitrary for LazyOf<T> {
    type Value = T;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<T> {
        let suppliers = Arc::clone(&self.suppliers);
        let config = config.clone();
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            if suppliers.is_empty() {
                return Err(Error::empty_choice("lazy suppliers"));
            }
            if config.depth > config.max_depth {
                return too_deep(&config);
            }
            let index = if config.depth_exhausted() {
                0
            } else {
                rng.gen_range(0..suppliers.len())
            };
            let choice: Shrinkable<usize> = IntegralShrinkable::shrinkable(index, 0, suppliers.len() - 1, 0);
            let seed = rng.next_u64();
            let suppliers = Arc::clone(&suppliers);
            choice.flat_map(Arc::new(move |index: usize| suppliers[index]()), &config.deeper(), seed)
        })
    }
}

/// An arbitrary that is only constructed when a value is needed; use it to refer to an
/// arbitrary from within its own definition
pub fn lazy<T: Value>(supplier: impl Fn() -> BoxedArbitrary<T> + Send + Sync + 'static) -> Lazy<T> {
    Lazy {
        supplier: Arc::new(supplier),
    }
}

/// One of several deferred arbitraries; the first must end the recursion
pub fn lazy_of<T: Value>(suppliers: Vec<Supplier<T>>) -> LazyOf<T> {
    LazyOf {
        suppliers: Arc::new(suppliers),
    }
}

/// `recur` applied `depth` times to `base`
pub fn recursive<T: Value>(
    base: impl Fn() -> BoxedArbitrary<T>,
    recur: impl Fn(BoxedArbitrary<T>) -> BoxedArbitrary<T>,
    depth: usize,
) -> BoxedArbitrary<T> {
    (0..depth).fold(base(), |arbitrary, _| recur(arbitrary))
}

/// Like [`recursive`] with a depth chosen from `[min_depth, max_depth]`; shrinks towards
/// `min_depth`
pub fn recursive_between<T: Value>(
    base: impl Fn() -> BoxedArbitrary<T> + Send + Sync + 'static,
    recur: impl Fn(BoxedArbitrary<T>) -> BoxedArbitrary<T> + Send + Sync + 'static,
    min_depth: usize,
    max_depth: usize,
) -> BoxedArbitrary<T> {
    let base = Arc::new(base);
    let recur = Arc::new(recur);
    integers::<usize>()
        .between(min_depth, max_depth)
        .shrink_towards(min_depth)
        .flat_map(move |depth| recursive(|| base(), |arbitrary| recur(arbitrary), depth))
        .boxed()
}
