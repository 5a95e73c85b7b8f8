//! Exhaustive enumeration of all values an arbitrary can produce.
//!
//! Every generator knows its exact number of values up front. Constructors return `None`
//! when that number exceeds the allowed maximum, so a too large space is rejected before
//! a single value is produced.

use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use crate::combinatorics::{self, Source};
use crate::shrinkable::{AnyValue, Value};

/// A finite, restartable enumeration with a known number of values
pub struct ExhaustiveGenerator<T> {
    max_count: u64,
    source: Source<T>,
}

impl<T> Clone for ExhaustiveGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            max_count: self.max_count,
            source: Arc::clone(&self.source),
        }
    }
}

impl<T> std::fmt::Debug for ExhaustiveGenerator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExhaustiveGenerator")
            .field("max_count", &self.max_count)
            .finish()
    }
}

impl<T: Value> ExhaustiveGenerator<T> {
    /// Wrap a source producing at most `max_count` values
    pub fn new(
        max_count: u64,
        source: impl Fn() -> Box<dyn Iterator<Item = T>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            max_count,
            source: Arc::new(source),
        }
    }

    /// `None` if `max_count` exceeds `max_samples`
    pub fn bounded(
        max_count: u64,
        max_samples: u64,
        source: impl Fn() -> Box<dyn Iterator<Item = T>> + Send + Sync + 'static,
    ) -> Option<Self> {
        (max_count <= max_samples).then(|| Self::new(max_count, source))
    }

    /// Upper bound of the number of values; exact unless filtered
    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    /// A fresh pass over all values
    pub fn iter(&self) -> Box<dyn Iterator<Item = T>> {
        (self.source)()
    }

    pub(crate) fn source(&self) -> Source<T> {
        Arc::clone(&self.source)
    }

    pub fn map<U: Value>(&self, mapper: Arc<dyn Fn(T) -> U + Send + Sync>) -> ExhaustiveGenerator<U> {
        let source = self.source();
        ExhaustiveGenerator::new(self.max_count, move || {
            let mapper = Arc::clone(&mapper);
            Box::new(source().map(move |value| mapper(value)))
        })
    }

    /// Skip values not satisfying `predicate`; the count stays an upper bound
    pub fn filter(&self, predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>) -> Self {
        let source = self.source();
        Self::new(self.max_count, move || {
            let predicate = Arc::clone(&predicate);
            Box::new(source().filter(move |value| predicate(value)))
        })
    }

    /// Skip values already produced in this pass
    pub fn unique(&self) -> Self
    where
        T: Eq + Hash,
    {
        let source = self.source();
        Self::new(self.max_count, move || {
            let mut seen = HashSet::new();
            Box::new(source().filter(move |value| seen.insert(value.clone())))
        })
    }

    /// `None` first, then every value
    pub fn inject_none(&self) -> ExhaustiveGenerator<Option<T>> {
        let source = self.source();
        ExhaustiveGenerator::new(self.max_count.saturating_add(1), move || {
            Box::new(std::iter::once(None).chain(source().map(Some)))
        })
    }
}

/// Exactly the given values
pub fn from_values<T: Value>(values: Vec<T>, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
    let values = Arc::new(values);
    ExhaustiveGenerator::bounded(values.len() as u64, max_samples, move || {
        Box::new(values.as_ref().clone().into_iter())
    })
}

/// All integers in `[min, max]`, ascending
pub fn integral_range(min: i128, max: i128, max_samples: u64) -> Option<ExhaustiveGenerator<i128>> {
    if min > max {
        return ExhaustiveGenerator::bounded(0, max_samples, || Box::new(std::iter::empty()));
    }
    let count = u64::try_from(max.abs_diff(min)).ok()?.checked_add(1)?;
    ExhaustiveGenerator::bounded(count, max_samples, move || Box::new(min..=max))
}

/// Cartesian product of erased parts, combined with `combinator`
pub fn combine<R: Value>(
    parts: Vec<ExhaustiveGenerator<AnyValue>>,
    combinator: Arc<dyn Fn(&[AnyValue]) -> R + Send + Sync>,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<R>> {
    let count = parts
        .iter()
        .try_fold(1u64, |count, part| count.checked_mul(part.max_count()))?;
    let sources: Vec<Source<AnyValue>> = parts.iter().map(ExhaustiveGenerator::source).collect();
    ExhaustiveGenerator::bounded(count, max_samples, move || {
        let combinator = Arc::clone(&combinator);
        Box::new(combinatorics::product(sources.clone()).map(move |values| combinator(&values)))
    })
}

/// All lists with sizes in `[min_size, max_size]` over the element values
pub fn lists<T: Value>(
    element: &ExhaustiveGenerator<T>,
    min_size: usize,
    max_size: usize,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<Vec<T>>> {
    let count = combinatorics::list_count(element.max_count(), min_size, max_size)?;
    let source = element.source();
    ExhaustiveGenerator::bounded(count, max_samples, move || {
        Box::new(combinatorics::lists(Arc::clone(&source), min_size, max_size))
    })
}

/// All sets with sizes in `[min_size, max_size]` over the distinct element values
pub fn sets<T: Value + Ord>(
    element: &ExhaustiveGenerator<T>,
    min_size: usize,
    max_size: usize,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<BTreeSet<T>>> {
    let count = combinatorics::set_count(element.max_count(), min_size, max_size)?;
    if count > max_samples {
        return None;
    }
    let values: Vec<T> = element.iter().collect::<BTreeSet<T>>().into_iter().collect();
    let count = combinatorics::set_count(values.len() as u64, min_size, max_size)?;
    ExhaustiveGenerator::bounded(count, max_samples, move || {
        Box::new(
            combinatorics::combinations(values.clone(), min_size, max_size)
                .map(|subset| subset.into_iter().collect()),
        )
    })
}

/// All orderings of `values`
pub fn permutations<T: Value>(values: Vec<T>, max_samples: u64) -> Option<ExhaustiveGenerator<Vec<T>>> {
    let count = combinatorics::factorial(values.len() as u64)?;
    ExhaustiveGenerator::bounded(count, max_samples, move || {
        Box::new(combinatorics::permutations(values.clone()))
    })
}

/// The values of all generators, one after another
pub fn concat<T: Value>(
    generators: Vec<ExhaustiveGenerator<T>>,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<T>> {
    let count = generators
        .iter()
        .try_fold(0u64, |count, generator| count.checked_add(generator.max_count()))?;
    let sources: Vec<Source<T>> = generators.iter().map(ExhaustiveGenerator::source).collect();
    ExhaustiveGenerator::bounded(count, max_samples, move || {
        Box::new(sources.clone().into_iter().flat_map(|source| source()))
    })
}

/// For every base value, all values of the generator it selects.
///
/// The count is computed by enumerating the base values once.
pub fn flat_map<T: Value, U: Value>(
    base: &ExhaustiveGenerator<T>,
    mapper: Arc<dyn Fn(T) -> Option<ExhaustiveGenerator<U>> + Send + Sync>,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<U>> {
    let mut count = 0u64;
    for value in base.iter() {
        count = count.checked_add(mapper(value)?.max_count())?;
        if count > max_samples {
            return None;
        }
    }
    let source = base.source();
    ExhaustiveGenerator::bounded(count, max_samples, move || {
        let mapper = Arc::clone(&mapper);
        Box::new(
            source()
                .filter_map(move |value| mapper(value))
                .flat_map(|generator| generator.iter()),
        )
    })
}
