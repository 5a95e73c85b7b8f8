//! Finite collections of edge-case shrinkables.

use std::sync::Arc;

use crate::combinatorics::{Source, product};
use crate::shrinkable::{AnyValue, CombinedShrinkable, Shrinkable, Value};

/// Values that are likely to uncover bugs: boundaries, zero, the empty collection.
///
/// Edge cases are shrinkables, so a falsified edge case shrinks like any other value.
pub struct EdgeCases<T> {
    cases: Vec<Shrinkable<T>>,
}

impl<T> Clone for EdgeCases<T> {
    fn clone(&self) -> Self {
        Self {
            cases: self.cases.clone(),
        }
    }
}

impl<T> Default for EdgeCases<T> {
    fn default() -> Self {
        Self { cases: Vec::new() }
    }
}

impl<T: Value> EdgeCases<T> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_shrinkables(cases: Vec<Shrinkable<T>>) -> Self {
        Self { cases }
    }

    /// Edge cases that do not shrink
    pub fn from_values(values: Vec<T>) -> Self {
        Self::from_shrinkables(values.into_iter().map(Shrinkable::unshrinkable).collect())
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Shrinkable<T>> {
        self.cases.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shrinkable<T>> {
        self.cases.iter()
    }

    pub fn into_vec(self) -> Vec<Shrinkable<T>> {
        self.cases
    }

    /// Current values of all edge cases
    pub fn values(&self) -> Vec<T> {
        self.cases.iter().map(Shrinkable::value).collect()
    }

    pub fn map<U: Value>(&self, mapper: Arc<dyn Fn(T) -> U + Send + Sync>) -> EdgeCases<U> {
        EdgeCases::from_shrinkables(
            self.cases
                .iter()
                .map(|case| case.map_shared(Arc::clone(&mapper)))
                .collect(),
        )
    }

    pub fn map_shrinkables<U: Value>(&self, mapper: impl Fn(&Shrinkable<T>) -> Shrinkable<U>) -> EdgeCases<U> {
        EdgeCases::from_shrinkables(self.cases.iter().map(mapper).collect())
    }

    /// Keep the edge cases satisfying `predicate`; kept ones shrink filtered as well
    pub fn filter(&self, predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>) -> Self {
        Self::from_shrinkables(
            self.cases
                .iter()
                .filter(|case| predicate(&case.value()))
                .map(|case| case.filter_shared(Arc::clone(&predicate)))
                .collect(),
        )
    }

    /// At most `max` edge cases, keeping the first ones
    pub fn truncate(mut self, max: usize) -> Self {
        self.cases.truncate(max);
        self
    }

    /// All edge cases of `all`, in order, limited to `max`
    pub fn concat(all: Vec<EdgeCases<T>>, max: usize) -> Self {
        Self::from_shrinkables(all.into_iter().flat_map(EdgeCases::into_vec).take(max).collect())
    }
}

/// Every combination of the parts' edge cases, limited to `max`
pub fn combine<R: Value>(
    parts: Vec<EdgeCases<AnyValue>>,
    combinator: Arc<dyn Fn(&[AnyValue]) -> R + Send + Sync>,
    max: usize,
) -> EdgeCases<R> {
    if parts.iter().any(EdgeCases::is_empty) {
        return EdgeCases::none();
    }
    let sources: Vec<Source<Shrinkable<AnyValue>>> = parts
        .into_iter()
        .map(|part| {
            let cases = Arc::new(part.into_vec());
            Arc::new(move || Box::new(cases.as_ref().clone().into_iter()) as Box<dyn Iterator<Item = _>>)
                as Source<Shrinkable<AnyValue>>
        })
        .collect();
    let combined = product(sources)
        .take(max)
        .map(|parts| CombinedShrinkable::shrinkable(parts, Arc::clone(&combinator)))
        .collect();
    EdgeCases::from_shrinkables(combined)
}

impl<T: std::fmt::Debug> std::fmt::Debug for EdgeCases<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.cases.iter()).finish()
    }
}
