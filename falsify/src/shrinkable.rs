//! Values bundled with the knowledge of how to shrink them.
//!
//! A [`Shrinkable`] carries a value, its [`ShrinkingDistance`] to the shrinking target and
//! a lazy, finite stream of candidate shrinkables that are "simpler" than itself. The
//! stream of candidates is produced on demand; nothing is computed until the shrinking
//! engine asks for it.

mod combined;
mod container;
mod decimal;
mod derived;
mod flat_mapped;
mod integral;
mod optional;

use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::arbitrary::BoxedArbitrary;
use crate::config::GeneratorConfig;
use crate::distance::ShrinkingDistance;
use crate::error::Result;
use crate::falsifier::Falsifier;
use crate::sequence::ShrinkingSequence;

pub use combined::{AnyValue, CombinedShrinkable, downcast_part, erase};
pub use container::{ContainerKind, ContainerShrinkable, all_distinct};
pub use decimal::DecimalShrinkable;
pub use integral::{IntegralShrinkable, IntegralValue, fibonacci_candidates};
pub use optional::OptionalShrinkable;

/// Bounds every generated value has to satisfy
pub trait Value: Clone + fmt::Debug + Send + Sync + 'static {}

impl<T: Clone + fmt::Debug + Send + Sync + 'static> Value for T {}

/// A lazy stream of shrink candidates
pub type Candidates<T> = Box<dyn Iterator<Item = Shrinkable<T>>>;

/// Behaviour behind a [`Shrinkable`]
///
/// Implementations must be immutable: two calls of [`ShrinkableValue::shrink`] yield the
/// same candidates.
pub trait ShrinkableValue<T>: Send + Sync {
    /// The current value
    fn value(&self) -> T;

    /// Distance of the current value to its shrinking target
    fn distance(&self) -> ShrinkingDistance;

    /// Candidates ordered roughly from simplest to least simple
    fn shrink(&self) -> Candidates<T>;

    /// Magnitude on an additive scale, if this value can grow
    fn magnitude(&self) -> Option<u128> {
        None
    }

    /// The same value moved `by` units further away from its target, if that stays valid
    fn grow(&self, _by: u128) -> Option<Shrinkable<T>> {
        None
    }
}

/// A value together with its shrinking behaviour
pub struct Shrinkable<T> {
    inner: Arc<dyn ShrinkableValue<T>>,
}

impl<T> Clone for Shrinkable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Shrinkable<T> {
    /// The current value
    pub fn value(&self) -> T {
        self.inner.value()
    }

    /// Distance of the current value to its shrinking target
    pub fn distance(&self) -> ShrinkingDistance {
        self.inner.distance()
    }

    /// Candidates that are simpler than this shrinkable
    pub fn shrink(&self) -> Candidates<T> {
        self.inner.shrink()
    }

    /// Magnitude on an additive scale, if this value can grow
    pub fn magnitude(&self) -> Option<u128> {
        self.inner.magnitude()
    }

    /// The same value moved `by` units away from its target
    pub fn grow(&self, by: u128) -> Option<Shrinkable<T>> {
        self.inner.grow(by)
    }
}

impl<T: Value> Shrinkable<T> {
    /// Wrap a custom shrinking behaviour
    pub fn new(inner: impl ShrinkableValue<T> + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// A value that never shrinks; its distance is zero
    pub fn unshrinkable(value: T) -> Self {
        Self::unshrinkable_with_distance(value, ShrinkingDistance::of(&[0]))
    }

    /// A value that never shrinks but reports the given distance
    pub fn unshrinkable_with_distance(value: T, distance: ShrinkingDistance) -> Self {
        Self::new(derived::Unshrinkable::new(move || value.clone(), distance))
    }

    /// A value computed anew on every access that never shrinks
    pub fn supply_unshrinkable(supplier: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self::new(derived::Unshrinkable::new(
            supplier,
            ShrinkingDistance::of(&[0]),
        ))
    }

    /// Freeze this shrinkable: same value and distance, no candidates
    pub fn make_unshrinkable(&self) -> Self {
        let this = self.clone();
        Self::new(derived::Unshrinkable::new(
            move || this.value(),
            self.distance(),
        ))
    }

    /// Transform the value; candidates and distance follow the source
    pub fn map<U: Value>(&self, mapper: impl Fn(T) -> U + Send + Sync + 'static) -> Shrinkable<U> {
        self.map_shared(Arc::new(mapper))
    }

    /// Like [`Shrinkable::map`], for a mapper that is already shared
    pub fn map_shared<U: Value>(&self, mapper: Arc<dyn Fn(T) -> U + Send + Sync>) -> Shrinkable<U> {
        Shrinkable::new(derived::Mapped::new(self.clone(), mapper))
    }

    /// Keep only candidates that satisfy `predicate`.
    ///
    /// A rejected candidate is not the end of the search: its own candidates are
    /// explored depth first, up to [`MAX_FILTER_SEARCH_DEPTH`](crate::config::MAX_FILTER_SEARCH_DEPTH)
    /// nested attempts.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filter_shared(Arc::new(predicate))
    }

    /// Like [`Shrinkable::filter`], for a predicate that is already shared
    pub fn filter_shared(&self, predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>) -> Self {
        Self::new(derived::Filtered::new(self.clone(), predicate))
    }

    /// Derive a dependent value from an arbitrary chosen by this value.
    ///
    /// The inner value is generated from `seed`, so shrinking the outer value regenerates
    /// an inner value deterministically.
    pub fn flat_map<U: Value>(
        &self,
        mapper: Arc<dyn Fn(T) -> BoxedArbitrary<U> + Send + Sync>,
        config: &GeneratorConfig,
        seed: u64,
    ) -> Result<Shrinkable<U>> {
        flat_mapped::FlatMapped::create(self.clone(), mapper, config.clone(), seed)
            .map(Shrinkable::new)
    }

    /// Like [`Shrinkable::flat_map`] with an inner shrinkable that already exists
    pub(crate) fn flat_mapped_with_inner<U: Value>(
        &self,
        inner: Shrinkable<U>,
        mapper: Arc<dyn Fn(T) -> BoxedArbitrary<U> + Send + Sync>,
        config: &GeneratorConfig,
        seed: u64,
    ) -> Shrinkable<U> {
        Shrinkable::new(flat_mapped::FlatMapped::with_inner(
            self.clone(),
            inner,
            mapper,
            config.clone(),
            seed,
        ))
    }

    /// A shrinking sequence of this shrinkable against `falsifier`
    pub fn shrink_with(&self, falsifier: Falsifier<T>) -> ShrinkingSequence<T>
    where
        T: Eq + Hash,
    {
        ShrinkingSequence::deep_search(self.clone(), falsifier)
    }
}

impl<T: fmt::Debug> fmt::Debug for Shrinkable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shrinkable<{:?}:{:?}>", self.value(), self.distance())
    }
}

type PendingCandidates<T> = Box<dyn FnOnce() -> Candidates<T>>;

/// Concatenation of candidate streams that are only created when reached
pub(crate) struct LazyConcat<T> {
    pending: VecDeque<PendingCandidates<T>>,
    current: Option<Candidates<T>>,
}

impl<T> LazyConcat<T> {
    pub(crate) fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            current: None,
        }
    }

    pub(crate) fn then(mut self, next: impl FnOnce() -> Candidates<T> + 'static) -> Self {
        self.pending.push_back(Box::new(next));
        self
    }
}

impl<T: 'static> LazyConcat<T> {
    pub(crate) fn boxed(self) -> Candidates<T> {
        Box::new(self)
    }
}

impl<T> Iterator for LazyConcat<T> {
    type Item = Shrinkable<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(current) = self.current.as_mut()
                && let Some(next) = current.next()
            {
                return Some(next);
            }
            let supplier = self.pending.pop_front()?;
            self.current = Some(supplier());
        }
    }
}

/// Order candidates by distance, simplest first; stable for equal distances
pub(crate) fn sorted_by_distance<T: 'static>(mut candidates: Vec<Shrinkable<T>>) -> Candidates<T> {
    candidates.sort_by_cached_key(Shrinkable::distance);
    Box::new(candidates.into_iter())
}
