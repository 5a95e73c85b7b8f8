use std::iter;

use super::{Candidates, Shrinkable, ShrinkableValue, Value};
use crate::distance::ShrinkingDistance;

/// `Some` value that shrinks to `None` first and then through its inner candidates
pub struct OptionalShrinkable<T> {
    inner: Shrinkable<T>,
}

impl<T: Value> OptionalShrinkable<T> {
    /// Wrap a present value
    pub fn some(inner: Shrinkable<T>) -> Shrinkable<Option<T>> {
        Shrinkable::new(Self { inner })
    }

    /// The absent value; it cannot shrink further
    pub fn none() -> Shrinkable<Option<T>> {
        Shrinkable::unshrinkable(None)
    }
}

impl<T: Value> ShrinkableValue<Option<T>> for OptionalShrinkable<T> {
    fn value(&self) -> Option<T> {
        Some(self.inner.value())
    }

    fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::of(&[1]).append(&self.inner.distance())
    }

    fn shrink(&self) -> Candidates<Option<T>> {
        let none = iter::once(OptionalShrinkable::none());
        Box::new(none.chain(self.inner.shrink().map(OptionalShrinkable::some)))
    }
}
