use std::any::Any;
use std::sync::Arc;

use super::{Candidates, LazyConcat, Shrinkable, ShrinkableValue, Value};
use crate::combinatorics::distinct_pairs;
use crate::distance::ShrinkingDistance;

/// A type-erased value, used where shrinkables of different types are combined
pub type AnyValue = Arc<dyn Any + Send + Sync>;

type Combinator<R> = Arc<dyn Fn(&[AnyValue]) -> R + Send + Sync>;

/// Independently shrinkable parts combined into one value.
///
/// Candidates first shrink one part at a time, then pairs of parts together. The distance
/// is the concatenation of the parts' distances.
pub struct CombinedShrinkable<R> {
    parts: Vec<Shrinkable<AnyValue>>,
    combinator: Combinator<R>,
}

impl<R: Value> CombinedShrinkable<R> {
    /// Combine erased parts with `combinator`
    pub fn shrinkable(parts: Vec<Shrinkable<AnyValue>>, combinator: Combinator<R>) -> Shrinkable<R> {
        Shrinkable::new(Self { parts, combinator })
    }

    fn replaced(&self, replacements: &[(usize, Shrinkable<AnyValue>)]) -> Shrinkable<R> {
        let mut parts = self.parts.clone();
        for (index, part) in replacements {
            parts[*index] = part.clone();
        }
        Self::shrinkable(parts, Arc::clone(&self.combinator))
    }

    fn shrink_one_after_another(self: &Arc<Self>) -> Candidates<R> {
        let this = Arc::clone(self);
        Box::new((0..self.parts.len()).flat_map(move |index| {
            let this = Arc::clone(&this);
            this.parts[index]
                .shrink()
                .map(move |candidate| this.replaced(&[(index, candidate)]))
        }))
    }

    fn shrink_pairs(self: &Arc<Self>) -> Candidates<R> {
        let this = Arc::clone(self);
        Box::new(distinct_pairs(self.parts.len()).flat_map(move |(left, right)| {
            let this = Arc::clone(&this);
            let lefts = this.parts[left].shrink();
            let rights = this.parts[right].shrink();
            lefts
                .zip(rights)
                .map(move |(l, r)| this.replaced(&[(left, l), (right, r)]))
        }))
    }
}

/// Erase the value type of a shrinkable
pub fn erase<T: Value>(shrinkable: &Shrinkable<T>) -> Shrinkable<AnyValue> {
    shrinkable.map(|value| Arc::new(value) as AnyValue)
}

/// The erased part at `index`, restored to its original type.
///
/// Combinators only ever see the parts they erased themselves, so a mismatch is a bug in
/// the combinator.
pub fn downcast_part<T: Value>(values: &[AnyValue], index: usize) -> T {
    values[index]
        .downcast_ref::<T>()
        .cloned()
        .expect("combined part has the type it was erased from")
}

impl<R: Value> ShrinkableValue<R> for CombinedShrinkable<R> {
    fn value(&self) -> R {
        let values: Vec<AnyValue> = self.parts.iter().map(Shrinkable::value).collect();
        (self.combinator)(&values)
    }

    fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::combine(&self.parts)
    }

    fn shrink(&self) -> Candidates<R> {
        let this = Arc::new(Self {
            parts: self.parts.clone(),
            combinator: Arc::clone(&self.combinator),
        });
        let pairs = Arc::clone(&this);
        LazyConcat::new()
            .then(move || this.shrink_one_after_another())
            .then(move || pairs.shrink_pairs())
            .boxed()
    }
}
