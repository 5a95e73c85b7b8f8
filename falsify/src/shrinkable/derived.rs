use std::sync::Arc;

use super::{Candidates, Shrinkable, ShrinkableValue, Value};
use crate::config::MAX_FILTER_SEARCH_DEPTH;
use crate::distance::ShrinkingDistance;

pub(super) struct Unshrinkable<T> {
    supplier: Box<dyn Fn() -> T + Send + Sync>,
    distance: ShrinkingDistance,
}

impl<T> Unshrinkable<T> {
    pub(super) fn new(
        supplier: impl Fn() -> T + Send + Sync + 'static,
        distance: ShrinkingDistance,
    ) -> Self {
        Self {
            supplier: Box::new(supplier),
            distance,
        }
    }
}

impl<T: Value> ShrinkableValue<T> for Unshrinkable<T> {
    fn value(&self) -> T {
        (self.supplier)()
    }

    fn distance(&self) -> ShrinkingDistance {
        self.distance.clone()
    }

    fn shrink(&self) -> Candidates<T> {
        Box::new(std::iter::empty())
    }
}

pub(super) struct Mapped<T, U> {
    source: Shrinkable<T>,
    mapper: Arc<dyn Fn(T) -> U + Send + Sync>,
}

impl<T, U> Mapped<T, U> {
    pub(super) fn new(source: Shrinkable<T>, mapper: Arc<dyn Fn(T) -> U + Send + Sync>) -> Self {
        Self { source, mapper }
    }
}

impl<T: Value, U: Value> ShrinkableValue<U> for Mapped<T, U> {
    fn value(&self) -> U {
        (self.mapper)(self.source.value())
    }

    fn distance(&self) -> ShrinkingDistance {
        self.source.distance()
    }

    fn shrink(&self) -> Candidates<U> {
        let mapper = Arc::clone(&self.mapper);
        Box::new(
            self.source
                .shrink()
                .map(move |candidate| candidate.map_shared(Arc::clone(&mapper))),
        )
    }

    fn magnitude(&self) -> Option<u128> {
        self.source.magnitude()
    }

    fn grow(&self, by: u128) -> Option<Shrinkable<U>> {
        self.source
            .grow(by)
            .map(|grown| grown.map_shared(Arc::clone(&self.mapper)))
    }
}

pub(super) struct Filtered<T> {
    source: Shrinkable<T>,
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Filtered<T> {
    pub(super) fn new(source: Shrinkable<T>, predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>) -> Self {
        Self { source, predicate }
    }
}

impl<T: Value> ShrinkableValue<T> for Filtered<T> {
    fn value(&self) -> T {
        self.source.value()
    }

    fn distance(&self) -> ShrinkingDistance {
        self.source.distance()
    }

    fn shrink(&self) -> Candidates<T> {
        let predicate = Arc::clone(&self.predicate);
        Box::new(self.source.shrink().filter_map(move |candidate| {
            first_passing(candidate, predicate.as_ref())
                .map(|found| found.filter_shared(Arc::clone(&predicate)))
        }))
    }

    fn magnitude(&self) -> Option<u128> {
        self.source.magnitude()
    }

    fn grow(&self, by: u128) -> Option<Shrinkable<T>> {
        self.source
            .grow(by)
            .filter(|grown| (self.predicate)(&grown.value()))
            .map(|grown| grown.filter_shared(Arc::clone(&self.predicate)))
    }
}

/// The candidate itself if it passes, otherwise the first passing descendant found
/// depth first within the nested attempt budget
pub(crate) fn first_passing<T>(
    candidate: Shrinkable<T>,
    predicate: &(dyn Fn(&T) -> bool + Send + Sync),
) -> Option<Shrinkable<T>> {
    if predicate(&candidate.value()) {
        return Some(candidate);
    }
    let mut budget = MAX_FILTER_SEARCH_DEPTH;
    search_descendants(&candidate, predicate, &mut budget)
}

fn search_descendants<T>(
    node: &Shrinkable<T>,
    predicate: &(dyn Fn(&T) -> bool + Send + Sync),
    budget: &mut usize,
) -> Option<Shrinkable<T>> {
    for child in node.shrink() {
        if *budget == 0 {
            return None;
        }
        *budget -= 1;
        if predicate(&child.value()) {
            return Some(child);
        }
        if let Some(found) = search_descendants(&child, predicate, budget) {
            return Some(found);
        }
    }
    None
}
