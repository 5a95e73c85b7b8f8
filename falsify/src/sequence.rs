//! Stepwise shrinking of a single falsified value.
//!
//! A [`ShrinkingSequence`] keeps the best [`FalsificationResult`] found so far and improves
//! it one step per call of [`ShrinkingSequence::next`]. Sequences compose with
//! [`map`](ShrinkingSequence::map), [`flat_map`](ShrinkingSequence::flat_map) and
//! [`and_then`](ShrinkingSequence::and_then).

use std::collections::HashSet;
use std::hash::Hash;

use log::debug;

use crate::config::MAX_FILTER_SEARCH_DEPTH;
use crate::falsifier::{Falsifier, TryStatus, errors_equivalent};
use crate::sample::FalsificationResult;
use crate::shrinkable::{Shrinkable, Value};

/// Called once per falsifier invocation
pub type AttemptCounter<'a> = &'a mut dyn FnMut();

/// Called with every accepted improvement
pub type StepReporter<'a, T> = &'a mut dyn FnMut(&FalsificationResult<T>);

trait Steps<T> {
    fn current(&self) -> FalsificationResult<T>;
    fn next(&mut self, count: AttemptCounter<'_>, report: StepReporter<'_, T>) -> bool;
}

/// The best result found so far plus a way to look for a better one
pub struct ShrinkingSequence<T> {
    steps: Box<dyn Steps<T>>,
}

impl<T: Value> ShrinkingSequence<T> {
    /// Search the candidates of `start` for smaller values that still falsify.
    ///
    /// Invalid candidates are not dead ends: when no direct candidate falsifies, their
    /// own candidates are searched, up to
    /// [`MAX_FILTER_SEARCH_DEPTH`](crate::config::MAX_FILTER_SEARCH_DEPTH) levels deep.
    pub fn deep_search(start: Shrinkable<T>, falsifier: Falsifier<T>) -> Self
    where
        T: Eq + Hash,
    {
        let initial = falsifier.execute(&start.value());
        let visited = HashSet::from([start.value()]);
        let current = FalsificationResult::new(start, initial);
        Self {
            steps: Box::new(DeepSearch {
                current,
                falsifier,
                visited,
            }),
        }
    }

    /// A sequence that never improves on `result`
    pub fn done(result: FalsificationResult<T>) -> Self {
        Self {
            steps: Box::new(Done { result }),
        }
    }

    /// The best result found so far
    pub fn current(&self) -> FalsificationResult<T> {
        self.steps.current()
    }

    /// Try to improve once; `true` if the current result changed
    pub fn next(&mut self, count: AttemptCounter<'_>, report: StepReporter<'_, T>) -> bool {
        self.steps.next(count, report)
    }

    /// Step until no further improvement is possible
    pub fn run_to_end(mut self) -> FalsificationResult<T> {
        while self.next(&mut || {}, &mut |_| {}) {}
        self.current()
    }

    /// Transform every result of this sequence
    pub fn map<U: Value>(
        self,
        f: impl Fn(&FalsificationResult<T>) -> FalsificationResult<U> + 'static,
    ) -> ShrinkingSequence<U> {
        ShrinkingSequence {
            steps: Box::new(Mapped { source: self, f }),
        }
    }

    /// After every improvement of this sequence, continue with the sequence `f` builds
    /// from the new result; its results become the results of the combined sequence
    pub fn flat_map<U: Value>(
        self,
        f: impl Fn(&FalsificationResult<T>) -> ShrinkingSequence<U> + 'static,
    ) -> ShrinkingSequence<U> {
        let inner = f(&self.current());
        ShrinkingSequence {
            steps: Box::new(FlatMapped {
                outer: self,
                inner,
                f,
            }),
        }
    }

    /// When this sequence cannot improve any more, continue with the sequence `then`
    /// builds from the final result
    pub fn and_then(
        self,
        then: impl FnOnce(FalsificationResult<T>) -> ShrinkingSequence<T> + 'static,
    ) -> ShrinkingSequence<T> {
        ShrinkingSequence {
            steps: Box::new(AndThen {
                first: self,
                then: Some(Box::new(then)),
                second: None,
            }),
        }
    }
}

struct Done<T> {
    result: FalsificationResult<T>,
}

impl<T: Value> Steps<T> for Done<T> {
    fn current(&self) -> FalsificationResult<T> {
        self.result.clone()
    }

    fn next(&mut self, _count: AttemptCounter<'_>, _report: StepReporter<'_, T>) -> bool {
        false
    }
}

struct DeepSearch<T> {
    current: FalsificationResult<T>,
    falsifier: Falsifier<T>,
    visited: HashSet<T>,
}

impl<T: Value> DeepSearch<T> {
    fn accepts(&self, candidate: &FalsificationResult<T>) -> bool {
        candidate.status() == TryStatus::Falsified
            && errors_equivalent(self.current.error(), candidate.error())
    }
}

impl<T: Value + Eq + Hash> Steps<T> for DeepSearch<T> {
    fn current(&self) -> FalsificationResult<T> {
        self.current.clone()
    }

    fn next(&mut self, count: AttemptCounter<'_>, report: StepReporter<'_, T>) -> bool {
        let limit = self.current.distance();
        let mut level = vec![self.current.shrinkable().clone()];

        for _ in 0..MAX_FILTER_SEARCH_DEPTH {
            let mut invalid = Vec::new();
            for base in &level {
                for candidate in base.shrink() {
                    if candidate.distance() > limit {
                        continue;
                    }
                    let value = candidate.value();
                    if self.visited.contains(&value) {
                        continue;
                    }
                    count();
                    let result = self.falsifier.execute(&value);
                    self.visited.insert(value);
                    let result = FalsificationResult::new(candidate.clone(), result);
                    if self.accepts(&result) {
                        debug!("shrinking step accepted: {:?}", result.value());
                        report(&result);
                        self.current = result;
                        return true;
                    }
                    if result.status() == TryStatus::Invalid {
                        invalid.push(candidate);
                    }
                }
            }
            if invalid.is_empty() {
                return false;
            }
            level = invalid;
        }
        false
    }
}

struct Mapped<T, F> {
    source: ShrinkingSequence<T>,
    f: F,
}

impl<T, U, F> Steps<U> for Mapped<T, F>
where
    T: Value,
    U: Value,
    F: Fn(&FalsificationResult<T>) -> FalsificationResult<U>,
{
    fn current(&self) -> FalsificationResult<U> {
        (self.f)(&self.source.current())
    }

    fn next(&mut self, count: AttemptCounter<'_>, report: StepReporter<'_, U>) -> bool {
        let f = &self.f;
        self.source
            .next(count, &mut |result: &FalsificationResult<T>| report(&f(result)))
    }
}

struct FlatMapped<T, U, F> {
    outer: ShrinkingSequence<T>,
    inner: ShrinkingSequence<U>,
    f: F,
}

impl<T, U, F> Steps<U> for FlatMapped<T, U, F>
where
    T: Value,
    U: Value,
    F: Fn(&FalsificationResult<T>) -> ShrinkingSequence<U>,
{
    fn current(&self) -> FalsificationResult<U> {
        self.inner.current()
    }

    fn next(&mut self, count: AttemptCounter<'_>, report: StepReporter<'_, U>) -> bool {
        if self.inner.next(&mut *count, &mut *report) {
            return true;
        }
        if !self.outer.next(&mut *count, &mut |_| {}) {
            return false;
        }
        self.inner = (self.f)(&self.outer.current());
        report(&self.inner.current());
        true
    }
}

type Continuation<T> = Box<dyn FnOnce(FalsificationResult<T>) -> ShrinkingSequence<T>>;

struct AndThen<T> {
    first: ShrinkingSequence<T>,
    then: Option<Continuation<T>>,
    second: Option<ShrinkingSequence<T>>,
}

impl<T: Value> Steps<T> for AndThen<T> {
    fn current(&self) -> FalsificationResult<T> {
        match &self.second {
            Some(second) => second.current(),
            None => self.first.current(),
        }
    }

    fn next(&mut self, count: AttemptCounter<'_>, report: StepReporter<'_, T>) -> bool {
        if self.second.is_none() {
            if self.first.next(&mut *count, &mut *report) {
                return true;
            }
            let Some(then) = self.then.take() else {
                return false;
            };
            self.second = Some(then(self.first.current()));
        }
        match self.second.as_mut() {
            Some(second) => second.next(count, report),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shrinkable::IntegralShrinkable;

    #[test]
    fn test_deep_search_shrinks_to_boundary() {
        let start = IntegralShrinkable::shrinkable(77i32, -100, 100, 0);
        let sequence = start.shrink_with(Falsifier::predicate(|x: &i32| *x < 5));
        let result = sequence.run_to_end();
        assert_eq!(result.value(), 5);
        assert_eq!(result.status(), TryStatus::Falsified);
    }

    #[test]
    fn test_next_counts_attempts_and_reports_steps() {
        let start = IntegralShrinkable::shrinkable(30i32, 0, 100, 0);
        let mut sequence = start.shrink_with(Falsifier::predicate(|x: &i32| *x < 10));
        let mut attempts = 0;
        let mut steps = Vec::new();
        while sequence.next(&mut || attempts += 1, &mut |r| steps.push(r.value())) {}

        assert_eq!(sequence.current().value(), 10);
        assert!(attempts >= steps.len());
        assert_eq!(steps.last(), Some(&10));
    }

    #[test]
    fn test_deep_search_passes_invalid_candidates() {
        // everything strictly between 4 and 10 is invalid, so 4 hides behind 5 or 7
        let falsifier = Falsifier::<i32>::predicate(|x| *x < 4).with_filter(|x| *x <= 4 || *x == 10);
        let start = IntegralShrinkable::shrinkable(10i32, 0, 100, 0);
        let result = start.shrink_with(falsifier).run_to_end();
        assert_eq!(result.value(), 4);
    }

    #[test]
    fn test_values_printing_alike_are_still_searched() {
        #[derive(Clone, PartialEq, Eq, Hash)]
        struct Opaque(i32);

        impl std::fmt::Debug for Opaque {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "Opaque")
            }
        }

        let start = IntegralShrinkable::shrinkable(50i32, 0, 100, 0).map(Opaque);
        let result = start
            .shrink_with(Falsifier::predicate(|x: &Opaque| x.0 < 20))
            .run_to_end();
        assert_eq!(result.value(), Opaque(20));
    }

    #[test]
    fn test_map() {
        let start = IntegralShrinkable::shrinkable(50i32, 0, 100, 0);
        let sequence = start
            .shrink_with(Falsifier::predicate(|x: &i32| *x < 20))
            .map(|r| r.map(|s| s.map(|v| v.to_string())));
        assert_eq!(sequence.run_to_end().value(), "20");
    }

    #[test]
    fn test_and_then_continues_from_final_result() {
        let start = IntegralShrinkable::shrinkable(50i32, 0, 100, 0);
        let sequence = start
            .shrink_with(Falsifier::predicate(|x: &i32| *x < 20))
            .and_then(|result| {
                // a stricter falsifier continues where the first one stopped
                let shrinkable = result.shrinkable().clone();
                assert_eq!(shrinkable.value(), 20);
                shrinkable.shrink_with(Falsifier::predicate(|x: &i32| *x < 15 || *x % 2 == 1))
            });
        assert_eq!(sequence.run_to_end().value(), 16);
    }

    #[test]
    fn test_flat_map_follows_outer_steps() {
        let start = IntegralShrinkable::shrinkable(8i32, 0, 10, 0);
        let sequence = start
            .shrink_with(Falsifier::predicate(|x: &i32| *x < 3))
            .flat_map(|outer| {
                ShrinkingSequence::done(outer.map(|s| s.map(|v| vec![0u8; v as usize])))
            });
        assert_eq!(sequence.run_to_end().value().len(), 3);
    }

    #[test]
    fn test_done_never_improves() {
        let result = FalsificationResult::falsified(Shrinkable::unshrinkable(1), None);
        let mut sequence = ShrinkingSequence::done(result);
        assert!(!sequence.next(&mut || {}, &mut |_| {}));
        assert_eq!(sequence.current().value(), 1);
    }
}
