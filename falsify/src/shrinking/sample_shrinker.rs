use std::collections::HashMap;
use std::hash::Hash;

use log::debug;

use super::SampleReporter;
use crate::distance::ShrinkingDistance;
use crate::falsifier::{Falsifier, TryExecutionResult, TryStatus};
use crate::sample::{FalsifiedSample, ShrunkFalsifiedSample};
use crate::shrinkable::{Shrinkable, Value};

/// Invalid candidates remembered for backtracking
const MAX_FILTERED_RESULTS: usize = 100;

/// The attempt budget of bounded shrinking is used up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct BoundReached;

pub(super) type Candidate<P> = Vec<Shrinkable<P>>;

pub(super) type CandidateStream<P> = Box<dyn Iterator<Item = Candidate<P>>>;

/// Proposes candidates derived from a list of parameter shrinkables
pub(super) trait Strategy<P> {
    fn candidates(&self, base: &[Shrinkable<P>]) -> CandidateStream<P>;
}

/// Invalid candidates closer to the target than the best sample, smallest first
struct FilteredResults<P> {
    entries: Vec<(ShrinkingDistance, Candidate<P>)>,
}

impl<P> FilteredResults<P> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn push(&mut self, distance: ShrinkingDistance, candidate: Candidate<P>) {
        let position = self
            .entries
            .partition_point(|(existing, _)| *existing <= distance);
        self.entries.insert(position, (distance, candidate));
        self.entries.truncate(MAX_FILTERED_RESULTS);
    }

    fn pop_below(&mut self, limit: &ShrinkingDistance) -> Option<Candidate<P>> {
        match self.entries.first() {
            Some((distance, _)) if distance < limit => Some(self.entries.remove(0).1),
            _ => None,
        }
    }
}

/// State of one shrinking run: the best sample so far, the falsification cache and the
/// attempt bookkeeping
pub(super) struct SampleShrinker<'a, P> {
    falsifier: Falsifier<Vec<P>>,
    cache: HashMap<Vec<P>, TryExecutionResult>,
    statuses: Vec<TryStatus>,
    attempts: usize,
    budget: Option<usize>,
    steps: usize,
    best: FalsifiedSample<P>,
    on_step: SampleReporter<'a, P>,
    on_attempt: SampleReporter<'a, P>,
}

impl<'a, P> SampleShrinker<'a, P>
where
    P: Value + Eq + Hash,
{
    pub(super) fn new(
        original: FalsifiedSample<P>,
        falsifier: Falsifier<Vec<P>>,
        budget: Option<usize>,
        on_step: SampleReporter<'a, P>,
        on_attempt: SampleReporter<'a, P>,
    ) -> Self {
        let mut cache = HashMap::new();
        cache.insert(
            original.parameters().to_vec(),
            TryExecutionResult::falsified(original.error().cloned()),
        );
        Self {
            falsifier,
            cache,
            statuses: Vec::new(),
            attempts: 0,
            budget,
            steps: 0,
            best: original,
            on_step,
            on_attempt,
        }
    }

    pub(super) fn best(&self) -> &FalsifiedSample<P> {
        &self.best
    }

    pub(super) fn finish(self, completed: bool) -> ShrunkFalsifiedSample<P> {
        ShrunkFalsifiedSample::new(self.best, self.steps, self.statuses, completed)
    }

    /// Apply `strategy` to the best sample until it finds no improvement.
    ///
    /// With `strict`, only candidates with a strictly smaller distance are considered.
    /// Returns whether the best sample changed.
    pub(super) fn shrink_with(
        &mut self,
        strategy: &dyn Strategy<P>,
        strict: bool,
    ) -> Result<bool, BoundReached> {
        let mut improved = false;
        let mut filtered = FilteredResults::new();
        let mut base = self.best.shrinkables().to_vec();
        loop {
            match self.first_falsifying(strategy.candidates(&base), strict, &mut filtered)? {
                Some(sample) => {
                    self.accept(sample);
                    base = self.best.shrinkables().to_vec();
                    improved = true;
                }
                None => match filtered.pop_below(&self.best.distance()) {
                    Some(invalid) => base = invalid,
                    None => return Ok(improved),
                },
            }
        }
    }

    fn first_falsifying(
        &mut self,
        candidates: CandidateStream<P>,
        strict: bool,
        filtered: &mut FilteredResults<P>,
    ) -> Result<Option<FalsifiedSample<P>>, BoundReached> {
        let limit = self.best.distance();
        for candidate in candidates {
            let distance = ShrinkingDistance::combine(&candidate);
            if distance > limit || (strict && distance == limit) {
                continue;
            }
            let parameters: Vec<P> = candidate.iter().map(Shrinkable::value).collect();
            if self.cache.contains_key(&parameters) {
                continue;
            }
            let result = self.falsify(parameters.clone())?;
            let sample = FalsifiedSample::from_result(candidate, parameters, &result);
            match result.status() {
                TryStatus::Falsified => return Ok(Some(sample)),
                TryStatus::Invalid if distance < limit => {
                    filtered.push(distance, sample.shrinkables().to_vec());
                    (self.on_attempt)(&sample);
                }
                _ => (self.on_attempt)(&sample),
            }
        }
        Ok(None)
    }

    fn falsify(&mut self, parameters: Vec<P>) -> Result<TryExecutionResult, BoundReached> {
        if let Some(budget) = self.budget
            && self.attempts >= budget
        {
            return Err(BoundReached);
        }
        self.attempts += 1;
        let result = self.falsifier.execute(&parameters);
        self.statuses.push(result.status());
        self.cache.insert(parameters, result.clone());
        Ok(result)
    }

    fn accept(&mut self, sample: FalsifiedSample<P>) {
        self.steps += 1;
        debug!(
            "shrinking step {} accepted: {:?}",
            self.steps,
            sample.parameters()
        );
        (self.on_step)(&sample);
        self.best = sample;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shrinkable::IntegralShrinkable;

    struct OnlyFirst;

    impl Strategy<i32> for OnlyFirst {
        fn candidates(&self, base: &[Shrinkable<i32>]) -> CandidateStream<i32> {
            let rest = base[1..].to_vec();
            Box::new(base[0].shrink().map(move |first| {
                let mut candidate = vec![first];
                candidate.extend(rest.iter().cloned());
                candidate
            }))
        }
    }

    fn sample(values: &[i32]) -> FalsifiedSample<i32> {
        let shrinkables = values
            .iter()
            .map(|v| IntegralShrinkable::shrinkable(*v, 0, 100, 0))
            .collect();
        FalsifiedSample::new(shrinkables, None, Vec::new())
    }

    #[test]
    fn test_filtered_results_keep_smallest() {
        let mut filtered = FilteredResults::<i32>::new();
        for i in (0..150u64).rev() {
            filtered.push(ShrinkingDistance::of(&[i]), Vec::new());
        }
        assert_eq!(filtered.entries.len(), MAX_FILTERED_RESULTS);
        assert!(filtered.pop_below(&ShrinkingDistance::of(&[0])).is_none());
        assert!(filtered.pop_below(&ShrinkingDistance::of(&[1])).is_some());
        assert_eq!(filtered.entries[0].0, ShrinkingDistance::of(&[1]));
    }

    #[test]
    fn test_cache_prevents_repeated_evaluation() {
        let falsifier = Falsifier::predicate(|params: &Vec<i32>| params[0] < 10);
        let mut on_step = |_: &FalsifiedSample<i32>| {};
        let mut on_attempt = |_: &FalsifiedSample<i32>| {};
        let mut shrinker = SampleShrinker::new(sample(&[30, 1]), falsifier, None, &mut on_step, &mut on_attempt);

        assert_eq!(shrinker.shrink_with(&OnlyFirst, false), Ok(true));
        let evaluated = shrinker.statuses.len();
        assert_eq!(shrinker.shrink_with(&OnlyFirst, false), Ok(false));
        assert_eq!(shrinker.statuses.len(), evaluated);
        assert_eq!(shrinker.best().parameters(), &[10, 1]);
    }

    #[test]
    fn test_backtracks_through_invalid_candidates() {
        // only 0..=4 and 50 are valid, 4 falsifies; 4 is not a direct candidate of 50
        let falsifier = Falsifier::predicate(|params: &Vec<i32>| params[0] != 4)
            .with_filter(|params| params[0] <= 4 || params[0] == 50);
        let mut on_step = |_: &FalsifiedSample<i32>| {};
        let mut on_attempt = |_: &FalsifiedSample<i32>| {};
        let mut shrinker = SampleShrinker::new(sample(&[50]), falsifier, None, &mut on_step, &mut on_attempt);

        assert_eq!(shrinker.shrink_with(&OnlyFirst, false), Ok(true));
        assert_eq!(shrinker.best().parameters(), &[4]);
    }

    #[test]
    fn test_budget_raises_bound_reached() {
        let falsifier = Falsifier::predicate(|params: &Vec<i32>| params[0] < 10);
        let mut on_step = |_: &FalsifiedSample<i32>| {};
        let mut on_attempt = |_: &FalsifiedSample<i32>| {};
        let mut shrinker = SampleShrinker::new(sample(&[90]), falsifier, Some(2), &mut on_step, &mut on_attempt);

        assert_eq!(shrinker.shrink_with(&OnlyFirst, false), Err(BoundReached));
        assert_eq!(shrinker.statuses.len(), 2);
        assert_eq!(shrinker.best().parameters(), &[90]);
    }
}
