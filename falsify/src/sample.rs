//! Falsified samples and falsification results.

use std::fmt;

use crate::distance::ShrinkingDistance;
use crate::falsifier::{TryError, TryExecutionResult, TryStatus};
use crate::shrinkable::{Shrinkable, Value};

/// A shrinkable together with the outcome of falsifying its value
pub struct FalsificationResult<T> {
    shrinkable: Shrinkable<T>,
    result: TryExecutionResult,
}

impl<T> Clone for FalsificationResult<T> {
    fn clone(&self) -> Self {
        Self {
            shrinkable: self.shrinkable.clone(),
            result: self.result.clone(),
        }
    }
}

impl<T: Value> FalsificationResult<T> {
    pub fn new(shrinkable: Shrinkable<T>, result: TryExecutionResult) -> Self {
        Self { shrinkable, result }
    }

    /// A falsified result carrying `error`
    pub fn falsified(shrinkable: Shrinkable<T>, error: Option<TryError>) -> Self {
        Self::new(shrinkable, TryExecutionResult::falsified(error))
    }

    pub fn value(&self) -> T {
        self.shrinkable.value()
    }

    pub fn shrinkable(&self) -> &Shrinkable<T> {
        &self.shrinkable
    }

    pub fn status(&self) -> TryStatus {
        self.result.status()
    }

    pub fn error(&self) -> Option<&TryError> {
        self.result.error()
    }

    pub fn result(&self) -> &TryExecutionResult {
        &self.result
    }

    pub fn distance(&self) -> ShrinkingDistance {
        self.shrinkable.distance()
    }

    /// Transform the shrinkable, keeping status and error
    pub fn map<U: Value>(&self, f: impl FnOnce(Shrinkable<T>) -> Shrinkable<U>) -> FalsificationResult<U> {
        FalsificationResult::new(f(self.shrinkable.clone()), self.result.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for FalsificationResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FalsificationResult")
            .field("shrinkable", &self.shrinkable)
            .field("status", &self.result.status())
            .finish()
    }
}

/// The parameters of one falsifying try, their shrinkables and the causing error
pub struct FalsifiedSample<P> {
    parameters: Vec<P>,
    shrinkables: Vec<Shrinkable<P>>,
    error: Option<TryError>,
    footnotes: Vec<String>,
}

impl<P: Clone> Clone for FalsifiedSample<P> {
    fn clone(&self) -> Self {
        Self {
            parameters: self.parameters.clone(),
            shrinkables: self.shrinkables.clone(),
            error: self.error.clone(),
            footnotes: self.footnotes.clone(),
        }
    }
}

impl<P: Value> FalsifiedSample<P> {
    /// A sample whose parameters are the current values of `shrinkables`
    pub fn new(shrinkables: Vec<Shrinkable<P>>, error: Option<TryError>, footnotes: Vec<String>) -> Self {
        let parameters = shrinkables.iter().map(Shrinkable::value).collect();
        Self {
            parameters,
            shrinkables,
            error,
            footnotes,
        }
    }

    pub(crate) fn from_result(shrinkables: Vec<Shrinkable<P>>, parameters: Vec<P>, result: &TryExecutionResult) -> Self {
        Self {
            parameters,
            shrinkables,
            error: result.error().cloned(),
            footnotes: result.footnotes().to_vec(),
        }
    }

    pub fn parameters(&self) -> &[P] {
        &self.parameters
    }

    pub fn shrinkables(&self) -> &[Shrinkable<P>] {
        &self.shrinkables
    }

    pub fn error(&self) -> Option<&TryError> {
        self.error.as_ref()
    }

    pub fn footnotes(&self) -> &[String] {
        &self.footnotes
    }

    /// Concatenated distances of all parameters
    pub fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::combine(&self.shrinkables)
    }

    /// Number of parameters
    pub fn size(&self) -> usize {
        self.parameters.len()
    }
}

impl<P: fmt::Debug> fmt::Debug for FalsifiedSample<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FalsifiedSample")
            .field("parameters", &self.parameters)
            .field("error", &self.error)
            .field("footnotes", &self.footnotes)
            .finish()
    }
}

/// The result of shrinking a falsified sample
#[derive(Debug, Clone)]
pub struct ShrunkFalsifiedSample<P> {
    sample: FalsifiedSample<P>,
    steps: usize,
    statuses: Vec<TryStatus>,
    completed: bool,
}

impl<P: Value> ShrunkFalsifiedSample<P> {
    pub(crate) fn new(
        sample: FalsifiedSample<P>,
        steps: usize,
        statuses: Vec<TryStatus>,
        completed: bool,
    ) -> Self {
        Self {
            sample,
            steps,
            statuses,
            completed,
        }
    }

    /// A sample that was not shrunk
    pub fn unshrunk(sample: FalsifiedSample<P>) -> Self {
        Self::new(sample, 0, Vec::new(), true)
    }

    pub fn sample(&self) -> &FalsifiedSample<P> {
        &self.sample
    }

    pub fn into_sample(self) -> FalsifiedSample<P> {
        self.sample
    }

    pub fn parameters(&self) -> &[P] {
        self.sample.parameters()
    }

    /// Number of accepted shrinking steps
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Status of every falsifier invocation, in order
    pub fn shrinking_sequence(&self) -> &[TryStatus] {
        &self.statuses
    }

    /// Whether shrinking ran to a fixed point rather than stopping at its attempt budget
    pub fn completed(&self) -> bool {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shrinkable::IntegralShrinkable;

    #[test]
    fn test_sample_parameters_follow_shrinkables() {
        let sample = FalsifiedSample::new(
            vec![
                IntegralShrinkable::shrinkable(3i64, 0, 10, 0),
                IntegralShrinkable::shrinkable(7i64, 0, 10, 0),
            ],
            None,
            Vec::new(),
        );
        assert_eq!(sample.parameters(), &[3, 7]);
        assert_eq!(sample.size(), 2);
        assert_eq!(sample.distance(), ShrinkingDistance::of(&[3, 7]));
    }

    #[test]
    fn test_falsification_result_map() {
        let result = FalsificationResult::falsified(
            IntegralShrinkable::shrinkable(4i32, 0, 10, 0),
            Some(TryError::unlocated("assertion", "boom")),
        );
        let mapped = result.map(|s| s.map(|v| v * 2));
        assert_eq!(mapped.value(), 8);
        assert_eq!(mapped.status(), TryStatus::Falsified);
        assert_eq!(mapped.error().map(|e| e.message()), Some("boom"));
    }

    #[test]
    fn test_unshrunk_sample() {
        let sample = FalsifiedSample::new(vec![Shrinkable::unshrinkable(1)], None, Vec::new());
        let shrunk = ShrunkFalsifiedSample::unshrunk(sample);
        assert_eq!(shrunk.steps(), 0);
        assert!(shrunk.shrinking_sequence().is_empty());
        assert_eq!(shrunk.parameters(), &[1]);
    }
}
