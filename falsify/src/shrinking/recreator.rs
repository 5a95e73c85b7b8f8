use std::collections::VecDeque;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use super::shrink_sample;
use crate::falsifier::{Falsifier, TryExecutionResult, TryStatus};
use crate::sample::FalsifiedSample;
use crate::shrinkable::Value;

/// Rebuilds a shrunk sample from the recorded statuses of a previous shrinking run.
///
/// Shrinking is deterministic given the falsifier's answers, so replaying the recorded
/// [`TryStatus`] list instead of running the property walks the same path and ends at
/// the same sample.
pub struct ShrunkSampleRecreator<P> {
    original: FalsifiedSample<P>,
}

impl<P> ShrunkSampleRecreator<P>
where
    P: Value + Eq + Hash,
{
    /// Prepare recreation starting from the original falsified sample
    pub fn new(original: FalsifiedSample<P>) -> Self {
        Self { original }
    }

    /// Replay `statuses`; `None` if they do not describe a shrinking run of this sample
    pub fn recreate(&self, statuses: &[TryStatus]) -> Option<FalsifiedSample<P>> {
        let remaining = Arc::new(Mutex::new(statuses.iter().copied().collect::<VecDeque<_>>()));
        let error = self.original.error().cloned();
        let replay = Arc::clone(&remaining);
        let falsifier = Falsifier::new(move |_: &Vec<P>| {
            let next = replay.lock().ok().and_then(|mut queue| queue.pop_front());
            match next {
                Some(TryStatus::Falsified) => TryExecutionResult::falsified(error.clone()),
                Some(TryStatus::Satisfied) => TryExecutionResult::satisfied(),
                Some(TryStatus::Invalid) | None => TryExecutionResult::invalid(),
            }
        });

        let shrunk = shrink_sample(
            self.original.clone(),
            &falsifier,
            Some(statuses.len()),
            &mut |_| {},
            &mut |_| {},
        );
        let consumed = remaining.lock().map(|queue| queue.is_empty()).unwrap_or(false);
        consumed.then(|| shrunk.into_sample())
    }
}
