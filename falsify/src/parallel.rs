//! Running independent property checks on several threads.
//!
//! Every check keeps its own generator and shrinking search; only whole checks are
//! distributed across workers.

use std::hash::Hash;

use log::debug;

use crate::check::{CheckResult, PropertyCheck};
use crate::error::{Error, Result};
use crate::shrinkable::Value;

/// Configuration for parallel execution
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of threads to use
    pub num_threads: usize,
    /// Run on the calling thread when disabled
    pub enabled: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            enabled: true,
        }
    }
}

impl ParallelConfig {
    pub fn sequential() -> Self {
        Self {
            num_threads: 1,
            enabled: false,
        }
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }
}

/// Run all `checks`, returning their results in the order of `checks`
pub fn run_all<P>(checks: &[PropertyCheck<P>], config: &ParallelConfig) -> Vec<Result<CheckResult<P>>>
where
    P: Value + Eq + Hash,
{
    let num_threads = config.num_threads.min(checks.len());
    if !config.enabled || num_threads <= 1 {
        return checks.iter().map(PropertyCheck::run).collect();
    }
    debug!("Running {} checks on {} threads", checks.len(), num_threads);

    let scoped = crossbeam::scope(|s| {
        let handles: Vec<_> = (0..num_threads)
            .map(|worker| {
                s.spawn(move |_| {
                    checks
                        .iter()
                        .enumerate()
                        .skip(worker)
                        .step_by(num_threads)
                        .map(|(index, check)| (index, check.run()))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut results: Vec<Option<Result<CheckResult<P>>>> = (0..checks.len()).map(|_| None).collect();
        for handle in handles {
            // Indices left empty belong to a worker that panicked
            if let Ok(finished) = handle.join() {
                for (index, result) in finished {
                    results[index] = Some(result);
                }
            }
        }
        results
    });

    match scoped {
        Ok(results) => results
            .into_iter()
            .zip(checks)
            .map(|(result, check)| result.unwrap_or_else(|| Err(panicked(check))))
            .collect(),
        Err(_) => checks.iter().map(|check| Err(panicked(check))).collect(),
    }
}

fn panicked<P: Value + Eq + Hash>(check: &PropertyCheck<P>) -> Error {
    Error::WorkerPanicked {
        check: check.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitraries;
    use crate::arbitrary::Arbitrary;
    use crate::check::CheckStatus;
    use crate::config::CheckConfig;
    use crate::falsifier::Falsifier;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn below(limit: i32, seed: u64) -> PropertyCheck<i32> {
        PropertyCheck::new(
            format!("below {}", limit),
            vec![arbitraries::integers::<i32>().between(0, 1000).boxed()],
            Falsifier::predicate(move |values: &Vec<i32>| values[0] < limit),
        )
        .with_config(CheckConfig::default().with_tries(100).with_seed(seed))
    }

    #[test]
    fn test_results_keep_check_order() {
        let checks: Vec<_> = (0..8).map(|i| below(if i % 2 == 0 { 2000 } else { 10 }, i as u64)).collect();
        let results = run_all(&checks, &ParallelConfig::default().with_threads(3));
        assert_eq!(results.len(), 8);
        for (i, result) in results.into_iter().enumerate() {
            let result = result.unwrap();
            assert_eq!(result.name, checks[i].name());
            if i % 2 == 0 {
                assert_eq!(result.status, CheckStatus::Satisfied);
            } else {
                assert_eq!(result.status, CheckStatus::Falsified);
                assert_eq!(result.shrunk_sample.unwrap().parameters(), &[10]);
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let checks: Vec<_> = (0..4).map(|i| below(500, i)).collect();
        let parallel = run_all(&checks, &ParallelConfig::default().with_threads(4));
        let sequential = run_all(&checks, &ParallelConfig::sequential());
        for (a, b) in parallel.into_iter().zip(sequential) {
            let (a, b) = (a.unwrap(), b.unwrap());
            assert_eq!(a.status, b.status);
            assert_eq!(a.tries, b.tries);
            assert_eq!(
                a.shrunk_sample.map(|s| s.parameters().to_vec()),
                b.shrunk_sample.map(|s| s.parameters().to_vec())
            );
        }
    }

    #[test]
    fn test_every_check_runs_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let checks: Vec<_> = (0..5)
            .map(|i| {
                let counter = Arc::clone(&counter);
                PropertyCheck::new(
                    format!("count {}", i),
                    vec![arbitraries::just(i).boxed()],
                    Falsifier::predicate(move |_: &Vec<i32>| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        true
                    }),
                )
                .with_config(CheckConfig::default().with_tries(10))
            })
            .collect();
        let results = run_all(&checks, &ParallelConfig::default().with_threads(2));
        assert!(results.iter().all(|r| r.as_ref().is_ok_and(|r| r.is_satisfied())));
        // `just` enumerates a single value, so each check tries once
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_panicking_generation_is_reported() {
        let exploding = arbitraries::integers::<i32>()
            .between(0, 10)
            .map(|_| -> i32 { panic!("generation failed") })
            .boxed();
        let checks = vec![
            below(2000, 1),
            PropertyCheck::new("exploding", vec![exploding], Falsifier::predicate(|_: &Vec<i32>| true))
                .with_config(CheckConfig::default().with_tries(10)),
        ];
        let results = run_all(&checks, &ParallelConfig::default().with_threads(2));
        assert!(results[0].is_ok());
        assert!(matches!(&results[1], Err(Error::WorkerPanicked { check }) if check == "exploding"));
    }
}
