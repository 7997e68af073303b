//! Parallel execution of independent checks

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use tracing::{debug, warn};

use super::check::{Check, CheckResult};
use super::executor::CheckExecutor;
use crate::document::DocumentStore;

/// Runs every check on its own worker thread
///
/// Workers share the store read-only; the result list is the only shared
/// mutable state. Results come back in completion order.
#[derive(Debug, Clone, Default)]
pub struct ConcurrentRunner {
    executor: CheckExecutor,
}

impl ConcurrentRunner {
    pub fn new(executor: CheckExecutor) -> Self {
        Self { executor }
    }

    /// Executes all checks in parallel and blocks until every worker is done
    pub fn run_concurrently(
        &self,
        checks: &[Arc<dyn Check>],
        store: &Arc<DocumentStore>,
    ) -> Vec<CheckResult> {
        let results = Mutex::new(Vec::with_capacity(checks.len()));

        thread::scope(|scope| {
            for check in checks {
                let results = &results;
                let executor = &self.executor;
                let work = move || {
                    let result = executor.execute(check, store);
                    results
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(result);
                };

                let spawned = thread::Builder::new()
                    .name(format!("worker:{}", check.name()))
                    .spawn_scoped(scope, work);
                if let Err(e) = spawned {
                    warn!(check = check.name(), error = %e, "Worker spawn failed, running inline");
                    work();
                }
            }
            debug!(workers = checks.len(), "Waiting for check workers");
        });

        results.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::check::CheckOutcome;
    use std::collections::HashSet;
    use std::time::{Duration, Instant};

    struct NamedSleep {
        name: String,
        delay: Duration,
    }

    impl Check for NamedSleep {
        fn name(&self) -> &str {
            &self.name
        }

        fn run(&self, _store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
            thread::sleep(self.delay);
            if self.name.ends_with('7') {
                anyhow::bail!("unlucky worker");
            }
            Ok(CheckOutcome::pass(format!("{} done", self.name)))
        }
    }

    fn checks(count: usize, delay: Duration) -> Vec<Arc<dyn Check>> {
        (0..count)
            .map(|i| {
                Arc::new(NamedSleep {
                    name: format!("check_worker_{}", i),
                    delay,
                }) as Arc<dyn Check>
            })
            .collect()
    }

    #[test]
    fn test_every_check_reported_exactly_once() {
        let checks = checks(32, Duration::from_millis(5));
        let results = ConcurrentRunner::default().run_concurrently(&checks, &Arc::new(DocumentStore::new()));

        assert_eq!(results.len(), 32);
        let names: HashSet<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), 32);
        assert_eq!(results.iter().filter(|r| !r.passed).count(), 3); // 7, 17, 27
    }

    #[test]
    fn test_workers_overlap() {
        let checks = checks(8, Duration::from_millis(200));
        let started = Instant::now();
        let results = ConcurrentRunner::default().run_concurrently(&checks, &Arc::new(DocumentStore::new()));

        assert_eq!(results.len(), 8);
        assert!(started.elapsed() < Duration::from_millis(8 * 200));
    }

    #[test]
    fn test_empty_batch_yields_no_results() {
        let results = ConcurrentRunner::default().run_concurrently(&[], &Arc::new(DocumentStore::new()));
        assert!(results.is_empty());
    }
}
