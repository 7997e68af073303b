//! Orchestrates a registry of checks into a report

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use super::concurrent::ConcurrentRunner;
use super::executor::CheckExecutor;
use super::registry::CheckRegistry;
use super::report::Report;
use crate::document::DocumentStore;

/// Runs every registered check and aggregates the results
#[derive(Debug, Clone)]
pub struct AuditRunner {
    suite: String,
    registry: CheckRegistry,
    executor: CheckExecutor,
    concurrent: bool,
}

impl AuditRunner {
    /// Creates a sequential runner with a default executor
    pub fn new(suite: impl Into<String>, registry: CheckRegistry) -> Self {
        Self {
            suite: suite.into(),
            registry,
            executor: CheckExecutor::new(),
            concurrent: false,
        }
    }

    pub fn with_executor(mut self, executor: CheckExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Runs checks on parallel workers; result order becomes completion order
    pub fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Runs all registered checks and returns a report
    pub fn run(&self, store: &Arc<DocumentStore>) -> Report {
        info!(
            suite = %self.suite,
            checks = self.registry.len(),
            documents = store.len(),
            concurrent = self.concurrent,
            "Starting checks"
        );
        let started = Instant::now();

        let checks = self.registry.checks();
        let results = if self.concurrent {
            ConcurrentRunner::new(self.executor.clone()).run_concurrently(&checks, store)
        } else {
            checks
                .iter()
                .map(|check| self.executor.execute(check, store))
                .collect()
        };

        let report = Report::aggregate(self.suite.clone(), results);
        info!(
            suite = %self.suite,
            passed = report.summary.passed_tests,
            failed = report.summary.failed_tests,
            wall_ms = started.elapsed().as_millis() as u64,
            "Checks finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::check::{CheckOutcome, FnCheck};
    use crate::document::DocumentStore;

    fn pass(_: &DocumentStore) -> anyhow::Result<CheckOutcome> {
        Ok(CheckOutcome::pass("ok"))
    }

    fn explode(_: &DocumentStore) -> anyhow::Result<CheckOutcome> {
        panic!("programming error inside a check")
    }

    fn registry() -> CheckRegistry {
        CheckRegistry::new()
            .add_check(FnCheck::new("check_c", pass))
            .and_then(|r| r.add_check(FnCheck::new("check_a", explode)))
            .and_then(|r| r.add_check(FnCheck::new("check_b", pass)))
            .unwrap()
    }

    #[test]
    fn test_sequential_run_keeps_registry_order() {
        let report = AuditRunner::new("suite", registry()).run(&Arc::new(DocumentStore::new()));
        let names: Vec<_> = report.test_results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["check_a", "check_b", "check_c"]);
    }

    #[test]
    fn test_faulting_check_does_not_abort_run() {
        for concurrent in [false, true] {
            let report = AuditRunner::new("suite", registry())
                .concurrent(concurrent)
                .run(&Arc::new(DocumentStore::new()));

            assert_eq!(report.summary.total_tests, 3);
            assert_eq!(report.summary.failed_tests, 1);
            let faulted = report.test_results.iter().find(|r| r.name == "check_a").unwrap();
            assert!(!faulted.passed);
            assert_eq!(report.exit_code(), 1);
        }
    }

    #[test]
    fn test_empty_registry_reports_nothing() {
        let report = AuditRunner::new("suite", CheckRegistry::new()).run(&Arc::new(DocumentStore::new()));
        assert_eq!(report.summary.total_tests, 0);
        assert_eq!(report.summary.success_rate, 0.0);
        assert_eq!(report.exit_code(), 0);
    }
}
