//! Aggregation of check results into a report

use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::check::CheckResult;
use crate::build_info;

/// Summary statistics over a set of results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    /// `passed / total`, or 0 for an empty run
    pub success_rate: f64,
    /// Sum of execution times, in seconds
    pub total_execution_time: f64,
    /// Sum of memory deltas in bytes, when any result carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_memory_usage: Option<i64>,
    /// Mean CPU sample in percent, when any result carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_cpu_usage: Option<f64>,
}

impl Summary {
    /// Folds results into summary statistics
    ///
    /// Depends only on the multiset of results, never on their order.
    pub fn from_results(results: &[CheckResult]) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();

        let success_rate = if total > 0 {
            passed as f64 / total as f64
        } else {
            0.0
        };

        let total_time: Duration = results.iter().map(|r| r.execution_time).sum();

        let memory: Vec<i64> = results.iter().filter_map(|r| r.memory_delta).collect();
        let total_memory_usage = (!memory.is_empty()).then(|| memory.iter().sum());

        // Sorted before summing so float rounding cannot depend on completion order
        let mut cpu: Vec<f64> = results
            .iter()
            .filter_map(|r| r.cpu_sample.map(f64::from))
            .collect();
        cpu.sort_by(f64::total_cmp);
        let average_cpu_usage = (!cpu.is_empty()).then(|| cpu.iter().sum::<f64>() / cpu.len() as f64);

        Self {
            total_tests: total,
            passed_tests: passed,
            failed_tests: total - passed,
            success_rate,
            total_execution_time: total_time.as_secs_f64(),
            total_memory_usage,
            average_cpu_usage,
        }
    }
}

/// The outcome of one run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Run mode that produced the report
    #[serde(rename = "mode")]
    pub suite: String,
    pub summary: Summary,
    /// Per-check results; completion order when run concurrently
    pub test_results: Vec<CheckResult>,
    pub timestamp: DateTime<Local>,
    /// Version of the binary that produced the report
    pub build: String,
}

impl Report {
    /// Builds a report stamped with the current time
    pub fn aggregate(suite: impl Into<String>, results: Vec<CheckResult>) -> Self {
        Self {
            suite: suite.into(),
            summary: Summary::from_results(&results),
            test_results: results,
            timestamp: Local::now(),
            build: build_info::version_string(),
        }
    }

    /// Returns true if no check failed
    pub fn is_successful(&self) -> bool {
        self.summary.failed_tests == 0
    }

    /// Process exit code for this report: 0 = all pass, 1 = any failure
    pub fn exit_code(&self) -> i32 {
        if self.is_successful() { 0 } else { 1 }
    }

    /// Results that did not pass
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.test_results.iter().filter(|r| !r.passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::check::CheckOutcome;

    fn result(name: &str, passed: bool, millis: u64) -> CheckResult {
        CheckResult::from_outcome(name, CheckOutcome::verdict(passed, name), Duration::from_millis(millis))
    }

    fn mixed() -> Vec<CheckResult> {
        vec![
            result("check_a", true, 120).with_resources(Some(2048), Some(10.0)),
            result("check_b", false, 30).with_resources(Some(-1024), Some(30.0)),
            result("check_c", true, 7).with_resources(None, Some(5.0)),
        ]
    }

    #[test]
    fn test_empty_run_has_zero_success_rate() {
        let summary = Summary::from_results(&[]);
        assert_eq!(summary.total_tests, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.total_execution_time, 0.0);
        assert_eq!(summary.total_memory_usage, None);
        assert_eq!(summary.average_cpu_usage, None);
    }

    #[test]
    fn test_counts_and_totals() {
        let summary = Summary::from_results(&mixed());
        assert_eq!(summary.total_tests, 3);
        assert_eq!(summary.passed_tests, 2);
        assert_eq!(summary.failed_tests, 1);
        assert_eq!(summary.passed_tests + summary.failed_tests, summary.total_tests);
        assert!((summary.success_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((summary.total_execution_time - 0.157).abs() < 1e-9);
        assert_eq!(summary.total_memory_usage, Some(1024));
        assert_eq!(summary.average_cpu_usage, Some(15.0));
    }

    #[test]
    fn test_summary_is_idempotent_and_order_independent() {
        let forward = mixed();
        let mut reversed = mixed();
        reversed.reverse();

        let first = serde_json::to_string(&Summary::from_results(&forward)).unwrap();
        let again = serde_json::to_string(&Summary::from_results(&forward)).unwrap();
        let flipped = serde_json::to_string(&Summary::from_results(&reversed)).unwrap();

        assert_eq!(first, again);
        assert_eq!(first, flipped);
    }

    #[test]
    fn test_exit_code_follows_failures() {
        let passing = Report::aggregate("suite", vec![result("check_a", true, 1)]);
        assert_eq!(passing.exit_code(), 0);
        assert!(passing.is_successful());

        let failing = Report::aggregate("suite", mixed());
        assert_eq!(failing.exit_code(), 1);
        assert_eq!(failing.failures().count(), 1);

        let empty = Report::aggregate("suite", Vec::new());
        assert_eq!(empty.exit_code(), 0);
    }

    #[test]
    fn test_report_json_shape() {
        let report = Report::aggregate("performance", mixed());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["mode"], "performance");
        assert_eq!(json["summary"]["total_tests"], 3);
        assert_eq!(json["test_results"].as_array().map(Vec::len), Some(3));
        assert!(json["timestamp"].as_str().is_some_and(|t| t.contains('T')));
        assert!(json["build"].is_string());
    }
}
