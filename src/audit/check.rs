//! Core check trait and result types

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::document::DocumentStore;

/// Free-form detail map attached to an outcome
pub type Details = serde_json::Map<String, serde_json::Value>;

/// Final status of an executed check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Check ran and its verdict was positive
    Pass,
    /// Check ran and reported a violation
    Fail,
    /// Check body returned an error or panicked
    Error,
    /// Check did not finish within the configured bound
    Timeout,
}

impl CheckStatus {
    pub fn is_pass(&self) -> bool {
        matches!(self, CheckStatus::Pass)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Error => "ERROR",
            CheckStatus::Timeout => "TIMEOUT",
        }
    }

    /// Returns the status as a colored string
    pub fn as_colored_str(&self) -> String {
        use colored::Colorize;
        match self {
            CheckStatus::Pass => self.as_str().green().to_string(),
            CheckStatus::Fail => self.as_str().red().to_string(),
            CheckStatus::Error => self.as_str().red().bold().to_string(),
            CheckStatus::Timeout => self.as_str().yellow().bold().to_string(),
        }
    }
}

/// Verdict produced by a check body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckOutcome {
    pub passed: bool,
    pub message: String,
    pub details: Details,
}

impl CheckOutcome {
    /// Creates a passing outcome
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: Details::new(),
        }
    }

    /// Creates a failing outcome
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: Details::new(),
        }
    }

    /// Passing or failing outcome depending on `passed`
    pub fn verdict(passed: bool, message: impl Into<String>) -> Self {
        if passed {
            Self::pass(message)
        } else {
            Self::fail(message)
        }
    }

    /// Adds one detail entry
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// An outcome plus what it cost to produce
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    #[serde(rename = "test_name")]
    pub name: String,
    /// What the check validates, when it declares it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: CheckStatus,
    pub passed: bool,
    pub message: String,
    /// Wall-clock time, serialized as fractional seconds
    #[serde(serialize_with = "serialize_secs")]
    pub execution_time: Duration,
    /// Resident memory change across the check, in bytes
    #[serde(rename = "memory_usage", skip_serializing_if = "Option::is_none")]
    pub memory_delta: Option<i64>,
    /// Mean of the CPU samples taken before and after, in percent
    #[serde(rename = "cpu_usage", skip_serializing_if = "Option::is_none")]
    pub cpu_sample: Option<f32>,
    pub details: Details,
}

impl CheckResult {
    /// Wraps a check's own verdict
    pub fn from_outcome(name: impl Into<String>, outcome: CheckOutcome, execution_time: Duration) -> Self {
        let status = if outcome.passed {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        };
        Self {
            name: name.into(),
            description: None,
            status,
            passed: outcome.passed,
            message: outcome.message,
            execution_time,
            memory_delta: None,
            cpu_sample: None,
            details: outcome.details,
        }
    }

    /// Synthesized result for a check that errored or panicked
    pub fn fault(name: impl Into<String>, description: &str, execution_time: Duration) -> Self {
        let outcome = CheckOutcome::fail(format!("Check failed with error: {}", description))
            .with_detail("exception", description);
        Self {
            status: CheckStatus::Error,
            ..Self::from_outcome(name, outcome, execution_time)
        }
    }

    /// Synthesized result for a check that overran its bound
    pub fn timed_out(name: impl Into<String>, bound: Duration, execution_time: Duration) -> Self {
        let outcome = CheckOutcome::fail(format!("Check timed out after {:.2?}", bound))
            .with_detail("timeout_secs", bound.as_secs_f64());
        Self {
            status: CheckStatus::Timeout,
            ..Self::from_outcome(name, outcome, execution_time)
        }
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_string);
        self
    }

    /// Attaches resource measurements
    pub fn with_resources(mut self, memory_delta: Option<i64>, cpu_sample: Option<f32>) -> Self {
        self.memory_delta = memory_delta;
        self.cpu_sample = cpu_sample;
        self
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// A named validation routine over the document store
///
/// Expected violations are reported through a failing [`CheckOutcome`].
/// `Err` is reserved for faults the check did not anticipate; the executor
/// turns those, and panics, into [`CheckStatus::Error`] results.
pub trait Check: Send + Sync {
    /// Unique name, used for discovery, ordering and reporting
    fn name(&self) -> &str;

    /// Optional description of what this check validates
    fn description(&self) -> Option<&str> {
        None
    }

    /// Perform the check
    fn run(&self, store: &DocumentStore) -> anyhow::Result<CheckOutcome>;
}

/// Signature of a check written as a plain function
pub type CheckFn = fn(&DocumentStore) -> anyhow::Result<CheckOutcome>;

/// Adapts a function into a [`Check`]
#[derive(Debug, Clone)]
pub struct FnCheck {
    name: String,
    description: Option<String>,
    func: CheckFn,
}

impl FnCheck {
    pub fn new(name: impl Into<String>, func: CheckFn) -> Self {
        Self {
            name: name.into(),
            description: None,
            func,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Check for FnCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn run(&self, store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
        (self.func)(store)
    }
}
