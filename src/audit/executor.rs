//! Runs a single check with instrumentation and fault isolation

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use super::check::{Check, CheckOutcome, CheckResult};
use super::probe::ResourceProbe;
use crate::document::DocumentStore;

/// Bound applied to each check unless configured otherwise
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// What the executor measures around each check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Instrumentation {
    /// Wall-clock time only
    #[default]
    Timing,
    /// Wall-clock time, resident memory delta and CPU sample
    Resources,
}

/// Executes checks one at a time
///
/// A check that fails, errors, panics or hangs always produces a
/// [`CheckResult`]; nothing a check does can abort the run.
#[derive(Debug, Clone)]
pub struct CheckExecutor {
    instrumentation: Instrumentation,
    timeout: Option<Duration>,
}

struct TimedOut;

impl CheckExecutor {
    /// Timing-only executor with the default timeout
    pub fn new() -> Self {
        Self {
            instrumentation: Instrumentation::Timing,
            timeout: Some(DEFAULT_CHECK_TIMEOUT),
        }
    }

    pub fn with_instrumentation(mut self, instrumentation: Instrumentation) -> Self {
        self.instrumentation = instrumentation;
        self
    }

    /// Sets the per-check bound; `None` runs checks inline and unbounded
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn instrumentation(&self) -> Instrumentation {
        self.instrumentation
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Runs one check against the store and records what it cost
    pub fn execute(&self, check: &Arc<dyn Check>, store: &Arc<DocumentStore>) -> CheckResult {
        let name = check.name().to_string();
        debug!(check = %name, description = ?check.description(), "Running check");

        let mut probe = match self.instrumentation {
            Instrumentation::Resources => Some(ResourceProbe::new()),
            Instrumentation::Timing => None,
        };
        let start_sample = probe.as_mut().map(ResourceProbe::sample);
        let start = Instant::now();

        let invocation = match self.timeout {
            None => Ok(invoke(check.as_ref(), store)),
            Some(bound) => invoke_bounded(check, store, bound),
        };

        let elapsed = start.elapsed();
        let end_sample = probe.as_mut().map(ResourceProbe::sample);

        let mut result = match invocation {
            Ok(Ok(outcome)) => CheckResult::from_outcome(name, outcome, elapsed),
            Ok(Err(fault)) => CheckResult::fault(name, &fault, elapsed),
            Err(TimedOut) => {
                CheckResult::timed_out(name, self.timeout.unwrap_or_default(), elapsed)
            }
        }
        .with_description(check.description());

        if let (Some(before), Some(after)) = (start_sample, end_sample) {
            result = result.with_resources(
                after.memory_delta_since(&before),
                Some((before.cpu_percent + after.cpu_percent) / 2.0),
            );
        }

        log_result(&result);
        result
    }
}

impl Default for CheckExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Calls the check body, folding errors and panics into a description
fn invoke(check: &dyn Check, store: &DocumentStore) -> Result<CheckOutcome, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| check.run(store))) {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(payload) => Err(format!("panicked: {}", panic_payload_to_string(payload.as_ref()))),
    }
}

/// Runs the check on its own thread and waits at most `bound`
///
/// On timeout the worker thread is detached; its late result is dropped.
fn invoke_bounded(
    check: &Arc<dyn Check>,
    store: &Arc<DocumentStore>,
    bound: Duration,
) -> Result<Result<CheckOutcome, String>, TimedOut> {
    let (tx, rx) = mpsc::channel();
    let worker_check = Arc::clone(check);
    let worker_store = Arc::clone(store);

    let spawned = thread::Builder::new()
        .name(format!("check:{}", check.name()))
        .spawn(move || {
            let _ = tx.send(invoke(worker_check.as_ref(), &worker_store));
        });
    if let Err(e) = spawned {
        return Ok(Err(format!("failed to spawn check thread: {}", e)));
    }

    match rx.recv_timeout(bound) {
        Ok(invocation) => Ok(invocation),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(TimedOut),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Ok(Err("check thread exited without reporting".to_string()))
        }
    }
}

fn panic_payload_to_string(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn log_result(result: &CheckResult) {
    let elapsed_ms = result.execution_time.as_secs_f64() * 1000.0;
    if result.passed {
        info!(
            check = %result.name,
            status = result.status.as_str(),
            elapsed_ms,
            memory_delta = ?result.memory_delta,
            cpu = ?result.cpu_sample,
            "{}",
            result.message
        );
    } else {
        error!(
            check = %result.name,
            status = result.status.as_str(),
            elapsed_ms,
            memory_delta = ?result.memory_delta,
            cpu = ?result.cpu_sample,
            "{}",
            result.message
        );
    }
}
