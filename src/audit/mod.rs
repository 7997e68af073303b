//! Check engine: discovery, execution, aggregation and reporting
//!
//! A run enumerates a [`CheckRegistry`], executes each check through a
//! [`CheckExecutor`] (or all of them at once through a
//! [`ConcurrentRunner`]), folds the results into a [`Report`], prints it,
//! and persists it through a [`ReportSink`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use schema_audit::audit::{AuditRunner, CheckRegistry, checks};
//! use schema_audit::document::DocumentStore;
//!
//! let registry = CheckRegistry::discover(checks::suite::ROUTINES).unwrap();
//! let report = AuditRunner::new("suite", registry).run(&Arc::new(DocumentStore::new()));
//!
//! if report.is_successful() {
//!     println!("All checks passed!");
//! }
//! ```

pub mod check;
pub mod checks;
pub mod concurrent;
pub mod executor;
pub mod probe;
pub mod registry;
pub mod report;
pub mod reporter;
pub mod runner;
pub mod sink;

pub use check::{Check, CheckFn, CheckOutcome, CheckResult, CheckStatus, Details, FnCheck};
pub use concurrent::ConcurrentRunner;
pub use executor::{CheckExecutor, DEFAULT_CHECK_TIMEOUT, Instrumentation};
pub use probe::{ResourceProbe, ResourceSample};
pub use registry::{CHECK_PREFIX, CheckRegistry, RegistryError, Routine};
pub use report::{Report, Summary};
pub use reporter::{format_report, format_summary, print_report};
pub use runner::AuditRunner;
pub use sink::{ReportSink, SinkError};
