//! Schema Audit
//!
//! Loads a set of YAML schema documents, runs named checks over them and
//! writes a JSON report with timing and resource figures.

/// Check engine: registry, executor, runners, reports
pub mod audit;

/// Build-time information (timestamp, target, compiler)
pub mod build_info;

/// Profile-based configuration
pub mod config;

/// Schema documents and their loader
pub mod document;

/// Run modes tying documents, checks and report paths together
pub mod mode;
