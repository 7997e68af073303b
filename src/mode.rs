//! Run modes: which documents, checks and instrumentation a run uses

use std::sync::Arc;

use anyhow::Context;
use clap::ValueEnum;
use tracing::info;

use crate::audit::checks::{integration, performance, suite, validation};
use crate::audit::{AuditRunner, CheckExecutor, CheckRegistry, Instrumentation, Report};
use crate::config::AuditConfig;
use crate::document::{self, DocumentSource, DocumentStore, catalog};

/// A preset bundle of documents and checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Structure of the five schema documents
    Suite,
    /// The testing-system validation document
    Validation,
    /// How schemas and validation fit together
    Integration,
    /// Timing and memory budgets
    Performance,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Suite => "suite",
            RunMode::Validation => "validation",
            RunMode::Integration => "integration",
            RunMode::Performance => "performance",
        }
    }

    /// File the report of this mode is written to
    pub fn report_file_name(&self) -> &'static str {
        match self {
            RunMode::Suite => "test_report.json",
            RunMode::Validation => "validation_test_report.json",
            RunMode::Integration => "integration_test_report.json",
            RunMode::Performance => "performance_test_report.json",
        }
    }

    pub fn instrumentation(&self) -> Instrumentation {
        match self {
            RunMode::Performance => Instrumentation::Resources,
            _ => Instrumentation::Timing,
        }
    }

    /// Document sources this mode loads
    pub fn sources(&self, config: &AuditConfig) -> Vec<DocumentSource> {
        let schemas = || catalog::schema_sources(&config.schemas_path());
        let validation = || catalog::validation_source(&config.validation_path());
        match self {
            RunMode::Suite | RunMode::Performance => schemas(),
            RunMode::Validation => vec![validation()],
            RunMode::Integration => {
                let mut sources = schemas();
                sources.push(validation());
                sources
            }
        }
    }

    /// Checks this mode runs
    pub fn registry(&self, config: &AuditConfig) -> anyhow::Result<CheckRegistry> {
        let registry = match self {
            RunMode::Suite => CheckRegistry::discover(suite::ROUTINES),
            RunMode::Validation => CheckRegistry::discover(validation::ROUTINES),
            RunMode::Integration => CheckRegistry::discover(integration::ROUTINES),
            RunMode::Performance => performance::registry(&config.performance),
        };
        registry.with_context(|| format!("building {} registry", self.as_str()))
    }

    pub fn load_documents(&self, config: &AuditConfig) -> DocumentStore {
        document::load(&self.sources(config))
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loads the documents of `mode`, runs its checks and returns the report
pub fn run_all_checks(mode: RunMode, config: &AuditConfig, concurrent: bool) -> anyhow::Result<Report> {
    let store = Arc::new(mode.load_documents(config));
    info!(mode = %mode, root = %config.root.display(), documents = store.len(), "Documents loaded");

    let executor = CheckExecutor::new()
        .with_instrumentation(mode.instrumentation())
        .with_timeout(config.check_timeout());
    let runner = AuditRunner::new(mode.as_str(), mode.registry(config)?)
        .with_executor(executor)
        .concurrent(concurrent);

    Ok(runner.run(&store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_loads_schemas_and_validation() {
        let config = AuditConfig::default();
        let sources = RunMode::Integration.sources(&config);
        assert_eq!(sources.len(), 6);
        assert_eq!(sources[5].name(), catalog::VALIDATION);
        assert_eq!(RunMode::Validation.sources(&config).len(), 1);
    }

    #[test]
    fn test_registries_per_mode() {
        let config = AuditConfig::default();
        let sizes: Vec<usize> = RunMode::value_variants()
            .iter()
            .map(|mode| mode.registry(&config).unwrap().len())
            .collect();
        assert_eq!(sizes, vec![10, 6, 8, 7]);
    }

    #[test]
    fn test_only_performance_samples_resources() {
        assert_eq!(RunMode::Performance.instrumentation(), Instrumentation::Resources);
        assert_eq!(RunMode::Suite.instrumentation(), Instrumentation::Timing);
        assert_eq!(RunMode::Integration.report_file_name(), "integration_test_report.json");
    }
}
