//! End-to-end runs of every mode against on-disk document fixtures

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use schema_audit::audit::checks::suite;
use schema_audit::audit::{AuditRunner, CheckRegistry, ReportSink, Routine, format_report};
use schema_audit::config::AuditConfig;
use schema_audit::document::catalog::AUTONOMOUS_TESTING;
use schema_audit::mode::{RunMode, run_all_checks};
use tempfile::TempDir;

const ESSENCE: &str = r#"
identity:
  essence_id: tester-001
  name: Autonomous Tester
personality:
  thoroughness: 0.9
  precision: 0.85
  creativity: 0.7
  skepticism: 0.8
  persistence: 0.75
  adaptability: 0.8
core_drives:
  quality_assurance: 0.95
capabilities:
  innate: [pattern_recognition, edge_case_detection]
  learned:
    code_analysis: 0.8
    coverage_analysis: 0.7
behavioral_patterns:
  methodical: {description: Works through code systematically}
energy_profile:
  energy_sources: [bug_discovery, coverage_gain]
  energy_drains: [flaky_tests]
learning_mechanics:
  feedback_loop: {rate: 0.1}
constraints:
  ethical_boundaries: [no_production_writes]
emergence_potentials:
  adaptive_testing: {description: Adjusts strategy from results}
"#;

const GENERATION: &str = r#"
capability_id: test-generation
name: Test Generation
description: Generates tests from code analysis
core_functions:
  analyze_code: {description: Parse and inspect}
  generate_cases: {description: Produce test cases}
learning_mechanisms:
  pattern_learning: {description: Learn from failures}
emergence_potentials:
  predictive_generation: {description: Anticipates missing tests}
"#;

const OPTIMIZATION: &str = r#"
capability_id: test-optimization
name: Test Optimization
description: Prunes and orders test suites
core_functions:
  prioritize: {description: Order by risk}
learning_mechanisms:
  runtime_learning: {description: Learn slow tests}
"#;

const BEHAVIOR: &str = r#"
behavior_id: autonomous-testing
name: Autonomous Testing
description: End-to-end testing loop
behavior_sequence:
  phase_1_analysis: {duration: short}
  phase_2_test_generation: {duration: medium}
  phase_3_test_execution: {duration: long}
learning_integration:
  retrospective: {description: Review each cycle}
"#;

const PHYSICS: &str = r#"
physics_id: testing-environment
name: Testing Environment
description: Forces acting on the tester
environment_properties:
  isolation: high
forces:
  coverage_force: {description: Pulls toward coverage, strength: 0.8, direction: outward}
  quality_force: {description: Pulls toward quality, strength: 0.9, direction: inward}
  efficiency_force: {description: Pushes for speed, strength: 0.6, direction: forward}
  robustness_force: {description: Resists fragility, strength: 0.7, direction: downward}
interactions:
  coverage_quality: {description: Tension between breadth and depth}
energy_dynamics:
  energy_sources: [green_builds]
  energy_drains: [long_runs]
constraints:
  max_runtime_minutes: 30
"#;

const VALIDATION: &str = r#"
validation_dimensions:
  functionality: {metrics: [coverage], thresholds: {coverage: 0.8}}
  performance: {metrics: [runtime], thresholds: {runtime: 60}}
  quality: {metrics: [defect_escape], thresholds: {defect_escape: 0.05}}
  autonomy: {metrics: [human_interventions], thresholds: {human_interventions: 1}}
validation_tests:
  test_generation_validation: {description: d, test_cases: [a], success_criteria: [s]}
  test_optimization_validation: {description: d, test_cases: [b], success_criteria: [s]}
  autonomous_behavior_validation: {description: d, test_cases: [c], success_criteria: [s]}
  robustness_validation: {description: d, test_cases: [e], success_criteria: [s]}
success_criteria:
  overall_system_health: {description: d, criteria: [green], threshold: 0.9}
  continuous_improvement: {description: d, criteria: [trend], threshold: 0.05}
  robustness_validation: {description: d, criteria: [chaos], threshold: 0.95}
validation_frequency:
  continuous_monitoring: every_commit
  periodic_validation: nightly
  milestone_validation: release
validation_reporting:
  metrics_dashboard: enabled
  detailed_reports: enabled
  alert_system: enabled
"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A root with every schema and the validation document in place
fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "schemas/essences/tester-essence.yaml", ESSENCE);
    write(root, "schemas/capabilities/test-generation.yaml", GENERATION);
    write(root, "schemas/capabilities/test-optimization.yaml", OPTIMIZATION);
    write(root, "schemas/behaviors/autonomous-testing.yaml", BEHAVIOR);
    write(root, "schemas/physics/testing-environment.yaml", PHYSICS);
    write(root, "validation/testing-system-validation.yaml", VALIDATION);
    dir
}

fn config_for(dir: &TempDir) -> AuditConfig {
    let mut config = AuditConfig::default().with_root(dir.path());
    config.report_dir = dir.path().join("reports");
    config.performance.simulated_work_micros = 0;
    config
}

#[test]
fn test_valid_documents_pass_every_structure_check() {
    let dir = fixture();
    let config = config_for(&dir);

    for mode in [RunMode::Suite, RunMode::Validation, RunMode::Integration] {
        let report = run_all_checks(mode, &config, false).unwrap();

        if !report.is_successful() {
            eprintln!("\n{}", format_report(&report));
        }
        assert_eq!(report.summary.success_rate, 1.0, "{} mode had failures", mode);
        assert_eq!(report.exit_code(), 0);
    }
}

#[test]
fn test_required_keys_alone_satisfy_structure_checks() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "schemas/essences/tester-essence.yaml",
        r#"
identity: {name: minimal}
personality: {thoroughness: 0.5, precision: 0.5, creativity: 0.5, skepticism: 0.5, persistence: 0.5, adaptability: 0.5}
core_drives: {quality: 0.5}
capabilities: {innate: []}
"#,
    );
    let capability = "capability_id: c\nname: n\ndescription: d\ncore_functions: {f: {}}\n";
    write(root, "schemas/capabilities/test-generation.yaml", capability);
    write(root, "schemas/capabilities/test-optimization.yaml", capability);
    write(
        root,
        "schemas/behaviors/autonomous-testing.yaml",
        r#"
behavior_id: b
name: n
description: d
behavior_sequence: {phase_1_analysis: {}, phase_2_test_generation: {}, phase_3_test_execution: {}}
"#,
    );
    write(
        root,
        "schemas/physics/testing-environment.yaml",
        r#"
physics_id: p
name: n
description: d
environment_properties: {}
forces:
  coverage_force: {description: d, strength: 0.5, direction: up}
  quality_force: {description: d, strength: 0.5, direction: up}
  efficiency_force: {description: d, strength: 0.5, direction: up}
  robustness_force: {description: d, strength: 0.5, direction: up}
"#,
    );

    let structural = [
        "check_schema_loading",
        "check_tester_essence_structure",
        "check_capability_structures",
        "check_behavior_structure",
        "check_physics_structure",
        "check_schema_consistency",
    ];
    let routines: Vec<Routine> = suite::ROUTINES
        .iter()
        .filter(|r| structural.contains(&r.name))
        .copied()
        .collect();
    let registry = CheckRegistry::discover(&routines).unwrap();
    let store = Arc::new(RunMode::Suite.load_documents(&config_for(&dir)));

    let report = AuditRunner::new("suite", registry).run(&store);

    if !report.is_successful() {
        eprintln!("\n{}", format_report(&report));
    }
    assert_eq!(report.summary.total_tests, structural.len());
    assert_eq!(report.summary.success_rate, 1.0);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_missing_behavior_document_fails_its_check() {
    let dir = fixture();
    fs::remove_file(dir.path().join("schemas/behaviors/autonomous-testing.yaml")).unwrap();

    let report = run_all_checks(RunMode::Suite, &config_for(&dir), false).unwrap();

    let behavior = report
        .test_results
        .iter()
        .find(|r| r.name == "check_behavior_structure")
        .unwrap();
    assert!(!behavior.passed);
    assert!(behavior.message.contains(AUTONOMOUS_TESTING));
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_out_of_range_trait_is_reported() {
    let dir = fixture();
    write(
        dir.path(),
        "schemas/essences/tester-essence.yaml",
        &ESSENCE.replace("creativity: 0.7", "creativity: 1.5"),
    );

    let report = run_all_checks(RunMode::Suite, &config_for(&dir), false).unwrap();

    let essence = report
        .test_results
        .iter()
        .find(|r| r.name == "check_tester_essence_structure")
        .unwrap();
    assert!(!essence.passed);
    let invalid = essence.details["invalid_traits"].as_array().unwrap();
    assert!(invalid.iter().any(|v| v == "creativity: 1.5"));
}

#[test]
fn test_malformed_document_is_skipped_not_fatal() {
    let dir = fixture();
    write(dir.path(), "schemas/physics/testing-environment.yaml", "forces: [unclosed");

    let report = run_all_checks(RunMode::Suite, &config_for(&dir), false).unwrap();

    assert_eq!(report.summary.total_tests, 10);
    let loading = report
        .test_results
        .iter()
        .find(|r| r.name == "check_schema_loading")
        .unwrap();
    assert!(!loading.passed);
    assert_eq!(loading.details["missing_schemas"], serde_json::json!(["physics_testing-environment"]));
}

#[test]
fn test_empty_root_fails_without_crashing() {
    let dir = tempfile::tempdir().unwrap();

    for mode in [RunMode::Suite, RunMode::Validation, RunMode::Integration] {
        let report = run_all_checks(mode, &config_for(&dir), false).unwrap();
        assert!(report.summary.total_tests > 0);
        assert_eq!(report.summary.passed_tests + report.summary.failed_tests, report.summary.total_tests);
        assert_eq!(report.exit_code(), 1);
    }
}

#[test]
fn test_concurrent_run_reports_each_check_once() {
    let dir = fixture();
    let config = config_for(&dir);

    let sequential = run_all_checks(RunMode::Integration, &config, false).unwrap();
    let concurrent = run_all_checks(RunMode::Integration, &config, true).unwrap();

    let names: HashSet<_> = concurrent.test_results.iter().map(|r| r.name.clone()).collect();
    assert_eq!(concurrent.test_results.len(), 8);
    assert_eq!(names.len(), 8);
    assert_eq!(concurrent.summary.passed_tests, sequential.summary.passed_tests);
}

#[test]
fn test_performance_run_samples_resources() {
    let dir = fixture();

    let report = run_all_checks(RunMode::Performance, &config_for(&dir), false).unwrap();

    assert_eq!(report.summary.total_tests, 7);
    assert!(report.summary.average_cpu_usage.is_some());
    assert!(report.test_results.iter().all(|r| r.cpu_sample.is_some()));
}

#[test]
fn test_report_is_persisted_as_json() {
    let dir = fixture();
    let config = config_for(&dir);
    let report = run_all_checks(RunMode::Validation, &config, false).unwrap();

    let path = ReportSink::new(config.report_dir())
        .persist(&report, RunMode::Validation.report_file_name())
        .unwrap();

    assert_eq!(path, dir.path().join("reports/validation_test_report.json"));
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["mode"], "validation");
    assert_eq!(json["summary"]["total_tests"], 6);
    assert_eq!(json["summary"]["success_rate"], 1.0);
    assert!(json["timestamp"].is_string());
    assert!(json["test_results"][0]["test_name"].is_string());
    assert!(json["test_results"][0]["description"].is_string());
    assert!(json["test_results"][0].get("memory_usage").is_none());
}
