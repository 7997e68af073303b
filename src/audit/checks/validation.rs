//! Checks over the testing-system validation document

use crate::audit::check::CheckOutcome;
use crate::audit::registry::Routine;
use crate::document::catalog::VALIDATION;
use crate::document::{DocumentStore, Value};

use super::common::{document, missing_document, required_section};

pub const REQUIRED_DIMENSIONS: [&str; 4] = ["functionality", "performance", "quality", "autonomy"];

pub const REQUIRED_TESTS: [&str; 4] = [
    "test_generation_validation",
    "test_optimization_validation",
    "autonomous_behavior_validation",
    "robustness_validation",
];

const REQUIRED_CRITERIA: [&str; 3] = [
    "overall_system_health",
    "continuous_improvement",
    "robustness_validation",
];

const REQUIRED_FREQUENCIES: [&str; 3] = [
    "continuous_monitoring",
    "periodic_validation",
    "milestone_validation",
];

const REQUIRED_REPORTING: [&str; 3] = ["metrics_dashboard", "detailed_reports", "alert_system"];

pub const ROUTINES: &[Routine] = &[
    Routine::new(
        "check_validation_schema_loading",
        "Validation document is loaded",
        validation_schema_loading,
    ),
    Routine::new(
        "check_validation_dimensions",
        "Dimensions declare metrics and thresholds",
        validation_dimensions,
    ),
    Routine::new("check_validation_tests", "Validation tests are fully described", validation_tests),
    Routine::new("check_success_criteria", "Success criteria carry thresholds", success_criteria),
    Routine::new("check_validation_frequency", "Validation cadences are declared", validation_frequency),
    Routine::new("check_validation_reporting", "Reporting channels are declared", validation_reporting),
];

fn validation_document(store: &DocumentStore) -> Result<&Value, CheckOutcome> {
    document(store, VALIDATION).ok_or_else(|| missing_document("Validation schema", VALIDATION))
}

fn validation_schema_loading(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    Ok(match validation_document(store) {
        Ok(root) => CheckOutcome::pass("Validation schema loaded successfully")
            .with_detail("schema_keys", root.keys()),
        Err(outcome) => outcome,
    })
}

fn validation_dimensions(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    Ok(validation_document(store).map_or_else(
        |missing| missing,
        |root| {
            required_section(
                root,
                "validation_dimensions",
                &REQUIRED_DIMENSIONS,
                &["metrics", "thresholds"],
                "validation dimensions",
            )
        },
    ))
}

fn validation_tests(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    Ok(validation_document(store).map_or_else(
        |missing| missing,
        |root| {
            required_section(
                root,
                "validation_tests",
                &REQUIRED_TESTS,
                &["description", "test_cases", "success_criteria"],
                "validation tests",
            )
        },
    ))
}

fn success_criteria(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    Ok(validation_document(store).map_or_else(
        |missing| missing,
        |root| {
            required_section(
                root,
                "success_criteria",
                &REQUIRED_CRITERIA,
                &["description", "criteria", "threshold"],
                "success criteria",
            )
        },
    ))
}

fn validation_frequency(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    Ok(validation_document(store).map_or_else(
        |missing| missing,
        |root| {
            required_section(
                root,
                "validation_frequency",
                &REQUIRED_FREQUENCIES,
                &[],
                "validation frequencies",
            )
        },
    ))
}

fn validation_reporting(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    Ok(validation_document(store).map_or_else(
        |missing| missing,
        |root| {
            required_section(
                root,
                "validation_reporting",
                &REQUIRED_REPORTING,
                &[],
                "reporting components",
            )
        },
    ))
}
