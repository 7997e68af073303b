//! Cross-document checks: how the schemas fit together as one system

use std::collections::BTreeSet;

use crate::audit::check::CheckOutcome;
use crate::audit::registry::Routine;
use crate::document::catalog::{
    AUTONOMOUS_TESTING, SCHEMA_DOCUMENTS, TEST_GENERATION, TEST_OPTIMIZATION, TESTER_ESSENCE,
    TESTING_ENVIRONMENT, VALIDATION,
};
use crate::document::{DocumentStore, Value};

use super::common::{document, emergence_potentials, missing_keys, schemas_with_mapping, section};
use super::suite::REQUIRED_PHASES;
use super::validation::{REQUIRED_DIMENSIONS, REQUIRED_TESTS};

/// Learned essence capabilities backing the two capability schemas
const LEARNED_CAPABILITIES: [&str; 2] = ["code_analysis", "coverage_analysis"];

/// Emergence families, matched in order against `<document>.<potential>`
const EMERGENCE_TYPES: [(&str, &str); 4] = [
    ("adaptive", "adaptive"),
    ("predictive", "predictive"),
    ("collaborative", "collaborative"),
    ("self", "self_improving"),
];

pub const ROUTINES: &[Routine] = &[
    Routine::new(
        "check_complete_system_architecture",
        "Every schema and the validation document are present",
        complete_system_architecture,
    ),
    Routine::new(
        "check_essence_capability_integration",
        "Essence has learned the capabilities the schemas describe",
        essence_capability_integration,
    ),
    Routine::new(
        "check_behavior_physics_integration",
        "Behavior phases run inside physics constraints",
        behavior_physics_integration,
    ),
    Routine::new(
        "check_energy_dynamics_integration",
        "Essence and physics agree on energy flow",
        energy_dynamics_integration,
    ),
    Routine::new(
        "check_learning_integration",
        "Essence and capabilities all learn",
        learning_integration,
    ),
    Routine::new(
        "check_emergence_integration",
        "Emergence potentials across documents",
        emergence_integration,
    ),
    Routine::new(
        "check_validation_integration",
        "Validation covers the system capabilities",
        validation_integration,
    ),
    Routine::new(
        "check_constraints_integration",
        "Constraints and ethical boundaries exist",
        constraints_integration,
    ),
];

static NULL: Value = Value::Null;

/// Roots of every named document, or the names that are missing
fn all_documents<'a, const N: usize>(
    store: &'a DocumentStore,
    names: [&str; N],
) -> Result<[&'a Value; N], Vec<String>> {
    let found = names.map(|name| document(store, name));
    if found.iter().all(Option::is_some) {
        Ok(found.map(|root| root.unwrap_or(&NULL)))
    } else {
        Err(names
            .iter()
            .zip(found)
            .filter(|(_, root)| root.is_none())
            .map(|(name, _)| name.to_string())
            .collect())
    }
}

fn missing_for(purpose: &str, missing: Vec<String>) -> CheckOutcome {
    CheckOutcome::fail(format!("Missing required schemas for {}: {}", purpose, missing.join(", ")))
        .with_detail("missing_documents", missing)
}

fn complete_system_architecture(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let missing: Vec<String> = SCHEMA_DOCUMENTS
        .iter()
        .filter(|name| document(store, name).is_none())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Ok(CheckOutcome::fail(format!("Missing system components: {}", missing.join(", ")))
            .with_detail("missing_components", missing));
    }

    if document(store, VALIDATION).is_none() {
        return Ok(CheckOutcome::fail("Validation schema missing").with_detail("missing_document", VALIDATION));
    }

    Ok(CheckOutcome::pass("Complete system architecture is valid")
        .with_detail("components_count", store.schemas().count())
        .with_detail("validation_configured", true))
}

fn essence_capability_integration(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let [essence, _, _] = match all_documents(store, [TESTER_ESSENCE, TEST_GENERATION, TEST_OPTIMIZATION]) {
        Ok(roots) => roots,
        Err(missing) => return Ok(missing_for("essence-capability integration", missing)),
    };

    let learned = essence.get_path("capabilities.learned").cloned().unwrap_or_default();
    if let Some(absent) = missing_keys(&learned, &LEARNED_CAPABILITIES).first() {
        return Ok(CheckOutcome::fail(format!("Essence missing {} capability", absent))
            .with_detail("missing_capability", absent.as_str()));
    }

    Ok(CheckOutcome::pass("Essence and capabilities are properly integrated")
        .with_detail("learned_capabilities", learned.len())
        .with_detail("capability_schemas", 2))
}

fn behavior_physics_integration(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let [behavior, physics] = match all_documents(store, [AUTONOMOUS_TESTING, TESTING_ENVIRONMENT]) {
        Ok(roots) => roots,
        Err(missing) => return Ok(missing_for("behavior-physics integration", missing)),
    };

    let Some(sequence) = section(behavior, "behavior_sequence") else {
        return Ok(CheckOutcome::fail("Behavior sequence is empty"));
    };
    let Some(constraints) = section(physics, "constraints") else {
        return Ok(CheckOutcome::fail("Physics constraints are empty"));
    };

    let missing_phases = missing_keys(sequence, &REQUIRED_PHASES);
    if !missing_phases.is_empty() {
        return Ok(CheckOutcome::fail(format!(
            "Behavior missing required phases: {}",
            missing_phases.join(", ")
        ))
        .with_detail("missing_phases", missing_phases));
    }

    Ok(CheckOutcome::pass("Behaviors and physics are properly integrated")
        .with_detail("behavior_phases", sequence.len())
        .with_detail("physics_constraints", constraints.len()))
}

fn energy_dynamics_integration(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let [essence, physics] = match all_documents(store, [TESTER_ESSENCE, TESTING_ENVIRONMENT]) {
        Ok(roots) => roots,
        Err(missing) => return Ok(missing_for("energy dynamics integration", missing)),
    };

    let Some(essence_energy) = section(essence, "energy_profile") else {
        return Ok(CheckOutcome::fail("Essence missing energy profile"));
    };
    let Some(physics_energy) = section(physics, "energy_dynamics") else {
        return Ok(CheckOutcome::fail("Physics missing energy dynamics"));
    };

    let flows = |energy: &Value| {
        (
            section(energy, "energy_sources").map(Value::len),
            section(energy, "energy_drains").map(Value::len),
        )
    };

    let (Some(essence_sources), Some(essence_drains)) = flows(essence_energy) else {
        return Ok(CheckOutcome::fail("Essence energy profile incomplete"));
    };
    let (Some(physics_sources), Some(physics_drains)) = flows(physics_energy) else {
        return Ok(CheckOutcome::fail("Physics energy dynamics incomplete"));
    };

    Ok(CheckOutcome::pass("Energy dynamics are properly integrated")
        .with_detail("essence_sources", essence_sources)
        .with_detail("essence_drains", essence_drains)
        .with_detail("physics_sources", physics_sources)
        .with_detail("physics_drains", physics_drains))
}

fn learning_integration(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let [essence, generation, optimization] =
        match all_documents(store, [TESTER_ESSENCE, TEST_GENERATION, TEST_OPTIMIZATION]) {
            Ok(roots) => roots,
            Err(missing) => return Ok(missing_for("learning integration", missing)),
        };

    if section(essence, "learning_mechanics").is_none() {
        return Ok(CheckOutcome::fail("Essence missing learning mechanics"));
    }
    let Some(generation_learning) = section(generation, "learning_mechanisms") else {
        return Ok(CheckOutcome::fail("Test generation missing learning mechanisms"));
    };
    let Some(optimization_learning) = section(optimization, "learning_mechanisms") else {
        return Ok(CheckOutcome::fail("Test optimization missing learning mechanisms"));
    };

    Ok(CheckOutcome::pass("Learning mechanisms are properly integrated")
        .with_detail("essence_learning", true)
        .with_detail("generation_learning", generation_learning.len())
        .with_detail("optimization_learning", optimization_learning.len()))
}

/// Family of an emergence potential, if its name places it in one
pub(crate) fn emergence_type(potential: &str) -> Option<&'static str> {
    let lowered = potential.to_lowercase();
    EMERGENCE_TYPES
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, family)| *family)
}

fn emergence_integration(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let found = emergence_potentials(store);
    if found.is_empty() {
        return Ok(CheckOutcome::fail("No emergence potentials found across components"));
    }

    let types: BTreeSet<&str> = found.iter().filter_map(|p| emergence_type(p)).collect();

    Ok(CheckOutcome::pass(format!(
        "Found {} emergence potentials across {} types",
        found.len(),
        types.len()
    ))
    .with_detail("emergence_potentials", found)
    .with_detail("emergence_types", types.into_iter().collect::<Vec<_>>()))
}

fn validation_integration(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let Some(validation) = document(store, VALIDATION) else {
        return Ok(CheckOutcome::fail(format!("Validation schema not available: {}", VALIDATION))
            .with_detail("missing_document", VALIDATION));
    };

    let dimensions = validation.get("validation_dimensions").cloned().unwrap_or_default();
    let missing_dimensions = missing_keys(&dimensions, &REQUIRED_DIMENSIONS);
    if !missing_dimensions.is_empty() {
        return Ok(CheckOutcome::fail(format!(
            "Validation missing dimensions: {}",
            missing_dimensions.join(", ")
        ))
        .with_detail("missing_dimensions", missing_dimensions));
    }

    // robustness is validated on its own and is not tied to a capability
    let tests = validation.get("validation_tests").cloned().unwrap_or_default();
    let missing_tests = missing_keys(&tests, &REQUIRED_TESTS[..3]);
    if !missing_tests.is_empty() {
        return Ok(CheckOutcome::fail(format!(
            "Validation missing tests: {}",
            missing_tests.join(", ")
        ))
        .with_detail("missing_tests", missing_tests));
    }

    Ok(CheckOutcome::pass("Validation is properly integrated with the system")
        .with_detail("validation_dimensions", dimensions.len())
        .with_detail("validation_tests", tests.len()))
}

fn constraints_integration(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let with_constraints = schemas_with_mapping(store, "constraints");
    if with_constraints.is_empty() {
        return Ok(CheckOutcome::fail("No constraints found across components"));
    }

    let with_ethics: Vec<String> = with_constraints
        .iter()
        .filter(|name| {
            store
                .get(name)
                .and_then(|doc| doc.root().get_path("constraints.ethical_boundaries"))
                .is_some()
        })
        .cloned()
        .collect();
    if with_ethics.is_empty() {
        return Ok(CheckOutcome::fail("No ethical boundaries found across components")
            .with_detail("components_with_constraints", with_constraints));
    }

    Ok(CheckOutcome::pass(format!(
        "Constraints are properly integrated across {} components",
        with_constraints.len()
    ))
    .with_detail("components_with_constraints", with_constraints)
    .with_detail("components_with_ethics", with_ethics))
}
