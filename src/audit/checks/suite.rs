//! Structural checks over the five schema documents

use crate::audit::check::CheckOutcome;
use crate::audit::registry::Routine;
use crate::document::catalog::{
    AUTONOMOUS_TESTING, CAPABILITY_PREFIX, SCHEMA_DOCUMENTS, TEST_GENERATION, TEST_OPTIMIZATION,
    TESTER_ESSENCE, TESTING_ENVIRONMENT,
};
use crate::document::{DocumentStore, Value};

use super::common::{
    document, emergence_potentials, missing_document, missing_keys, schemas_with_mapping, section,
};

/// Personality traits every tester essence must declare
pub const REQUIRED_TRAITS: [&str; 6] = [
    "thoroughness",
    "precision",
    "creativity",
    "skepticism",
    "persistence",
    "adaptability",
];

/// Phases every behavior sequence must contain
pub const REQUIRED_PHASES: [&str; 3] = [
    "phase_1_analysis",
    "phase_2_test_generation",
    "phase_3_test_execution",
];

/// Forces every physics environment must define
pub const REQUIRED_FORCES: [&str; 4] = [
    "coverage_force",
    "quality_force",
    "efficiency_force",
    "robustness_force",
];

const ESSENCE_FIELDS: [&str; 4] = ["identity", "personality", "core_drives", "capabilities"];
const CAPABILITY_FIELDS: [&str; 4] = ["capability_id", "name", "description", "core_functions"];
const BEHAVIOR_FIELDS: [&str; 4] = ["behavior_id", "name", "description", "behavior_sequence"];
const PHYSICS_FIELDS: [&str; 5] = [
    "physics_id",
    "name",
    "description",
    "environment_properties",
    "forces",
];
const FORCE_FIELDS: [&str; 3] = ["description", "strength", "direction"];

pub const ROUTINES: &[Routine] = &[
    Routine::new("check_schema_loading", "All five schema documents are loaded", schema_loading),
    Routine::new(
        "check_tester_essence_structure",
        "Essence fields, personality traits and trait ranges",
        tester_essence_structure,
    ),
    Routine::new(
        "check_capability_structures",
        "Required fields of both capability schemas",
        capability_structures,
    ),
    Routine::new(
        "check_behavior_structure",
        "Behavior fields and required sequence phases",
        behavior_structure,
    ),
    Routine::new("check_physics_structure", "Physics fields and force definitions", physics_structure),
    Routine::new("check_energy_dynamics", "Energy sources, drains and physics dynamics", energy_dynamics),
    Routine::new(
        "check_emergence_potentials",
        "At least one described emergence potential",
        emergence_potentials_present,
    ),
    Routine::new("check_learning_mechanisms", "At least one schema declares learning mechanics", learning_mechanisms),
    Routine::new(
        "check_constraints_and_ethics",
        "At least one schema declares constraints",
        constraints_and_ethics,
    ),
    Routine::new("check_schema_consistency", "Identity and capability consistency", schema_consistency),
];

fn schema_loading(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let missing: Vec<String> = SCHEMA_DOCUMENTS
        .iter()
        .filter(|name| !store.contains(name))
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Ok(CheckOutcome::fail(format!("Missing required schemas: {}", missing.join(", ")))
            .with_detail("missing_schemas", missing));
    }

    let loaded: Vec<&str> = store.schemas().map(|doc| doc.name()).collect();
    Ok(CheckOutcome::pass(format!("Successfully loaded {} schemas", loaded.len()))
        .with_detail("loaded_schemas", loaded))
}

fn tester_essence_structure(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let Some(essence) = document(store, TESTER_ESSENCE) else {
        return Ok(missing_document("Tester essence schema", TESTER_ESSENCE));
    };

    let missing_fields = missing_keys(essence, &ESSENCE_FIELDS);
    if !missing_fields.is_empty() {
        return Ok(CheckOutcome::fail(format!(
            "Missing required fields in tester essence: {}",
            missing_fields.join(", ")
        ))
        .with_detail("missing_fields", missing_fields));
    }

    let personality = essence.get("personality").cloned().unwrap_or_default();
    let missing_traits = missing_keys(&personality, &REQUIRED_TRAITS);
    if !missing_traits.is_empty() {
        return Ok(CheckOutcome::fail(format!(
            "Missing required personality traits: {}",
            missing_traits.join(", ")
        ))
        .with_detail("missing_traits", missing_traits));
    }

    let invalid_traits = invalid_trait_values(&personality);
    if !invalid_traits.is_empty() {
        return Ok(CheckOutcome::fail(format!(
            "Invalid personality trait values: {}",
            invalid_traits.join(", ")
        ))
        .with_detail("invalid_traits", invalid_traits));
    }

    Ok(CheckOutcome::pass("Tester essence structure is valid")
        .with_detail("personality_traits", personality.len()))
}

/// `"<trait>: <value>"` for every trait that is not a number in [0, 1]
pub(crate) fn invalid_trait_values(personality: &Value) -> Vec<String> {
    let Some(traits) = personality.as_mapping() else {
        return Vec::new();
    };
    traits
        .iter()
        .filter(|(_, value)| !value.as_f64().is_some_and(|v| (0.0..=1.0).contains(&v)))
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect()
}

fn capability_structures(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let mut results = serde_json::Map::new();
    let mut passed = 0;

    for (label, name) in [("test-generation", TEST_GENERATION), ("test-optimization", TEST_OPTIMIZATION)] {
        let entry = match document(store, name) {
            None => serde_json::json!({
                "passed": false,
                "message": format!("{} schema not found", label),
            }),
            Some(schema) => {
                let missing = missing_keys(schema, &CAPABILITY_FIELDS);
                if missing.is_empty() {
                    passed += 1;
                    serde_json::json!({
                        "passed": true,
                        "message": format!("{} structure is valid", label),
                    })
                } else {
                    serde_json::json!({
                        "passed": false,
                        "message": format!("Missing required fields: {}", missing.join(", ")),
                    })
                }
            }
        };
        results.insert(label.to_string(), entry);
    }

    let total = results.len();
    Ok(CheckOutcome::verdict(
        passed == total,
        format!("Capability structure validation: {}/{} passed", passed, total),
    )
    .with_detail("capability_results", results))
}

fn behavior_structure(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let Some(behavior) = document(store, AUTONOMOUS_TESTING) else {
        return Ok(missing_document("Autonomous testing behavior schema", AUTONOMOUS_TESTING));
    };

    let missing_fields = missing_keys(behavior, &BEHAVIOR_FIELDS);
    if !missing_fields.is_empty() {
        return Ok(CheckOutcome::fail(format!(
            "Missing required fields in behavior: {}",
            missing_fields.join(", ")
        ))
        .with_detail("missing_fields", missing_fields));
    }

    let Some(sequence) = section(behavior, "behavior_sequence") else {
        return Ok(CheckOutcome::fail("Behavior sequence is empty or missing"));
    };

    let missing_phases = missing_keys(sequence, &REQUIRED_PHASES);
    if !missing_phases.is_empty() {
        return Ok(CheckOutcome::fail(format!(
            "Missing required behavior phases: {}",
            missing_phases.join(", ")
        ))
        .with_detail("missing_phases", missing_phases));
    }

    Ok(CheckOutcome::pass("Behavior structure is valid").with_detail("phases_count", sequence.len()))
}

fn physics_structure(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let Some(physics) = document(store, TESTING_ENVIRONMENT) else {
        return Ok(missing_document("Testing environment physics schema", TESTING_ENVIRONMENT));
    };

    let missing_fields = missing_keys(physics, &PHYSICS_FIELDS);
    if !missing_fields.is_empty() {
        return Ok(CheckOutcome::fail(format!(
            "Missing required fields in physics: {}",
            missing_fields.join(", ")
        ))
        .with_detail("missing_fields", missing_fields));
    }

    let forces = physics.get("forces").cloned().unwrap_or_default();
    let missing_forces = missing_keys(&forces, &REQUIRED_FORCES);
    if !missing_forces.is_empty() {
        return Ok(CheckOutcome::fail(format!(
            "Missing required forces: {}",
            missing_forces.join(", ")
        ))
        .with_detail("missing_forces", missing_forces));
    }

    let mut invalid_forces = Vec::new();
    for (name, force) in forces.as_mapping().into_iter().flatten() {
        if !force.is_mapping() {
            invalid_forces.push(format!("{}: not a dictionary", name));
            continue;
        }
        let missing = missing_keys(force, &FORCE_FIELDS);
        if !missing.is_empty() {
            invalid_forces.push(format!("{}: missing {}", name, missing.join(", ")));
        }
    }
    if !invalid_forces.is_empty() {
        return Ok(CheckOutcome::fail(format!(
            "Invalid force configurations: {}",
            invalid_forces.join("; ")
        ))
        .with_detail("invalid_forces", invalid_forces));
    }

    Ok(CheckOutcome::pass("Physics structure is valid").with_detail("forces_count", forces.len()))
}

fn energy_dynamics(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let essence = document(store, TESTER_ESSENCE).cloned().unwrap_or_default();
    let Some(profile) = section(&essence, "energy_profile") else {
        return Ok(CheckOutcome::fail("Energy profile missing in tester essence"));
    };

    let Some(sources) = section(profile, "energy_sources") else {
        return Ok(CheckOutcome::fail("No energy sources defined"));
    };
    let Some(drains) = section(profile, "energy_drains") else {
        return Ok(CheckOutcome::fail("No energy drains defined"));
    };

    let physics = document(store, TESTING_ENVIRONMENT).cloned().unwrap_or_default();
    if section(&physics, "energy_dynamics").is_none() {
        return Ok(CheckOutcome::fail("Energy dynamics missing in physics"));
    }

    Ok(CheckOutcome::pass("Energy dynamics are properly configured")
        .with_detail("energy_sources_count", sources.len())
        .with_detail("energy_drains_count", drains.len())
        .with_detail("physics_energy_configured", true))
}

fn emergence_potentials_present(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let found = emergence_potentials(store);
    if found.is_empty() {
        return Ok(CheckOutcome::fail("No emergence potentials found in schemas"));
    }
    Ok(CheckOutcome::pass(format!("Found {} emergence potentials", found.len()))
        .with_detail("emergence_potentials", found))
}

fn learning_mechanisms(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let found = schemas_with_mapping(store, "learning_mechanics");
    if found.is_empty() {
        return Ok(CheckOutcome::fail("No learning mechanisms found in schemas"));
    }
    Ok(CheckOutcome::pass(format!("Found learning mechanisms in {} schemas", found.len()))
        .with_detail("schemas_with_learning", found))
}

fn constraints_and_ethics(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let found = schemas_with_mapping(store, "constraints");
    if found.is_empty() {
        return Ok(CheckOutcome::fail("No constraints found in schemas"));
    }
    Ok(CheckOutcome::pass(format!("Found constraints in {} schemas", found.len()))
        .with_detail("schemas_with_constraints", found))
}

fn schema_consistency(store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
    let mut inconsistencies = Vec::new();

    for doc in store.schemas() {
        let Some(essence_id) = doc.root().get_path("identity.essence_id") else {
            continue;
        };
        if !essence_id.as_str().is_some_and(|id| !id.is_empty()) {
            inconsistencies.push(format!("{}: invalid essence_id", doc.name()));
        }
    }

    let capability_schemas = store
        .schemas()
        .filter(|doc| doc.name().starts_with(CAPABILITY_PREFIX))
        .count();
    if capability_schemas < 2 {
        inconsistencies.push("Expected at least 2 capability schemas".to_string());
    }

    if !inconsistencies.is_empty() {
        return Ok(CheckOutcome::fail(format!("Found {} inconsistencies", inconsistencies.len()))
            .with_detail("inconsistencies", inconsistencies));
    }

    Ok(CheckOutcome::pass("Schemas are consistent").with_detail("capability_schemas", capability_schemas))
}
