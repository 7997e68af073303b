//! Well-known documents of the system under test

use std::path::Path;

use super::loader::DocumentSource;

/// Schema source ids, relative to the schemas directory
pub const SCHEMA_SOURCE_IDS: [&str; 5] = [
    "essences/tester-essence",
    "capabilities/test-generation",
    "capabilities/test-optimization",
    "behaviors/autonomous-testing",
    "physics/testing-environment",
];

/// Validation rules source id, relative to the validation directory
pub const VALIDATION_SOURCE_ID: &str = "testing-system-validation";

pub const TESTER_ESSENCE: &str = "essences_tester-essence";
pub const TEST_GENERATION: &str = "capabilities_test-generation";
pub const TEST_OPTIMIZATION: &str = "capabilities_test-optimization";
pub const AUTONOMOUS_TESTING: &str = "behaviors_autonomous-testing";
pub const TESTING_ENVIRONMENT: &str = "physics_testing-environment";
pub const VALIDATION: &str = "testing-system-validation";

/// Names of the five schema documents, in load order
pub const SCHEMA_DOCUMENTS: [&str; 5] = [
    TESTER_ESSENCE,
    TEST_GENERATION,
    TEST_OPTIMIZATION,
    AUTONOMOUS_TESTING,
    TESTING_ENVIRONMENT,
];

/// Prefix shared by capability document names
pub const CAPABILITY_PREFIX: &str = "capabilities_";

pub fn schema_sources(schemas_dir: &Path) -> Vec<DocumentSource> {
    SCHEMA_SOURCE_IDS
        .iter()
        .map(|id| DocumentSource::schema(schemas_dir, id))
        .collect()
}

pub fn validation_source(validation_dir: &Path) -> DocumentSource {
    DocumentSource::validation(validation_dir, VALIDATION_SOURCE_ID)
}
