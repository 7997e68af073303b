//! Helpers shared by the check suites

use crate::audit::check::CheckOutcome;
use crate::document::{Document, DocumentStore, Value};

/// Root of a loaded, non-empty document
pub(crate) fn document<'a>(store: &'a DocumentStore, name: &str) -> Option<&'a Value> {
    store
        .get(name)
        .map(Document::root)
        .filter(|root| root.is_truthy())
}

/// Failing outcome for an absent document, naming it
pub(crate) fn missing_document(label: &str, name: &str) -> CheckOutcome {
    CheckOutcome::fail(format!("{} not found: {}", label, name))
        .with_detail("missing_document", name)
}

/// Required keys absent from `value` (all of them if it is not a mapping)
pub(crate) fn missing_keys(value: &Value, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|key| !value.contains_key(key))
        .map(|key| key.to_string())
        .collect()
}

/// Non-empty section of a mapping, or `None`
pub(crate) fn section<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| v.is_truthy())
}

/// Entries of `section` that are not mappings or lack a required field
///
/// Produces one line per problem: `"<entry>: not a dictionary"` or
/// `"<entry>: missing <field>"`.
pub(crate) fn invalid_entries(section: &Value, required_fields: &[&str]) -> Vec<String> {
    let Some(entries) = section.as_mapping() else {
        return Vec::new();
    };

    let mut invalid = Vec::new();
    for (name, entry) in entries {
        if !entry.is_mapping() {
            invalid.push(format!("{}: not a dictionary", name));
            continue;
        }
        for field in required_fields {
            if !entry.contains_key(field) {
                invalid.push(format!("{}: missing {}", name, field));
            }
        }
    }
    invalid
}

/// Outcome for a required-key check over a named section of `root`
///
/// Fails on missing keys, then on malformed entries when `entry_fields` is
/// non-empty; passes otherwise with the section's keys listed under
/// `section_key`.
pub(crate) fn required_section(
    root: &Value,
    section_key: &str,
    required: &[&str],
    entry_fields: &[&str],
    noun: &str,
) -> CheckOutcome {
    let section = root.get(section_key).cloned().unwrap_or_default();
    let missing = missing_keys(&section, required);
    if !missing.is_empty() {
        return CheckOutcome::fail(format!("Missing {}: {}", noun, missing.join(", ")))
            .with_detail(format!("missing_{}", section_key), missing);
    }

    // Without entry fields only key presence matters; entries may be scalars
    let invalid = if entry_fields.is_empty() {
        Vec::new()
    } else {
        invalid_entries(&section, entry_fields)
    };
    if !invalid.is_empty() {
        return CheckOutcome::fail(format!("Invalid {} configurations: {}", noun, invalid.join("; ")))
            .with_detail(format!("invalid_{}", section_key), invalid);
    }

    CheckOutcome::pass(format!("All {} {} are properly configured", section.len(), noun))
        .with_detail(section_key, section.keys())
}

/// `<document>.<potential>` for every emergence potential with a description
pub(crate) fn emergence_potentials(store: &DocumentStore) -> Vec<String> {
    let mut found = Vec::new();
    for doc in store.schemas() {
        let Some(potentials) = doc.get("emergence_potentials").and_then(Value::as_mapping) else {
            continue;
        };
        for (name, potential) in potentials {
            if potential.contains_key("description") {
                found.push(format!("{}.{}", doc.name(), name));
            }
        }
    }
    found
}

/// Names of schema documents whose `key` is a mapping
pub(crate) fn schemas_with_mapping(store: &DocumentStore, key: &str) -> Vec<String> {
    store
        .schemas()
        .filter(|doc| doc.get(key).is_some_and(Value::is_mapping))
        .map(|doc| doc.name().to_string())
        .collect()
}
