//! Named collection of checks available to a run

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::check::{Check, CheckFn, FnCheck};

/// Marker prefix that makes a routine discoverable as a check
pub const CHECK_PREFIX: &str = "check_";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a check named '{0}' is already registered")]
    Duplicate(String),
}

/// A candidate routine offered to discovery
#[derive(Debug, Clone, Copy)]
pub struct Routine {
    pub name: &'static str,
    pub description: &'static str,
    pub run: CheckFn,
}

impl Routine {
    pub const fn new(name: &'static str, description: &'static str, run: CheckFn) -> Self {
        Self {
            name,
            description,
            run,
        }
    }
}

/// Checks keyed by name
///
/// Enumeration is in name order so reports are reproducible regardless of
/// registration order.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    checks: BTreeMap<String, Arc<dyn Check>>,
}

impl CheckRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from every routine carrying [`CHECK_PREFIX`]
    pub fn discover(routines: &[Routine]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for routine in routines {
            if !routine.name.starts_with(CHECK_PREFIX) {
                debug!(routine = routine.name, "Skipping routine without check prefix");
                continue;
            }
            registry.register(FnCheck::new(routine.name, routine.run).with_description(routine.description))?;
        }
        Ok(registry)
    }

    /// Registers a check under its own name
    pub fn register<C: Check + 'static>(&mut self, check: C) -> Result<(), RegistryError> {
        self.register_shared(Arc::new(check))
    }

    /// Registers an already shared check
    pub fn register_shared(&mut self, check: Arc<dyn Check>) -> Result<(), RegistryError> {
        let name = check.name().to_string();
        if self.checks.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.checks.insert(name, check);
        Ok(())
    }

    /// Builder-style registration
    pub fn add_check<C: Check + 'static>(mut self, check: C) -> Result<Self, RegistryError> {
        self.register(check)?;
        Ok(self)
    }

    /// Ordered `(name, check)` pairs
    pub fn list_checks(&self) -> impl Iterator<Item = (&str, &Arc<dyn Check>)> {
        self.checks.iter().map(|(name, check)| (name.as_str(), check))
    }

    /// Ordered checks, cloned for handing to workers
    pub fn checks(&self) -> Vec<Arc<dyn Check>> {
        self.checks.values().cloned().collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.checks.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("checks", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::check::CheckOutcome;
    use crate::document::DocumentStore;

    fn ok(_: &DocumentStore) -> anyhow::Result<CheckOutcome> {
        Ok(CheckOutcome::pass("ok"))
    }

    #[test]
    fn test_discover_keeps_only_prefixed_routines() {
        let registry = CheckRegistry::discover(&[
            Routine::new("check_beta", "", ok),
            Routine::new("helper_walk", "", ok),
            Routine::new("check_alpha", "", ok),
        ])
        .unwrap();

        assert_eq!(registry.names(), vec!["check_alpha", "check_beta"]);
    }

    #[test]
    fn test_enumeration_order_ignores_registration_order() {
        let mut forward = CheckRegistry::new();
        forward.register(FnCheck::new("check_a", ok)).unwrap();
        forward.register(FnCheck::new("check_b", ok)).unwrap();

        let mut backward = CheckRegistry::new();
        backward.register(FnCheck::new("check_b", ok)).unwrap();
        backward.register(FnCheck::new("check_a", ok)).unwrap();

        assert_eq!(forward.names(), backward.names());
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let registry = CheckRegistry::new().add_check(FnCheck::new("check_a", ok)).unwrap();
        let err = registry.add_check(FnCheck::new("check_a", ok)).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("check_a".to_string()));
    }

    #[test]
    fn test_descriptions_survive_discovery() {
        let registry = CheckRegistry::discover(&[Routine::new("check_a", "validates a", ok)]).unwrap();
        let (_, check) = registry.list_checks().next().unwrap();
        assert_eq!(check.description(), Some("validates a"));
    }
}
