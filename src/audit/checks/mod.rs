//! Built-in check suites, one module per run mode
//!
//! The suite, validation and integration checks are plain routines collected
//! by [`CheckRegistry::discover`](crate::audit::CheckRegistry::discover).
//! Performance checks carry their budgets and are assembled by
//! [`performance::registry`].

mod common;
pub mod integration;
pub mod performance;
pub mod suite;
pub mod validation;
