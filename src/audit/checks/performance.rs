//! Timing and memory budget checks over the schema documents
//!
//! Unlike the other suites these checks carry state (their budgets), so they
//! are structs implementing [`Check`] rather than plain routines.

use std::hint::black_box;
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::audit::check::{Check, CheckOutcome};
use crate::audit::probe::ResourceProbe;
use crate::audit::registry::{CheckRegistry, RegistryError};
use crate::config::PerformanceBudgets;
use crate::document::catalog::{
    AUTONOMOUS_TESTING, TEST_GENERATION, TEST_OPTIMIZATION, TESTER_ESSENCE, TESTING_ENVIRONMENT,
};
use crate::document::{DocumentStore, Value};

use super::common::{document, missing_document};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Deepest nesting level visited by the memory walk
const MAX_WALK_DEPTH: usize = 5;

fn simulate_work(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

/// How a section contributes to the operation count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    /// One operation per entry, each costing `work_units` of simulated work
    Entries,
    /// One operation per item of every list-valued entry, no simulated work
    ListItems,
}

/// A mapping section of a document that a processing check walks
#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub key: &'static str,
    pub tally: Tally,
    pub work_units: u32,
}

impl Section {
    const fn entries(key: &'static str, work_units: u32) -> Self {
        Self {
            key,
            tally: Tally::Entries,
            work_units,
        }
    }

    const fn list_items(key: &'static str) -> Self {
        Self {
            key,
            tally: Tally::ListItems,
            work_units: 0,
        }
    }

    fn process(&self, root: &Value, unit: Duration) -> usize {
        let Some(entries) = root.get(self.key).and_then(Value::as_mapping) else {
            return 0;
        };
        match self.tally {
            Tally::Entries => {
                for _ in entries {
                    simulate_work(unit * self.work_units);
                }
                entries.len()
            }
            Tally::ListItems => entries
                .values()
                .filter_map(Value::as_sequence)
                .map(<[Value]>::len)
                .sum(),
        }
    }
}

const ESSENCE_SECTIONS: &[Section] = &[
    Section::entries("personality", 0),
    Section::list_items("capabilities"),
    Section::entries("behavioral_patterns", 1),
];

const CAPABILITY_SECTIONS: &[Section] = &[
    Section::entries("core_functions", 1),
    Section::entries("learning_mechanisms", 1),
    Section::entries("emergence_potentials", 1),
];

const BEHAVIOR_SECTIONS: &[Section] = &[
    Section::entries("behavior_sequence", 2),
    Section::entries("learning_integration", 1),
    Section::entries("emergence_potentials", 1),
];

const PHYSICS_SECTIONS: &[Section] = &[
    Section::entries("environment_properties", 1),
    Section::entries("forces", 2),
    Section::entries("interactions", 1),
    Section::entries("energy_dynamics", 1),
];

/// Counts processing operations over document sections within a time and
/// operation budget
#[derive(Debug, Clone)]
pub struct ProcessingCheck {
    name: &'static str,
    label: &'static str,
    documents: &'static [&'static str],
    /// Fail when a document is absent instead of skipping it
    required: bool,
    sections: &'static [Section],
    max_time: Duration,
    max_operations: usize,
    unit_of_work: Duration,
}

impl ProcessingCheck {
    pub fn essence(unit_of_work: Duration) -> Self {
        Self {
            name: "check_essence_processing_performance",
            label: "Essence",
            documents: &[TESTER_ESSENCE],
            required: true,
            sections: ESSENCE_SECTIONS,
            max_time: Duration::from_millis(500),
            max_operations: 1000,
            unit_of_work,
        }
    }

    pub fn capability(unit_of_work: Duration) -> Self {
        Self {
            name: "check_capability_processing_performance",
            label: "Capability",
            documents: &[TEST_GENERATION, TEST_OPTIMIZATION],
            required: false,
            sections: CAPABILITY_SECTIONS,
            max_time: Duration::from_secs(1),
            max_operations: 2000,
            unit_of_work,
        }
    }

    pub fn behavior(unit_of_work: Duration) -> Self {
        Self {
            name: "check_behavior_processing_performance",
            label: "Behavior",
            documents: &[AUTONOMOUS_TESTING],
            required: true,
            sections: BEHAVIOR_SECTIONS,
            max_time: Duration::from_millis(800),
            max_operations: 1500,
            unit_of_work,
        }
    }

    pub fn physics(unit_of_work: Duration) -> Self {
        Self {
            name: "check_physics_processing_performance",
            label: "Physics",
            documents: &[TESTING_ENVIRONMENT],
            required: true,
            sections: PHYSICS_SECTIONS,
            max_time: Duration::from_millis(1200),
            max_operations: 2500,
            unit_of_work,
        }
    }
}

impl Check for ProcessingCheck {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> Option<&str> {
        Some("Section processing stays within its time and operation budget")
    }

    fn run(&self, store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
        let started = Instant::now();
        let mut operations = 0;

        for name in self.documents {
            let Some(root) = document(store, name) else {
                if self.required {
                    return Ok(missing_document(&format!("{} schema", self.label), name));
                }
                continue;
            };
            operations += self
                .sections
                .iter()
                .map(|section| section.process(root, self.unit_of_work))
                .sum::<usize>();
        }

        let elapsed = started.elapsed();
        let passed = elapsed <= self.max_time && operations <= self.max_operations;
        Ok(CheckOutcome::verdict(
            passed,
            format!(
                "{} processing: {:.3}s for {} operations",
                self.label,
                elapsed.as_secs_f64(),
                operations
            ),
        )
        .with_detail("execution_time", elapsed.as_secs_f64())
        .with_detail("processing_operations", operations)
        .with_detail("max_execution_time", self.max_time.as_secs_f64())
        .with_detail("max_operations", self.max_operations))
    }
}

/// Repeatedly walks every schema document as if loading it
#[derive(Debug, Clone)]
pub struct SchemaLoadingCheck {
    passes: usize,
    max_time: Duration,
    unit_of_work: Duration,
}

impl SchemaLoadingCheck {
    pub fn new(unit_of_work: Duration) -> Self {
        Self {
            passes: 10,
            max_time: Duration::from_secs(1),
            unit_of_work,
        }
    }
}

impl Check for SchemaLoadingCheck {
    fn name(&self) -> &str {
        "check_schema_loading_performance"
    }

    fn run(&self, store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
        let started = Instant::now();
        let mut loaded = 0;

        for _ in 0..self.passes {
            for doc in store.schemas().filter(|doc| doc.root().is_mapping()) {
                black_box(doc.root());
                loaded += 1;
                simulate_work(self.unit_of_work);
            }
        }

        let elapsed = started.elapsed();
        Ok(CheckOutcome::verdict(
            elapsed <= self.max_time,
            format!(
                "Schema loading performance: {:.3}s for {} schemas",
                elapsed.as_secs_f64(),
                loaded
            ),
        )
        .with_detail("execution_time", elapsed.as_secs_f64())
        .with_detail("loaded_schemas", loaded)
        .with_detail("max_execution_time", self.max_time.as_secs_f64())
        .with_detail(
            "performance_ratio",
            elapsed.as_secs_f64() / self.max_time.as_secs_f64(),
        ))
    }
}

/// Nodes visited walking `value`, descending at most [`MAX_WALK_DEPTH`] levels
fn deep_walk(value: &Value, depth: usize) -> usize {
    if depth > MAX_WALK_DEPTH {
        return 0;
    }
    match value {
        Value::Mapping(entries) => entries
            .values()
            .map(|child| 1 + deep_walk(child, depth + 1))
            .sum(),
        Value::Sequence(items) => items
            .iter()
            .filter(|item| item.is_mapping())
            .map(|item| 1 + deep_walk(item, depth + 1))
            .sum(),
        _ => 0,
    }
}

/// Builds a synthetic working set and deep-walks the schemas, bounding the
/// resident memory growth and total
#[derive(Debug, Clone)]
pub struct MemoryEfficiencyCheck {
    records: usize,
    fields_per_record: usize,
    walks: usize,
    max_increase_mb: f64,
    max_total_mb: f64,
}

impl MemoryEfficiencyCheck {
    pub fn new(max_increase_mb: f64, max_total_mb: f64) -> Self {
        Self {
            records: 1000,
            fields_per_record: 100,
            walks: 5,
            max_increase_mb,
            max_total_mb,
        }
    }
}

impl Check for MemoryEfficiencyCheck {
    fn name(&self) -> &str {
        "check_memory_efficiency"
    }

    fn run(&self, store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
        let mut probe = ResourceProbe::new();
        let before = probe
            .process_memory()
            .context("process memory is not observable on this platform")?;

        let working_set: Vec<(String, Vec<(String, String)>)> = (0..self.records)
            .map(|i| {
                let fields = (0..self.fields_per_record)
                    .map(|j| (format!("key_{}", j), format!("value_{}", j)))
                    .collect();
                (format!("schema_{}", i), fields)
            })
            .collect();

        let mut visited = 0;
        for _ in 0..self.walks {
            for doc in store.schemas() {
                visited += deep_walk(doc.root(), 0);
            }
        }

        let after = probe
            .process_memory()
            .context("process memory is not observable on this platform")?;
        black_box(&working_set);
        drop(working_set);

        let increase_mb = (after as f64 - before as f64) / BYTES_PER_MB;
        let total_mb = after as f64 / BYTES_PER_MB;
        let passed = increase_mb <= self.max_increase_mb && total_mb <= self.max_total_mb;

        Ok(CheckOutcome::verdict(
            passed,
            format!(
                "Memory efficiency: {:.2}MB increase, {:.2}MB total",
                increase_mb, total_mb
            ),
        )
        .with_detail("memory_increase", increase_mb)
        .with_detail("total_memory", total_mb)
        .with_detail("nodes_visited", visited)
        .with_detail("max_memory_increase", self.max_increase_mb)
        .with_detail("max_memory_usage", self.max_total_mb))
    }
}

/// Processes every schema on its own scoped thread
#[derive(Debug, Clone)]
pub struct ConcurrentProcessingCheck {
    max_time: Duration,
    min_operations: usize,
    unit_of_work: Duration,
}

impl ConcurrentProcessingCheck {
    pub fn new(unit_of_work: Duration) -> Self {
        Self {
            max_time: Duration::from_secs(2),
            min_operations: 100,
            unit_of_work,
        }
    }
}

impl Check for ConcurrentProcessingCheck {
    fn name(&self) -> &str {
        "check_concurrent_processing"
    }

    fn run(&self, store: &DocumentStore) -> anyhow::Result<CheckOutcome> {
        let started = Instant::now();
        let counts = Mutex::new(Vec::new());
        let mut threads = 0;

        thread::scope(|scope| {
            for doc in store.schemas() {
                let counts = &counts;
                let unit = self.unit_of_work;
                threads += 1;
                scope.spawn(move || {
                    let operations = doc.root().as_mapping().map_or(0, |entries| {
                        for _ in entries {
                            simulate_work(unit);
                        }
                        entries.len()
                    });
                    counts
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(operations);
                });
            }
        });

        let total: usize = counts
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .sum();
        let elapsed = started.elapsed();
        let passed = elapsed <= self.max_time && total >= self.min_operations;

        Ok(CheckOutcome::verdict(
            passed,
            format!(
                "Concurrent processing: {:.3}s for {} operations",
                elapsed.as_secs_f64(),
                total
            ),
        )
        .with_detail("execution_time", elapsed.as_secs_f64())
        .with_detail("total_operations", total)
        .with_detail("threads_used", threads)
        .with_detail("max_execution_time", self.max_time.as_secs_f64())
        .with_detail("min_operations", self.min_operations))
    }
}

/// Registry of every performance check, budgeted from `budgets`
pub fn registry(budgets: &PerformanceBudgets) -> Result<CheckRegistry, RegistryError> {
    let unit = budgets.unit_of_work();
    CheckRegistry::new()
        .add_check(SchemaLoadingCheck::new(unit))?
        .add_check(ProcessingCheck::essence(unit))?
        .add_check(ProcessingCheck::capability(unit))?
        .add_check(ProcessingCheck::behavior(unit))?
        .add_check(ProcessingCheck::physics(unit))?
        .add_check(MemoryEfficiencyCheck::new(
            budgets.max_memory_increase_mb,
            budgets.max_total_memory_mb,
        ))?
        .add_check(ConcurrentProcessingCheck::new(unit))
}
