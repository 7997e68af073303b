//! Process memory and CPU sampling

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// One point-in-time resource reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSample {
    /// Resident set size of this process, if the platform exposes it
    pub memory_bytes: Option<u64>,
    /// Global CPU usage since the previous sample, in percent
    pub cpu_percent: f32,
}

impl ResourceSample {
    /// Signed memory change from `earlier` to `self`
    pub fn memory_delta_since(&self, earlier: &ResourceSample) -> Option<i64> {
        match (self.memory_bytes, earlier.memory_bytes) {
            (Some(now), Some(then)) => Some(now as i64 - then as i64),
            _ => None,
        }
    }
}

/// Samples resource usage of the current process
///
/// CPU usage is computed by sysinfo between consecutive refreshes, so the
/// first reading after construction covers the time since `new`.
pub struct ResourceProbe {
    system: System,
    pid: Option<Pid>,
}

impl ResourceProbe {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        Self {
            system,
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    /// Takes a sample of process RSS and global CPU usage
    pub fn sample(&mut self) -> ResourceSample {
        self.system.refresh_cpu_usage();
        let cpu_percent = Some(self.system.global_cpu_usage())
            .filter(|usage| usage.is_finite())
            .unwrap_or(0.0);
        ResourceSample {
            memory_bytes: self.process_memory(),
            cpu_percent,
        }
    }

    /// Current resident memory of this process, in bytes
    pub fn process_memory(&mut self) -> Option<u64> {
        let pid = self.pid?;
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        self.system.process(pid).map(|process| process.memory())
    }
}

impl Default for ResourceProbe {
    fn default() -> Self {
        Self::new()
    }
}
