use chrono::Utc;
use sysinfo::{CpuExt, DiskExt, System, SystemExt};

use super::MetricSnapshot;

/// Host resource collector backed by `sysinfo`.
///
/// Holds one `System` for the process lifetime; CPU usage is a delta against
/// the previous refresh, so the constructor primes an initial reading.
pub struct HostMetricsCollector {
    system: System,
}

impl HostMetricsCollector {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_disks_list();
        system.refresh_cpu();
        Self { system }
    }

    /// Capture current CPU, memory, and aggregate disk usage.
    pub fn collect(&mut self) -> MetricSnapshot {
        self.system.refresh_cpu();
        self.system.refresh_memory();
        self.system.refresh_disks();

        let (total_space, available_space) = self
            .system
            .disks()
            .iter()
            .fold((0u64, 0u64), |(total, available), disk| {
                (
                    total + disk.total_space(),
                    available + disk.available_space(),
                )
            });
        let disk_usage_percent = if total_space > 0 {
            ((total_space - available_space) as f64 / total_space as f64 * 100.0) as f32
        } else {
            0.0
        };

        MetricSnapshot {
            timestamp: Utc::now(),
            cpu_usage_percent: self.system.global_cpu_info().cpu_usage(),
            memory_used_bytes: self.system.used_memory(),
            memory_total_bytes: self.system.total_memory(),
            disk_usage_percent,
        }
    }
}

impl Default for HostMetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
