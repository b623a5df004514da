/// Host telemetry sampling and bounded history
///
/// A single background task captures host resource usage at a fixed cadence
/// into a fixed-capacity, oldest-first buffer. The buffer is per-instance by
/// design: the metrics are local-host readings, not cluster state.
///
/// - **collector**: sysinfo-backed CPU / memory / disk capture
/// - **history**: bounded buffer with reader/writer discipline
/// - **sampler**: the timer loop and its shutdown handle
pub mod collector;
pub mod history;
pub mod sampler;

pub use collector::HostMetricsCollector;
pub use history::MetricHistory;
pub use sampler::{spawn_sampler, SamplerHandle};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{GuardError, Result};

/// One host resource reading. Immutable once validated.
///
/// Serializes with the field names the history endpoint exposes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu_usage_percent: f32,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub disk_usage_percent: f32,
}

impl MetricSnapshot {
    /// Enforce the snapshot invariants before it may enter history.
    ///
    /// Percentages are clamped to [0, 100] and memory-used to memory-total;
    /// non-finite readings reject the snapshot outright.
    pub fn validated(mut self) -> Result<Self> {
        if !self.cpu_usage_percent.is_finite() || !self.disk_usage_percent.is_finite() {
            return Err(GuardError::InvalidSample(
                "non-finite percentage reading".to_string(),
            ));
        }

        self.cpu_usage_percent = self.cpu_usage_percent.clamp(0.0, 100.0);
        self.disk_usage_percent = self.disk_usage_percent.clamp(0.0, 100.0);
        if self.memory_used_bytes > self.memory_total_bytes {
            self.memory_used_bytes = self.memory_total_bytes;
        }

        Ok(self)
    }
}
