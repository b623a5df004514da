use parking_lot::RwLock;
use std::collections::VecDeque;

use super::MetricSnapshot;

/// Snapshots retained per instance.
pub const DEFAULT_CAPACITY: usize = 100;

/// Fixed-capacity, chronologically ordered snapshot buffer.
///
/// `push` takes the write lock and evicts the oldest entry at capacity;
/// `history` takes the read lock, so any number of readers proceed together
/// but never concurrently with a writer. Neither lock is held across I/O.
pub struct MetricHistory {
    capacity: usize,
    window: RwLock<VecDeque<MetricSnapshot>>,
}

impl MetricHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            window: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append a snapshot, evicting the oldest entry when full.
    pub fn push(&self, snapshot: MetricSnapshot) {
        let mut window = self.window.write();
        if window.len() == self.capacity {
            window.pop_front();
        }
        window.push_back(snapshot);
    }

    /// Oldest-first copy of the buffer. Later pushes never show through the
    /// returned sequence.
    pub fn history(&self) -> Vec<MetricSnapshot> {
        self.window.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.window.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.read().is_empty()
    }
}

impl Default for MetricHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn snapshot(seq: i64) -> MetricSnapshot {
        MetricSnapshot {
            timestamp: Utc.timestamp_opt(seq, 0).unwrap(),
            cpu_usage_percent: 10.0,
            memory_used_bytes: 100,
            memory_total_bytes: 200,
            disk_usage_percent: 20.0,
        }
    }

    #[test]
    fn test_empty_history() {
        let history = MetricHistory::default();
        assert!(history.is_empty());
        assert!(history.history().is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest_first() {
        let history = MetricHistory::default();
        for seq in 0..101 {
            history.push(snapshot(seq));
        }

        let entries = history.history();
        assert_eq!(entries.len(), 100);
        // 1st snapshot evicted, 2nd through 101st retained in order
        assert_eq!(entries[0].timestamp.timestamp(), 1);
        assert_eq!(entries[99].timestamp.timestamp(), 100);
        assert!(entries
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp));
    }

    #[test]
    fn test_history_is_a_defensive_copy() {
        let history = MetricHistory::default();
        history.push(snapshot(0));

        let copy = history.history();
        history.push(snapshot(1));

        assert_eq!(copy.len(), 1);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_concurrent_push_and_history() {
        let history = Arc::new(MetricHistory::default());

        let writer = {
            let history = Arc::clone(&history);
            std::thread::spawn(move || {
                for seq in 0..500 {
                    history.push(snapshot(seq));
                }
            })
        };

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let history = Arc::clone(&history);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let entries = history.history();
                        assert!(entries.len() <= 100);
                        // never a torn view: strictly chronological
                        assert!(entries
                            .windows(2)
                            .all(|pair| pair[0].timestamp < pair[1].timestamp));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }

        assert_eq!(history.len(), 100);
        assert_eq!(history.history()[99].timestamp.timestamp(), 499);
    }
}
