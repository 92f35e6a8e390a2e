//! Manager statistics tracking and reporting

use serde::{Deserialize, Serialize};

/// Counters for manager operations. Mutated under the manager lock, so a
/// plain struct suffices; snapshots are handed out by clone.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ManagerStatistics {
    /// Loads answered from the resident store
    pub hits: u64,
    /// Loads that had to consult the registry
    pub misses: u64,
    /// Successful loader invocations
    pub loads: u64,
    /// Loader invocations that failed
    pub load_failures: u64,
    /// Automatic removals (capacity pressure, resize, optimize)
    pub evictions: u64,
    /// Explicit removals through `unload`
    pub unloads: u64,
}

impl ManagerStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_load(&mut self) {
        self.loads += 1;
    }

    pub fn record_load_failure(&mut self) {
        self.load_failures += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_unload(&mut self) {
        self.unloads += 1;
    }

    /// Hit rate as a percentage of all lookups
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}
