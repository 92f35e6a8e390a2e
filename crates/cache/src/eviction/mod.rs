//! Eviction stores for the resident working set
//!
//! Two interchangeable policies over the same small contract: recency
//! (least recently used) and frequency (least frequently used with a
//! recency tie-break). Core units named in the exempt set are never
//! selected as victims.

mod frequency;
mod recency;

pub use frequency::FrequencyStore;
pub use recency::RecencyStore;

use crate::config::CachePolicy;
use crate::unit::UnitHandle;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Names exempt from eviction, shared between manager and store.
pub type ExemptSet = Arc<HashSet<String>>;

/// Point-in-time snapshot of a store's occupancy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub capacity: usize,
    pub size: usize,
    pub available: usize,
    /// Resident names in the store's internal order
    pub resident: Vec<String>,
}

/// Per-entry access bookkeeping, tracked only by the frequency policy
#[derive(Debug, Clone, Copy)]
pub struct UnitUsage {
    pub access_count: u64,
    pub last_access: Instant,
}

/// Ordered associative container of resident units with a policy-specific
/// victim selection rule.
pub trait EvictionStore: Send {
    /// Look up a resident unit, recording the access per the policy's
    /// bookkeeping rules. Never evicts.
    fn get(&mut self, name: &str) -> Option<UnitHandle>;

    /// Insert a unit, evicting exactly one non-exempt victim first if the
    /// store is full. The victim's cleanup hook runs before the insert;
    /// its name is returned so the caller can release external state.
    /// If the store is full and every resident is exempt, the insert is
    /// refused: the entry is dropped and the size never exceeds the
    /// capacity. `contains` distinguishes refusal from a plain insert.
    fn put(&mut self, name: &str, handle: UnitHandle) -> Option<String>;

    /// Unconditional removal; runs the cleanup hook. Returns whether an
    /// entry was actually removed.
    fn remove(&mut self, name: &str) -> bool;

    /// Evict one entry per the policy rule, skipping exempt names.
    /// Returns the victim's name, or `None` if every resident is exempt.
    fn pop_victim(&mut self) -> Option<String>;

    /// Drain every entry in internal order, without running cleanup hooks.
    /// Used for policy migration; the entries stay logically resident.
    fn snapshot(&mut self) -> Vec<(String, UnitHandle)>;

    fn stats(&self) -> StoreStats;

    /// Access bookkeeping for a resident unit; `None` when the policy does
    /// not track usage or the unit is not resident.
    fn usage(&self, name: &str) -> Option<UnitUsage>;

    /// Least- and most-accessed resident names, when the policy tracks counts
    fn usage_extremes(&self) -> Option<(String, String)>;

    fn set_capacity(&mut self, capacity: usize);
    fn capacity(&self) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn contains(&self, name: &str) -> bool;
}

/// Store factory keyed on the configured policy
pub fn create_store(
    policy: CachePolicy,
    capacity: usize,
    exempt: ExemptSet,
) -> Box<dyn EvictionStore> {
    match policy {
        CachePolicy::Recency => Box::new(RecencyStore::new(capacity, exempt)),
        CachePolicy::Frequency => Box::new(FrequencyStore::new(capacity, exempt)),
    }
}

/// Run a removed entry's cleanup hook, containing panics. A failing hook
/// never aborts the removal; the slot is freed either way.
pub(crate) fn run_cleanup(name: &str, handle: &UnitHandle) {
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handle.cleanup()));
    if outcome.is_err() {
        tracing::warn!(tool = name, "cleanup hook panicked during removal");
    }
}

#[cfg(test)]
mod tests;
