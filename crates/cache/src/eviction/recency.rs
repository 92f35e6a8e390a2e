//! Recency (least recently used) eviction store

use super::{run_cleanup, EvictionStore, ExemptSet, StoreStats, UnitUsage};
use crate::unit::UnitHandle;
use indexmap::IndexMap;

/// Resident units kept in access order: oldest at the front, freshest at
/// the back. Victim selection is the front-most non-exempt entry; the
/// order is total, so ties cannot occur.
pub struct RecencyStore {
    entries: IndexMap<String, UnitHandle>,
    capacity: usize,
    exempt: ExemptSet,
}

impl RecencyStore {
    pub fn new(capacity: usize, exempt: ExemptSet) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
            exempt,
        }
    }

    fn select_victim(&self) -> Option<String> {
        self.entries
            .keys()
            .find(|name| !self.exempt.contains(*name))
            .cloned()
    }
}

impl EvictionStore for RecencyStore {
    fn get(&mut self, name: &str) -> Option<UnitHandle> {
        let handle = self.entries.shift_remove(name)?;
        // Re-insert at the back: most recently used.
        self.entries.insert(name.to_string(), handle.clone());
        Some(handle)
    }

    fn put(&mut self, name: &str, handle: UnitHandle) -> Option<String> {
        if self.entries.shift_remove(name).is_some() {
            // Replacing an existing entry frees its slot; no eviction.
            self.entries.insert(name.to_string(), handle);
            return None;
        }

        let mut evicted = None;
        if self.entries.len() >= self.capacity {
            evicted = self.pop_victim();
            if evicted.is_none() {
                // Every resident is exempt; admitting the entry would
                // break the capacity bound.
                tracing::warn!(tool = name, "store full of exempt units, insert refused");
                return None;
            }
        }
        self.entries.insert(name.to_string(), handle);
        evicted
    }

    fn remove(&mut self, name: &str) -> bool {
        match self.entries.shift_remove(name) {
            Some(handle) => {
                run_cleanup(name, &handle);
                true
            }
            None => false,
        }
    }

    fn pop_victim(&mut self) -> Option<String> {
        let victim = self.select_victim()?;
        if let Some(handle) = self.entries.shift_remove(&victim) {
            run_cleanup(&victim, &handle);
        }
        Some(victim)
    }

    fn snapshot(&mut self) -> Vec<(String, UnitHandle)> {
        std::mem::take(&mut self.entries).into_iter().collect()
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            capacity: self.capacity,
            size: self.entries.len(),
            available: self.capacity.saturating_sub(self.entries.len()),
            resident: self.entries.keys().cloned().collect(),
        }
    }

    fn usage(&self, _name: &str) -> Option<UnitUsage> {
        None
    }

    fn usage_extremes(&self) -> Option<(String, String)> {
        None
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}
