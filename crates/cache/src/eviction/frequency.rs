//! Frequency (least frequently used) eviction store

use super::{run_cleanup, EvictionStore, ExemptSet, StoreStats, UnitUsage};
use crate::unit::UnitHandle;
use indexmap::IndexMap;
use std::time::Instant;

struct FrequencyEntry {
    handle: UnitHandle,
    access_count: u64,
    last_access: Instant,
}

/// Resident units with per-entry access counts and last-access times.
///
/// Victim selection is the minimum access count; ties go to the oldest
/// last access among the tied entries. A freshly inserted unit starts at
/// count 1, so it remains the eviction candidate until it accumulates
/// hits. That cold-start penalty is the accepted cost of protecting
/// often-but-not-recently used units.
pub struct FrequencyStore {
    entries: IndexMap<String, FrequencyEntry>,
    capacity: usize,
    exempt: ExemptSet,
}

impl FrequencyStore {
    pub fn new(capacity: usize, exempt: ExemptSet) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
            exempt,
        }
    }

    fn select_victim(&self) -> Option<String> {
        let mut victim: Option<(&str, u64, Instant)> = None;
        for (name, entry) in &self.entries {
            if self.exempt.contains(name) {
                continue;
            }
            let better = match victim {
                None => true,
                Some((_, count, last_access)) => {
                    entry.access_count < count
                        || (entry.access_count == count && entry.last_access < last_access)
                }
            };
            if better {
                victim = Some((name, entry.access_count, entry.last_access));
            }
        }
        victim.map(|(name, _, _)| name.to_string())
    }
}

impl EvictionStore for FrequencyStore {
    fn get(&mut self, name: &str) -> Option<UnitHandle> {
        let entry = self.entries.get_mut(name)?;
        entry.access_count += 1;
        entry.last_access = Instant::now();
        Some(entry.handle.clone())
    }

    fn put(&mut self, name: &str, handle: UnitHandle) -> Option<String> {
        if let Some(entry) = self.entries.get_mut(name) {
            // Replacement counts as a fresh insertion.
            entry.handle = handle;
            entry.access_count = 1;
            entry.last_access = Instant::now();
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
        self.entries.insert(
            name.to_string(),
            FrequencyEntry {
                handle,
                access_count: 1,
                last_access: Instant::now(),
            },
        );
        evicted
    }

    fn remove(&mut self, name: &str) -> bool {
        match self.entries.shift_remove(name) {
            Some(entry) => {
                run_cleanup(name, &entry.handle);
                true
            }
            None => false,
        }
    }

    fn pop_victim(&mut self) -> Option<String> {
        let victim = self.select_victim()?;
        if let Some(entry) = self.entries.shift_remove(&victim) {
            run_cleanup(&victim, &entry.handle);
        }
        Some(victim)
    }

    fn snapshot(&mut self) -> Vec<(String, UnitHandle)> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(name, entry)| (name, entry.handle))
            .collect()
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            capacity: self.capacity,
            size: self.entries.len(),
            available: self.capacity.saturating_sub(self.entries.len()),
            resident: self.entries.keys().cloned().collect(),
        }
    }

    fn usage(&self, name: &str) -> Option<UnitUsage> {
        self.entries.get(name).map(|entry| UnitUsage {
            access_count: entry.access_count,
            last_access: entry.last_access,
        })
    }

    fn usage_extremes(&self) -> Option<(String, String)> {
        let least = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.access_count)?;
        let most = self
            .entries
            .iter()
            .max_by_key(|(_, entry)| entry.access_count)?;
        Some((least.0.clone(), most.0.clone()))
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
