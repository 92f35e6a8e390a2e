//! Working-set manager orchestrating the registry and the active store

mod builder;
mod statistics;

pub use builder::ToolManagerBuilder;
pub use statistics::ManagerStatistics;

use crate::config::{CacheConfig, CachePolicy};
use crate::eviction::{create_store, EvictionStore, ExemptSet, StoreStats};
use crate::registry::Registry;
use crate::unit::{LoaderResult, UnitHandle};
use dyntool_core::{Error, Result, LOW_USAGE_THRESHOLD};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Callback releasing a unit's external registration (e.g. a module table
/// slot) right after the unit leaves the store.
pub type UnregisterHook = Box<dyn Fn(&str) + Send + Sync>;

/// Status of a single unit from the manager's point of view
#[derive(Debug, Clone, Serialize)]
pub struct UnitStatus {
    pub name: String,
    pub resident: bool,
    pub protected: bool,
    pub group: Option<String>,
    /// Populated only under the frequency policy
    pub access_count: Option<u64>,
    /// Time since the last access; populated only under the frequency policy
    pub idle: Option<Duration>,
}

/// Snapshot of cache occupancy, configuration, and counters
#[derive(Debug, Clone, Serialize)]
pub struct ManagerMetrics {
    pub cache: StoreStats,
    pub policy: CachePolicy,
    pub capacity: usize,
    pub statistics: ManagerStatistics,
    pub least_used: Option<String>,
    pub most_used: Option<String>,
}

/// Result of a group load: per-unit failures never abort the rest.
#[derive(Default)]
pub struct GroupLoadOutcome {
    pub loaded: Vec<(String, UnitHandle)>,
    pub failures: Vec<(String, Error)>,
}

struct ManagerState {
    registry: Registry,
    store: Box<dyn EvictionStore>,
    config: CacheConfig,
    stats: ManagerStatistics,
}

/// Capacity-bounded cache of loadable tool units.
///
/// A single lock serializes every operation, including loader invocations
/// and cleanup hooks. Loaders and hooks therefore must be fast and must
/// not call back into the manager; a re-entrant call deadlocks. A slow
/// loader stalls concurrent loads of *other* names as well.
pub struct ToolManager {
    state: Mutex<ManagerState>,
    exempt: ExemptSet,
    on_unregister: Option<UnregisterHook>,
}

impl ToolManager {
    /// Manager with the given configuration and no core units
    pub fn new(config: CacheConfig) -> Result<Self> {
        ToolManagerBuilder::new().with_config(config).build()
    }

    pub fn builder() -> ToolManagerBuilder {
        ToolManagerBuilder::new()
    }

    pub(crate) fn from_parts(
        config: CacheConfig,
        core_units: HashSet<String>,
        on_unregister: Option<UnregisterHook>,
    ) -> Self {
        let exempt: ExemptSet = Arc::new(core_units);
        let store = create_store(config.policy, config.capacity, Arc::clone(&exempt));
        tracing::info!(
            policy = %config.policy,
            capacity = config.capacity,
            core_units = exempt.len(),
            "tool manager initialized"
        );
        Self {
            state: Mutex::new(ManagerState {
                registry: Registry::new(),
                store,
                config,
                stats: ManagerStatistics::new(),
            }),
            exempt,
            on_unregister,
        }
    }

    /// Register a unit's loader. Idempotent; re-registering overwrites the
    /// previous loader. Does not touch the store.
    pub fn register<F>(&self, name: &str, loader: F, group: Option<&str>) -> Result<()>
    where
        F: Fn() -> LoaderResult + Send + Sync + 'static,
    {
        let mut state = self.state.lock();
        state.registry.register(name, Arc::new(loader), group)?;
        tracing::debug!(tool = name, group = group.unwrap_or("core"), "registered tool");
        Ok(())
    }

    /// Load a unit, returning the cached handle on a hit or invoking the
    /// registered loader on a miss. A failed load leaves the store
    /// unchanged.
    pub fn load(&self, name: &str) -> Result<UnitHandle> {
        let mut state = self.state.lock();

        if let Some(handle) = state.store.get(name) {
            state.stats.record_hit();
            return Ok(handle);
        }
        state.stats.record_miss();

        let loader = state
            .registry
            .loader(name)
            .ok_or_else(|| Error::not_registered(name))?;

        let handle = match loader() {
            Ok(handle) => handle,
            Err(source) => {
                state.stats.record_load_failure();
                tracing::warn!(tool = name, error = %source, "loader failed");
                return Err(Error::load_failed(name, source));
            }
        };
        state.stats.record_load();

        // Free the slot first so the external unregister hook for the
        // victim runs before the new entry lands.
        if state.store.len() >= state.store.capacity() && !state.store.contains(name) {
            match state.store.pop_victim() {
                Some(victim) => {
                    state.stats.record_eviction();
                    tracing::info!(evicted = %victim, loading = name, "evicted unit to free a slot");
                    self.notify_unregister(&victim);
                }
                None => {
                    return Err(Error::invalid_capacity(
                        state.store.capacity(),
                        "every resident unit is protected; cannot admit a new unit",
                    ));
                }
            }
        }

        let displaced = state.store.put(name, handle.clone());
        debug_assert!(displaced.is_none());
        tracing::debug!(tool = name, "loaded unit");
        Ok(handle)
    }

    /// Load every registered unit in `group`. Per-unit failures are
    /// collected, not fatal.
    pub fn load_group(&self, group: &str) -> GroupLoadOutcome {
        let members = self.state.lock().registry.members(group);
        if members.is_empty() {
            tracing::debug!(group, "no registered units in group");
        }

        let mut outcome = GroupLoadOutcome::default();
        for name in members {
            match self.load(&name) {
                Ok(handle) => outcome.loaded.push((name, handle)),
                Err(error) => outcome.failures.push((name, error)),
            }
        }
        outcome
    }

    /// Remove a unit from the store. Returns `false` for core units and
    /// for units that are not resident; `is_protected` distinguishes the
    /// two.
    pub fn unload(&self, name: &str) -> bool {
        if self.exempt.contains(name) {
            tracing::warn!(tool = name, "refusing to unload core unit");
            return false;
        }
        let mut state = self.state.lock();
        let removed = state.store.remove(name);
        if removed {
            state.stats.record_unload();
            self.notify_unregister(name);
            tracing::info!(tool = name, "unloaded unit");
        }
        removed
    }

    /// Unload every non-protected resident unit in `group`; returns the
    /// count actually removed.
    pub fn unload_group(&self, group: &str) -> usize {
        let members = self.state.lock().registry.members(group);
        members.iter().filter(|name| self.unload(name.as_str())).count()
    }

    /// Whether `name` belongs to the never-evictable core set
    pub fn is_protected(&self, name: &str) -> bool {
        self.exempt.contains(name)
    }

    pub fn status(&self, name: &str) -> UnitStatus {
        let state = self.state.lock();
        let usage = state.store.usage(name);
        UnitStatus {
            name: name.to_string(),
            resident: state.store.contains(name),
            protected: self.exempt.contains(name),
            group: state.registry.group_of(name).map(str::to_string),
            access_count: usage.map(|usage| usage.access_count),
            idle: usage.map(|usage| usage.last_access.elapsed()),
        }
    }

    pub fn metrics(&self) -> ManagerMetrics {
        let state = self.state.lock();
        let (least_used, most_used) = match state.store.usage_extremes() {
            Some((least, most)) => (Some(least), Some(most)),
            None => (None, None),
        };
        ManagerMetrics {
            cache: state.store.stats(),
            policy: state.config.policy,
            capacity: state.config.capacity,
            statistics: state.stats.clone(),
            least_used,
            most_used,
        }
    }

    /// Switch the eviction policy, migrating every resident entry into a
    /// fresh store without invoking any loader. A no-op if the policy is
    /// unchanged.
    pub fn set_policy(&self, policy: CachePolicy) -> Result<()> {
        let mut state = self.state.lock();
        if policy == state.config.policy {
            return Ok(());
        }

        let snapshot = state.store.snapshot();
        let mut store = create_store(policy, state.config.capacity, Arc::clone(&self.exempt));
        for (name, handle) in snapshot {
            // Cannot evict: the snapshot size is bounded by the capacity.
            let evicted = store.put(&name, handle);
            debug_assert!(evicted.is_none());
        }
        state.store = store;
        state.config.policy = policy;
        tracing::info!(policy = %policy, "cache policy changed");
        Ok(())
    }

    /// Parse-and-set variant of [`set_policy`](Self::set_policy); fails
    /// with `InvalidPolicy` on unrecognized identifiers.
    pub fn set_policy_name(&self, policy: &str) -> Result<()> {
        self.set_policy(policy.parse()?)
    }

    /// Change the capacity, evicting per the active policy until the
    /// resident count fits. Fails if the new capacity cannot hold the
    /// resident core units. Returns the number of evictions performed.
    pub fn resize(&self, new_capacity: usize) -> Result<usize> {
        let mut state = self.state.lock();
        if new_capacity < 1 {
            return Err(Error::invalid_capacity(
                new_capacity,
                "capacity must be at least 1",
            ));
        }

        let resident_protected = state
            .store
            .stats()
            .resident
            .iter()
            .filter(|name| self.exempt.contains(name.as_str()))
            .count();
        if new_capacity < resident_protected {
            return Err(Error::invalid_capacity(
                new_capacity,
                format!("{resident_protected} resident core units cannot be evicted"),
            ));
        }

        let mut evicted = 0;
        while state.store.len() > new_capacity {
            match state.store.pop_victim() {
                Some(victim) => {
                    evicted += 1;
                    state.stats.record_eviction();
                    tracing::info!(evicted = %victim, "evicted unit during resize");
                    self.notify_unregister(&victim);
                }
                None => break,
            }
        }
        state.store.set_capacity(new_capacity);
        state.config.capacity = new_capacity;
        tracing::info!(capacity = new_capacity, evictions = evicted, "cache capacity changed");
        Ok(evicted)
    }

    /// Policy-specific housekeeping: under the frequency policy, evict
    /// every non-protected resident whose access count is at or below the
    /// low-usage threshold. A no-op under the recency policy. Returns the
    /// count evicted.
    pub fn optimize(&self) -> usize {
        let mut state = self.state.lock();
        if state.config.policy != CachePolicy::Frequency {
            tracing::debug!("optimize is a no-op under the recency policy");
            return 0;
        }

        let candidates: Vec<String> = state
            .store
            .stats()
            .resident
            .into_iter()
            .filter(|name| !self.exempt.contains(name.as_str()))
            .filter(|name| {
                state
                    .store
                    .usage(name)
                    .map_or(false, |usage| usage.access_count <= LOW_USAGE_THRESHOLD)
            })
            .collect();

        let mut evicted = 0;
        for name in candidates {
            if state.store.remove(&name) {
                evicted += 1;
                state.stats.record_eviction();
                self.notify_unregister(&name);
            }
        }
        if evicted > 0 {
            tracing::info!(evictions = evicted, "optimize evicted low-usage units");
        }
        evicted
    }

    /// All registered names, in registration order
    pub fn registered(&self) -> Vec<String> {
        self.state.lock().registry.names()
    }

    /// Registered names belonging to `group`
    pub fn group_members(&self, group: &str) -> Vec<String> {
        self.state.lock().registry.members(group)
    }

    /// Currently resident names, in the active store's order
    pub fn resident(&self) -> Vec<String> {
        self.state.lock().store.stats().resident
    }

    pub fn is_resident(&self, name: &str) -> bool {
        self.state.lock().store.contains(name)
    }

    fn notify_unregister(&self, name: &str) {
        if let Some(hook) = &self.on_unregister {
            hook(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::InertUnit;

    fn manager(capacity: usize, policy: CachePolicy) -> ToolManager {
        ToolManagerBuilder::new()
            .with_capacity(capacity)
            .with_policy(policy)
            .build()
            .unwrap()
    }

    fn register_inert(manager: &ToolManager, name: &str, group: Option<&str>) {
        let tag = name.to_string();
        manager
            .register(
                name,
                move || {
                    let handle: UnitHandle = Arc::new(InertUnit::new(tag.clone()));
                    Ok(handle)
                },
                group,
            )
            .unwrap();
    }

    #[test]
    fn test_load_of_unregistered_unit_fails() {
        let manager = manager(2, CachePolicy::Recency);
        let err = manager.load("nope").err().unwrap();
        assert!(matches!(err, Error::NotRegistered { .. }));
    }

    #[test]
    fn test_protected_units_refuse_unload() {
        let manager = ToolManagerBuilder::new()
            .with_capacity(4)
            .with_core_unit("execute_packet")
            .build()
            .unwrap();
        register_inert(&manager, "execute_packet", None);
        manager.load("execute_packet").unwrap();

        assert!(!manager.unload("execute_packet"));
        assert!(manager.is_resident("execute_packet"));
        assert!(manager.is_protected("execute_packet"));
    }

    #[test]
    fn test_load_fails_when_every_resident_is_protected() {
        let manager = ToolManagerBuilder::new()
            .with_capacity(1)
            .with_policy(CachePolicy::Recency)
            .with_core_unit("core_a")
            .build()
            .unwrap();
        register_inert(&manager, "core_a", None);
        register_inert(&manager, "extra", None);

        manager.load("core_a").unwrap();
        let err = manager.load("extra").err().unwrap();
        assert!(matches!(err, Error::InvalidCapacity { .. }));
        assert_eq!(manager.resident(), vec!["core_a"]);
    }
}
