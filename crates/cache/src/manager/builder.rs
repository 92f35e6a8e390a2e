//! Tool manager builder and initialization

use super::{ToolManager, UnregisterHook};
use crate::config::{CacheConfig, CachePolicy};
use dyntool_core::Result;
use std::collections::HashSet;

/// Builder for [`ToolManager`]
pub struct ToolManagerBuilder {
    config: CacheConfig,
    core_units: HashSet<String>,
    on_unregister: Option<UnregisterHook>,
}

impl ToolManagerBuilder {
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
            core_units: HashSet::new(),
            on_unregister: None,
        }
    }

    pub fn with_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Designate a unit as core: exempt from eviction and from `unload`
    pub fn with_core_unit(mut self, name: impl Into<String>) -> Self {
        self.core_units.insert(name.into());
        self
    }

    pub fn with_core_units<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.core_units.extend(names.into_iter().map(Into::into));
        self
    }

    /// Callback invoked after a unit leaves the store (eviction or unload)
    /// and before any replacement is inserted. Used to release external
    /// registrations keyed by unit name, e.g. a module table.
    ///
    /// Runs while the manager lock is held; it must not call back into the
    /// manager.
    pub fn on_unregister<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_unregister = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Result<ToolManager> {
        self.config.validate()?;
        Ok(ToolManager::from_parts(
            self.config,
            self.core_units,
            self.on_unregister,
        ))
    }
}

impl Default for ToolManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
