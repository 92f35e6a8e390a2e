//! Durable registry mapping unit names to loader procedures
//!
//! The registry never evicts: once registered, a unit stays known for the
//! process lifetime. Residency is tracked separately by the eviction store.

use crate::unit::Loader;
use dyntool_core::{Error, Result};
use indexmap::IndexMap;
use std::sync::Arc;

struct RegisteredUnit {
    loader: Loader,
    group: Option<String>,
}

/// Name → (loader, owning group) mapping, in first-registration order.
#[derive(Default)]
pub struct Registry {
    units: IndexMap<String, RegisteredUnit>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit. Idempotent: re-registering a name overwrites its
    /// loader and group while keeping its original position.
    pub fn register(&mut self, name: &str, loader: Loader, group: Option<&str>) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::invalid_name("name must not be empty"));
        }
        self.units.insert(
            name.to_string(),
            RegisteredUnit {
                loader,
                group: group.map(str::to_string),
            },
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    /// Loader for a registered unit, if any
    pub fn loader(&self, name: &str) -> Option<Loader> {
        self.units.get(name).map(|unit| Arc::clone(&unit.loader))
    }

    /// Owning group of a registered unit, if one was given
    pub fn group_of(&self, name: &str) -> Option<&str> {
        self.units.get(name).and_then(|unit| unit.group.as_deref())
    }

    /// Names of every unit registered under `group`, in registration order
    pub fn members(&self, group: &str) -> Vec<String> {
        self.units
            .iter()
            .filter(|(_, unit)| unit.group.as_deref() == Some(group))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// All registered names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.units.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
