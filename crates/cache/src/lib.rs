//! Working-set cache for dynamically loaded tool units
//!
//! This crate keeps a bounded set of loadable units resident and
//! transparently loads and evicts them on demand:
//! - A durable registry mapping unit names to loader procedures
//! - Two interchangeable eviction policies (recency and frequency)
//! - A protected set of core units exempt from eviction
//! - Runtime-adjustable policy and capacity

pub mod config;
pub mod eviction;
pub mod manager;
pub mod registry;
pub mod unit;

pub use config::{CacheConfig, CachePolicy};
pub use eviction::{create_store, EvictionStore, ExemptSet, StoreStats, UnitUsage};
pub use manager::{
    GroupLoadOutcome, ManagerMetrics, ManagerStatistics, ToolManager, ToolManagerBuilder,
    UnitStatus, UnregisterHook,
};
pub use registry::Registry;
pub use unit::{InertUnit, LoadedUnit, Loader, LoaderResult, UnitHandle};
