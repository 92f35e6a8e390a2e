//! Shared constants for the tool working-set manager

/// Default maximum number of simultaneously resident tool units.
pub const DEFAULT_CAPACITY: usize = 80;

/// Access-count threshold at or below which `optimize` considers a
/// resident unit evictable under the frequency policy.
pub const LOW_USAGE_THRESHOLD: u64 = 1;
