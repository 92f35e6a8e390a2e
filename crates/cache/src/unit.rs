//! Loaded unit handles and the loader contract

use dyntool_core::BoxedError;
use std::any::Any;
use std::sync::Arc;

/// A tool unit that has been loaded and is (or was) resident in the cache.
///
/// The cache treats the unit as inert data; the only capability it probes
/// for is the cleanup hook, invoked exactly once when the entry is removed
/// (eviction or explicit unload) and before its slot is reused.
///
/// `cleanup` runs while the manager lock is held. It must be fast and must
/// not call back into the manager; a re-entrant call would deadlock.
pub trait LoadedUnit: Send + Sync {
    /// Optional cleanup hook; the default does nothing.
    fn cleanup(&self) {}

    /// Downcast support for consumers that know the concrete unit type.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a loaded unit. The cache hands out clones on hits;
/// the resident entry itself is dropped on eviction.
pub type UnitHandle = Arc<dyn LoadedUnit>;

/// What a loader produces: a handle, or an opaque cause of failure.
pub type LoaderResult = std::result::Result<UnitHandle, BoxedError>;

/// Zero-argument loading procedure registered per unit name. Invoked on
/// cache misses only, under the manager lock.
pub type Loader = Arc<dyn Fn() -> LoaderResult + Send + Sync>;

/// Wrapper turning any plain value into a loadable unit with no cleanup
/// behavior. Useful for units whose payload is passive data.
pub struct InertUnit<T: Send + Sync + 'static> {
    value: T,
}

impl<T: Send + Sync + 'static> InertUnit<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: Send + Sync + 'static> LoadedUnit for InertUnit<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inert_unit_downcast() {
        let handle: UnitHandle = Arc::new(InertUnit::new(42u32));
        let inert = handle
            .as_any()
            .downcast_ref::<InertUnit<u32>>()
            .expect("downcast to the concrete unit type");
        assert_eq!(*inert.value(), 42);
    }
}
