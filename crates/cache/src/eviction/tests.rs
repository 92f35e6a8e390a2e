//! Tests for the eviction stores

use super::*;
use crate::unit::{InertUnit, LoadedUnit};
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::sleep;
use std::time::Duration;

struct TrackedUnit {
    cleaned: Arc<AtomicBool>,
}

impl LoadedUnit for TrackedUnit {
    fn cleanup(&self) {
        self.cleaned.store(true, Ordering::SeqCst);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct PanickingUnit;

impl LoadedUnit for PanickingUnit {
    fn cleanup(&self) {
        panic!("cleanup failure");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn handle(tag: &'static str) -> UnitHandle {
    Arc::new(InertUnit::new(tag))
}

fn no_exempt() -> ExemptSet {
    Arc::new(HashSet::new())
}

fn exempting(names: &[&str]) -> ExemptSet {
    Arc::new(names.iter().map(|n| n.to_string()).collect())
}

#[test]
fn test_recency_evicts_oldest() {
    let mut store = RecencyStore::new(2, no_exempt());

    assert_eq!(store.put("a", handle("a")), None);
    assert_eq!(store.put("b", handle("b")), None);
    assert_eq!(store.put("c", handle("c")), Some("a".to_string()));

    assert!(!store.contains("a"));
    assert!(store.contains("b"));
    assert!(store.contains("c"));
}

#[test]
fn test_recency_get_promotes() {
    let mut store = RecencyStore::new(2, no_exempt());
    store.put("a", handle("a"));
    store.put("b", handle("b"));

    // Touch 'a' so 'b' becomes the oldest.
    assert!(store.get("a").is_some());
    assert_eq!(store.put("c", handle("c")), Some("b".to_string()));
    assert!(store.contains("a"));
}

#[test]
fn test_recency_get_never_evicts() {
    let mut store = RecencyStore::new(1, no_exempt());
    store.put("a", handle("a"));
    assert!(store.get("missing").is_none());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_frequency_evicts_minimum_count() {
    let mut store = FrequencyStore::new(2, no_exempt());
    store.put("a", handle("a"));
    store.put("b", handle("b"));

    for _ in 0..3 {
        store.get("a");
    }

    assert_eq!(store.put("c", handle("c")), Some("b".to_string()));
    assert!(store.contains("a"));
}

#[test]
fn test_frequency_tie_broken_by_oldest_access() {
    let mut store = FrequencyStore::new(2, no_exempt());
    store.put("a", handle("a"));
    sleep(Duration::from_millis(2));
    store.put("b", handle("b"));

    // Equal counts (1 each); 'a' has the older last-access.
    assert_eq!(store.put("c", handle("c")), Some("a".to_string()));
}

#[test]
fn test_frequency_recent_tie_prefers_staler_entry() {
    let mut store = FrequencyStore::new(2, no_exempt());
    store.put("a", handle("a"));
    store.put("b", handle("b"));

    // Both counts go to 2, but 'b' is refreshed after 'a'.
    store.get("a");
    sleep(Duration::from_millis(2));
    store.get("b");

    assert_eq!(store.put("c", handle("c")), Some("a".to_string()));
}

#[test]
fn test_frequency_usage_tracking() {
    let mut store = FrequencyStore::new(4, no_exempt());
    store.put("a", handle("a"));

    let usage = store.usage("a").expect("resident unit has usage");
    assert_eq!(usage.access_count, 1);

    store.get("a");
    store.get("a");
    assert_eq!(store.usage("a").unwrap().access_count, 3);
    assert!(store.usage("missing").is_none());
}

#[test]
fn test_frequency_usage_extremes() {
    let mut store = FrequencyStore::new(4, no_exempt());
    store.put("rare", handle("r"));
    store.put("popular", handle("p"));
    for _ in 0..5 {
        store.get("popular");
    }

    let (least, most) = store.usage_extremes().unwrap();
    assert_eq!(least, "rare");
    assert_eq!(most, "popular");
}

#[test]
fn test_exempt_names_never_evicted() {
    for policy in [CachePolicy::Recency, CachePolicy::Frequency] {
        let mut store = create_store(policy, 2, exempting(&["core_x"]));
        store.put("core_x", handle("core"));
        store.put("a", handle("a"));

        // 'core_x' is both oldest and least used, but exempt.
        assert_eq!(store.put("b", handle("b")), Some("a".to_string()));
        assert!(store.contains("core_x"));
    }
}

#[test]
fn test_put_refused_when_every_resident_is_exempt() {
    for policy in [CachePolicy::Recency, CachePolicy::Frequency] {
        let mut store = create_store(policy, 1, exempting(&["core_x"]));
        store.put("core_x", handle("core"));

        assert_eq!(store.put("extra", handle("extra")), None);
        assert!(!store.contains("extra"));
        assert!(store.contains("core_x"));
        assert_eq!(store.len(), 1);
        assert!(store.len() <= store.capacity());
    }
}

#[test]
fn test_pop_victim_returns_none_when_all_exempt() {
    let mut store = RecencyStore::new(2, exempting(&["core_x"]));
    store.put("core_x", handle("core"));
    assert_eq!(store.pop_victim(), None);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_cleanup_runs_on_eviction_and_remove() {
    let evicted_flag = Arc::new(AtomicBool::new(false));
    let removed_flag = Arc::new(AtomicBool::new(false));

    let mut store = RecencyStore::new(1, no_exempt());
    store.put(
        "a",
        Arc::new(TrackedUnit {
            cleaned: Arc::clone(&evicted_flag),
        }),
    );
    store.put(
        "b",
        Arc::new(TrackedUnit {
            cleaned: Arc::clone(&removed_flag),
        }),
    );
    assert!(evicted_flag.load(Ordering::SeqCst));

    assert!(store.remove("b"));
    assert!(removed_flag.load(Ordering::SeqCst));
    assert!(!store.remove("b"));
}

#[test]
fn test_cleanup_panic_does_not_abort_eviction() {
    let mut store = FrequencyStore::new(1, no_exempt());
    store.put("bad", Arc::new(PanickingUnit));

    assert_eq!(store.put("good", handle("g")), Some("bad".to_string()));
    assert!(store.contains("good"));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_snapshot_drains_without_cleanup() {
    let flag = Arc::new(AtomicBool::new(false));
    let mut store = RecencyStore::new(3, no_exempt());
    store.put(
        "a",
        Arc::new(TrackedUnit {
            cleaned: Arc::clone(&flag),
        }),
    );
    store.put("b", handle("b"));
    store.get("a");

    let snapshot = store.snapshot();
    let names: Vec<&str> = snapshot.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
    assert!(store.is_empty());
    assert!(!flag.load(Ordering::SeqCst));
}

#[test]
fn test_store_stats() {
    let mut store = FrequencyStore::new(5, no_exempt());
    store.put("a", handle("a"));
    store.put("b", handle("b"));

    let stats = store.stats();
    assert_eq!(stats.capacity, 5);
    assert_eq!(stats.size, 2);
    assert_eq!(stats.available, 3);
    assert_eq!(stats.resident, vec!["a", "b"]);
}
