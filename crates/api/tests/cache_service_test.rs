use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use api::cache::{CacheBackend, CacheService};

struct FailingBackend {
    calls: Arc<AtomicUsize>,
}

impl FailingBackend {
    fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl CacheBackend for FailingBackend {
    fn get(&self, _key: &str) -> Result<Option<Value>, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err("connection refused".to_string())
    }

    fn set(&self, _key: &str, _value: Value, _ttl_seconds: i64) -> Result<(), String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err("connection refused".to_string())
    }

    fn del(&self, _key: &str) -> Result<(), String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err("connection refused".to_string())
    }
}

#[test]
fn memory_backend_roundtrip() {
    let cache = CacheService::in_memory();

    assert!(cache.get("analysis:performance:000001:365").is_none());
    cache.set(
        "analysis:performance:000001:365",
        json!({"total_return": 12.34}),
        1800,
    );
    assert_eq!(
        cache.get("analysis:performance:000001:365"),
        Some(json!({"total_return": 12.34}))
    );

    cache.del("analysis:performance:000001:365");
    assert!(cache.get("analysis:performance:000001:365").is_none());
}

#[test]
fn zero_ttl_stores_without_expiry() {
    let cache = CacheService::in_memory();
    cache.set("k", json!(1), 0);
    assert_eq!(cache.get("k"), Some(json!(1)));
    cache.set("k2", json!(2), -5);
    assert_eq!(cache.get("k2"), Some(json!(2)));
}

#[test]
fn overwrite_replaces_value() {
    let cache = CacheService::in_memory();
    cache.set("k", json!("old"), 60);
    cache.set("k", json!("new"), 60);
    assert_eq!(cache.get("k"), Some(json!("new")));
}

#[test]
fn first_backend_error_trips_breaker() {
    let cache = CacheService::new(Box::new(FailingBackend::new()));
    assert!(cache.enabled());

    assert!(cache.get("k").is_none());
    assert!(!cache.enabled());

    // disabled cache never reaches the backend again
    cache.set("k", json!(1), 60);
    assert!(cache.get("k").is_none());
    cache.del("k");
    assert!(!cache.enabled());
}

#[test]
fn tripped_breaker_stops_backend_calls() {
    let backend = FailingBackend::new();
    let calls = Arc::clone(&backend.calls);
    let cache = CacheService::new(Box::new(backend));

    cache.set("k", json!(1), 60);
    cache.get("k");
    cache.get("k");
    cache.del("k");

    // only the tripping call hit the backend
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn reset_rearms_breaker() {
    let cache = CacheService::new(Box::new(FailingBackend::new()));
    cache.set("k", json!(1), 60);
    assert!(!cache.enabled());

    cache.reset();
    assert!(cache.enabled());

    // next backend error trips it again
    assert!(cache.get("k").is_none());
    assert!(!cache.enabled());
}
