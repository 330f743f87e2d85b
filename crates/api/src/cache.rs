use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde_json::Value;

pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, String>;
    /// `ttl_seconds <= 0` stores without expiry.
    fn set(&self, key: &str, value: Value, ttl_seconds: i64) -> Result<(), String>;
    fn del(&self, key: &str) -> Result<(), String>;
}

#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, (Value, Option<Instant>)>>,
}

impl CacheBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Value>, String> {
        let expired = {
            let guard = self.entries.read().map_err(|e| e.to_string())?;
            match guard.get(key) {
                None => return Ok(None),
                Some((_, Some(deadline))) if *deadline <= Instant::now() => true,
                Some((value, _)) => return Ok(Some(value.clone())),
            }
        };
        if expired {
            let mut guard = self.entries.write().map_err(|e| e.to_string())?;
            guard.remove(key);
        }
        Ok(None)
    }

    fn set(&self, key: &str, value: Value, ttl_seconds: i64) -> Result<(), String> {
        let deadline = if ttl_seconds > 0 {
            Some(Instant::now() + Duration::from_secs(ttl_seconds as u64))
        } else {
            None
        };
        let mut guard = self.entries.write().map_err(|e| e.to_string())?;
        guard.insert(key.to_string(), (value, deadline));
        Ok(())
    }

    fn del(&self, key: &str) -> Result<(), String> {
        let mut guard = self.entries.write().map_err(|e| e.to_string())?;
        guard.remove(key);
        Ok(())
    }
}

/// Fire-and-forget cache with a circuit breaker: the first backend
/// error disables caching for the rest of the process lifetime. The
/// breaker is owned state, not a module-level flag; `reset` re-arms it.
#[derive(Clone)]
pub struct CacheService {
    inner: Arc<InnerCache>,
}

struct InnerCache {
    backend: Box<dyn CacheBackend>,
    enabled: AtomicBool,
}

impl CacheService {
    pub fn new(backend: Box<dyn CacheBackend>) -> Self {
        Self {
            inner: Arc::new(InnerCache {
                backend,
                enabled: AtomicBool::new(true),
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::default()))
    }

    pub fn enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.inner.enabled.store(true, Ordering::Relaxed);
    }

    fn disable(&self, op: &str, key: &str, err: &str) {
        tracing::warn!(%op, %key, error = %err, "cache backend error, disabling cache");
        self.inner.enabled.store(false, Ordering::Relaxed);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        if !self.enabled() {
            return None;
        }
        match self.inner.backend.get(key) {
            Ok(v) => v,
            Err(e) => {
                self.disable("get", key, &e);
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: Value, ttl_seconds: i64) {
        if !self.enabled() {
            return;
        }
        if let Err(e) = self.inner.backend.set(key, value, ttl_seconds) {
            self.disable("set", key, &e);
        }
    }

    pub fn del(&self, key: &str) {
        if !self.enabled() {
            return;
        }
        if let Err(e) = self.inner.backend.del(key) {
            self.disable("del", key, &e);
        }
    }
}
