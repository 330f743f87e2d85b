use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use serde_json::Value;

#[derive(Clone)]
pub struct ConfigStore {
    data: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl ConfigStore {
    pub fn load() -> Self {
        let path = detect_config_path();
        let mut data = default_config();

        if path.exists() {
            if let Ok(bytes) = fs::read(&path) {
                if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(&bytes) {
                    for (k, v) in map {
                        data.insert(k, v);
                    }
                }
            }
        }

        // Env overrides win over the file.
        if let Some(port) = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
        {
            data.insert("port".into(), Value::Number(serde_json::Number::from(port)));
        }
        if let Ok(debug) = std::env::var("DEBUG") {
            data.insert("debug".into(), Value::Bool(debug.to_lowercase() == "true"));
        }
        if let Ok(base_url) = std::env::var("ESTIMATE_BASE_URL") {
            data.insert("estimate_base_url".into(), Value::String(base_url));
        }

        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        let guard = self.data.read().expect("config read lock");
        match guard.get(key) {
            Some(Value::Bool(v)) => *v,
            Some(Value::Number(n)) => n.as_i64().unwrap_or_default() != 0,
            _ => default,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        let guard = self.data.read().expect("config read lock");
        match guard.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        let guard = self.data.read().expect("config read lock");
        match guard.get(key) {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
            Some(Value::String(s)) => s.parse::<i64>().unwrap_or(default),
            Some(Value::Bool(b)) => i64::from(*b),
            _ => default,
        }
    }

    pub fn set_bool(&self, key: &str, value: bool) {
        let mut guard = self.data.write().expect("config write lock");
        guard.insert(key.to_string(), Value::Bool(value));
    }

    pub fn set_string(&self, key: &str, value: Option<String>) {
        let mut guard = self.data.write().expect("config write lock");
        match value {
            None => {
                guard.insert(key.to_string(), Value::Null);
            }
            Some(v) => {
                guard.insert(key.to_string(), Value::String(v));
            }
        }
    }

}

fn default_config() -> BTreeMap<String, Value> {
    let mut m = BTreeMap::new();
    m.insert("port".into(), Value::Number(8001.into()));
    m.insert("debug".into(), Value::Bool(false));
    // Realtime estimate cache TTL in seconds.
    m.insert("estimate_cache_ttl".into(), Value::Number(300.into()));
    m.insert("estimate_base_url".into(), Value::Null);
    m
}

fn detect_config_path() -> PathBuf {
    let preferred = PathBuf::from("/app/config/config.json");
    if preferred.exists() {
        return preferred;
    }
    PathBuf::from("config.json")
}
