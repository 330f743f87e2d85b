use std::sync::Arc;

use serde::Serialize;
use sqlx::AnyPool;

use crate::cache::CacheService;
use crate::config::ConfigStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    pool: Option<AnyPool>,
    config: ConfigStore,
    cache: CacheService,
}

impl AppState {
    pub fn new(pool: Option<AnyPool>, config: ConfigStore, cache: CacheService) -> Self {
        Self {
            inner: Arc::new(InnerState {
                pool,
                config,
                cache,
            }),
        }
    }

    pub fn pool(&self) -> Option<&AnyPool> {
        self.inner.pool.as_ref()
    }

    pub fn config(&self) -> &ConfigStore {
        &self.inner.config
    }

    pub fn cache(&self) -> &CacheService {
        &self.inner.cache
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub cache_enabled: bool,
}
