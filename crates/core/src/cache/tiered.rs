//! Tiered cache: optional external backend with in-process fallback.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{CacheBackend, CacheStore, MemoryBackend, QuerySignature, RedisBackend};
use crate::{AppConfig, Item};

/// Upper bound on connecting to the external store at startup.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// The cache handed to request handlers.
///
/// When an external backend is present it is authoritative while it
/// answers; on any error the call falls through to the local backend.
/// With no TTL configured every read misses and every write is dropped.
pub struct TieredCache {
    external: Option<Arc<dyn CacheBackend>>,
    local: MemoryBackend,
    ttl: Option<Duration>,
}

impl TieredCache {
    /// Memory-only cache. `None` disables caching.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self { external: None, local: MemoryBackend::new(), ttl }
    }

    /// Put an external backend in front of the local one.
    pub fn with_external(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.external = Some(backend);
        self
    }

    /// Build from configuration, connecting to Redis when configured.
    ///
    /// An unreachable Redis is logged and skipped; the cache then runs on the
    /// local backend alone for the life of the process.
    pub async fn from_config(config: &AppConfig) -> Self {
        let cache = Self::new(config.cache_ttl());
        let Some(url) = config.redis_url() else {
            return cache;
        };
        if cache.ttl.is_none() {
            return cache;
        }

        match tokio::time::timeout(CONNECT_TIMEOUT, RedisBackend::connect(url)).await {
            Ok(Ok(backend)) => {
                tracing::info!("using redis cache backend");
                cache.with_external(Arc::new(backend))
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "redis unavailable, using in-memory cache");
                cache
            }
            Err(_) => {
                tracing::warn!(timeout = ?CONNECT_TIMEOUT, "redis connect timed out, using in-memory cache");
                cache
            }
        }
    }

    /// Whether caching is enabled at all.
    pub fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }

    /// Name of the backend serving reads: `redis`, `memory` or `disabled`.
    pub fn backend_name(&self) -> &'static str {
        match (&self.ttl, &self.external) {
            (None, _) => "disabled",
            (Some(_), Some(external)) => external.name(),
            (Some(_), None) => self.local.name(),
        }
    }

    /// The local fallback backend.
    pub fn local(&self) -> &MemoryBackend {
        &self.local
    }
}

#[async_trait]
impl CacheStore for TieredCache {
    async fn get(&self, signature: &QuerySignature) -> Option<Vec<Item>> {
        if self.ttl.is_none() {
            return None;
        }
        let key = signature.cache_key();

        if let Some(external) = &self.external {
            match external.get(&key).await {
                Ok(found) => return found,
                Err(e) => tracing::warn!(backend = external.name(), error = %e, "cache read failed, falling back"),
            }
        }

        self.local.get(&key).await.ok().flatten()
    }

    async fn set(&self, signature: &QuerySignature, items: &[Item]) {
        let Some(ttl) = self.ttl else {
            return;
        };
        let key = signature.cache_key();

        if let Some(external) = &self.external {
            match external.set(&key, items, ttl).await {
                Ok(()) => return,
                Err(e) => tracing::warn!(backend = external.name(), error = %e, "cache write failed, falling back"),
            }
        }

        if let Err(e) = self.local.set(&key, items, ttl).await {
            tracing::warn!(error = %e, "local cache write failed");
        }
    }
}
