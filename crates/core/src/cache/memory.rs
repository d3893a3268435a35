//! In-process cache backend.
//!
//! A plain `HashMap` behind a tokio `RwLock`. Entries carry an absolute
//! expiry and are evicted lazily when a read finds them stale; nothing
//! sweeps the map in the background.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::CacheBackend;
use crate::{Error, Item};

/// Cached listing with its expiry instant.
///
/// `expires_at` is `None` when the TTL reaches past what `Instant` can
/// represent; such an entry never expires.
struct Entry {
    items: Vec<Item>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() > at)
    }
}

/// In-memory cache backend, bounded only by process memory.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including stale ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<Item>>, Error> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.items.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(Entry::is_expired) {
            entries.remove(key);
            tracing::debug!(key, "evicted expired cache entry");
        }
        Ok(None)
    }

    async fn set(&self, key: &str, items: &[Item], ttl: Duration) -> Result<(), Error> {
        let entry = Entry { items: items.to_vec(), expires_at: Instant::now().checked_add(ttl) };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }
}
