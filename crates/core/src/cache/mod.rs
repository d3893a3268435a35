//! Query-signature keyed cache for assembled registry listings.
//!
//! This module provides a TTL cache with two backends behind one
//! fallible `CacheBackend` trait:
//!
//! - `MemoryBackend`: in-process map, lazily evicted on read
//! - `RedisBackend`: external store, expiry handled by Redis itself
//!
//! `TieredCache` wraps both and implements the infallible `CacheStore`
//! trait: backend errors are logged and degrade to a miss or a local write.

pub mod external;
pub mod memory;
pub mod signature;
pub mod tiered;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use crate::Error;
use crate::Item;

pub use external::RedisBackend;
pub use memory::MemoryBackend;
pub use signature::{FilterSignature, QuerySignature};
pub use tiered::TieredCache;

/// Which request parameters participate in the cache signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheScope {
    /// Fetch parameters only; one entry serves every company filter.
    #[default]
    Fetch,
    /// Fetch parameters plus company, match mode and normalize flag.
    Query,
}

/// Caller-facing cache. Never fails.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Cached items for a signature, or `None` on miss, expiry or backend error.
    async fn get(&self, signature: &QuerySignature) -> Option<Vec<Item>>;

    /// Store items under a signature. Backend errors are dropped.
    async fn set(&self, signature: &QuerySignature, items: &[Item]);
}

/// A single storage backend. Errors are reported, not absorbed.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short backend name for logs and health output.
    fn name(&self) -> &'static str;

    /// Read a live entry. Expired entries read as `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Vec<Item>>, Error>;

    /// Write an entry expiring `ttl` from now.
    async fn set(&self, key: &str, items: &[Item], ttl: Duration) -> Result<(), Error>;
}
