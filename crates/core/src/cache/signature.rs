//! Deterministic cache signatures.

use std::time::Duration;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::MatchMode;

/// Prefix for every cache key, so Redis entries are easy to find and purge.
pub const KEY_PREFIX: &str = "smallgiants:";

/// Filter parameters, part of the signature only under `CacheScope::Query`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilterSignature {
    pub company: String,
    pub match_mode: MatchMode,
    pub normalize: bool,
}

/// Value identity of a cached listing.
///
/// The inter-page delay is held in whole milliseconds so the type stays `Eq`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QuerySignature {
    pub region: String,
    pub display: u32,
    pub max_pages: u32,
    pub sleep_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterSignature>,
}

impl QuerySignature {
    /// Signature over fetch parameters only.
    pub fn fetch(region: &str, display: u32, max_pages: u32, sleep: Duration) -> Self {
        Self {
            region: region.to_string(),
            display,
            max_pages,
            sleep_ms: u64::try_from(sleep.as_millis()).unwrap_or(u64::MAX),
            filter: None,
        }
    }

    /// Extend the signature with filter parameters.
    pub fn with_filter(mut self, company: &str, match_mode: MatchMode, normalize: bool) -> Self {
        self.filter = Some(FilterSignature { company: company.to_string(), match_mode, normalize });
        self
    }

    /// Compute the cache key: prefix plus SHA-256 of the canonical JSON form.
    ///
    /// Struct fields serialize in declaration order, so equal signatures
    /// always produce the same key.
    pub fn cache_key(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        format!("{KEY_PREFIX}{}", hex::encode(hasher.finalize()))
    }
}
