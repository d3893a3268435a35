//! Cached, filtered registry listing.
//!
//! The cache always holds the unfiltered list for a signature; the company
//! filter runs on every request, hit or miss.

use std::sync::Arc;
use std::time::Instant;

use smallgiants_core::{CacheScope, CacheStore, Error, Item, MatchMode, QuerySignature, filter_by_company};

use crate::paginate::{FetchParams, Paginator};

/// One listing request: fetch parameters plus the company filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    /// Company keyword; empty disables filtering.
    pub company: String,
    pub match_mode: MatchMode,
    pub normalize: bool,
    pub fetch: FetchParams,
}

impl ListingQuery {
    /// Cache signature for this query under `scope`.
    pub fn signature(&self, scope: CacheScope) -> QuerySignature {
        let fetch = &self.fetch;
        let signature = QuerySignature::fetch(&fetch.region, fetch.page_size(), fetch.max_pages, fetch.sleep);
        match scope {
            CacheScope::Fetch => signature,
            CacheScope::Query => signature.with_filter(&self.company, self.match_mode, self.normalize),
        }
    }
}

/// Fetch-or-cache pipeline shared by every request handler.
pub struct RegistryService {
    paginator: Paginator,
    cache: Arc<dyn CacheStore>,
    scope: CacheScope,
}

impl RegistryService {
    pub fn new(paginator: Paginator, cache: Arc<dyn CacheStore>, scope: CacheScope) -> Self {
        Self { paginator, cache, scope }
    }

    /// Unfiltered items for the query, from cache when possible.
    ///
    /// A failed fetch leaves the cache untouched.
    pub async fn items(&self, auth_key: &str, query: &ListingQuery) -> Result<Vec<Item>, Error> {
        let signature = query.signature(self.scope);

        if let Some(items) = self.cache.get(&signature).await {
            tracing::debug!(items = items.len(), region = %signature.region, "cache hit");
            return Ok(items);
        }

        tracing::debug!(region = %signature.region, "cache miss");
        let start = Instant::now();
        let items = self.paginator.fetch_all(auth_key, &query.fetch).await?;
        tracing::info!(items = items.len(), elapsed_ms = start.elapsed().as_millis() as u64, "registry fetched");

        self.cache.set(&signature, &items).await;
        Ok(items)
    }

    /// Items for the query with the company filter applied.
    pub async fn list(&self, auth_key: &str, query: &ListingQuery) -> Result<Vec<Item>, Error> {
        let items = self.items(auth_key, query).await?;
        let filtered = filter_by_company(&items, &query.company, query.match_mode, query.normalize);
        tracing::debug!(before = items.len(), after = filtered.len(), company = %query.company, "filter applied");
        Ok(filtered)
    }
}
