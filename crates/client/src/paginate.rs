//! Sequential page walk over the registry.
//!
//! Pages are requested one at a time from `startPage=1`. The walk stops at
//! the first of: a page with no records, the accumulated count reaching the
//! first reported total, or `max_pages` requests. Any fetch or parse failure
//! aborts the whole walk; partial results are never returned.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use smallgiants_core::{Error, Item};

use crate::fetch::{PageFetcher, build_url, redacted};
use crate::parse::parse_page;

/// Largest page size the upstream accepts.
pub const MAX_DISPLAY: u32 = 100;

/// Parameters of one registry walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParams {
    /// Region code; empty means all regions.
    pub region: String,
    /// Requested page size, clamped to `1..=100` when used.
    pub display: u32,
    /// Upper bound on page requests.
    pub max_pages: u32,
    /// Delay between consecutive page requests.
    pub sleep: Duration,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self { region: String::new(), display: MAX_DISPLAY, max_pages: 1000, sleep: Duration::ZERO }
    }
}

impl FetchParams {
    /// Page size actually sent upstream.
    pub fn page_size(&self) -> u32 {
        self.display.clamp(1, MAX_DISPLAY)
    }
}

/// Drives a [`PageFetcher`] across pages and assembles the full item list.
#[derive(Clone)]
pub struct Paginator {
    fetcher: Arc<dyn PageFetcher>,
    base_url: Url,
}

impl Paginator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: Url) -> Self {
        Self { fetcher, base_url }
    }

    /// Fetch every page for `params` and return the items in page order.
    pub async fn fetch_all(&self, auth_key: &str, params: &FetchParams) -> Result<Vec<Item>, Error> {
        let display = params.page_size();
        let mut items: Vec<Item> = Vec::new();
        let mut total: Option<u64> = None;
        let mut pages = 0u32;

        for page in 1..=params.max_pages {
            let url = build_url(&self.base_url, auth_key, page, display, &params.region);
            pages = page;

            let body = self.fetcher.fetch(&url).await.map_err(|e| {
                tracing::warn!(page, url = %redacted(&url), error = %e, "page fetch failed");
                Error::UpstreamFetch { page, reason: e.to_string() }
            })?;

            let parsed =
                parse_page(&body).map_err(|e| Error::Parse { page, reason: e.to_string() })?;

            if total.is_none() {
                total = parsed.total;
            }

            let count = parsed.items.len();
            tracing::debug!(page, count, total = ?total, "page parsed");

            if count == 0 {
                break;
            }
            items.extend(parsed.items);

            if let Some(total) = total
                && items.len() as u64 >= total
            {
                break;
            }

            if page < params.max_pages && !params.sleep.is_zero() {
                tokio::time::sleep(params.sleep).await;
            }
        }

        tracing::info!(pages, items = items.len(), total = ?total, region = %params.region, "registry fetch complete");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    /// Serves scripted pages and records every requested URL.
    struct ScriptedFetcher {
        pages: Vec<Result<String, u16>>,
        requests: Mutex<Vec<Url>>,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<Result<String, u16>>) -> Arc<Self> {
            Arc::new(Self { pages, requests: Mutex::new(Vec::new()) })
        }

        fn requests(&self) -> Vec<Url> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &Url) -> Result<Bytes, FetchError> {
            let index = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(url.clone());
                requests.len() - 1
            };
            match self.pages.get(index) {
                Some(Ok(body)) => Ok(Bytes::from(body.clone())),
                Some(Err(status)) => Err(FetchError::HttpError { status: *status }),
                None => Ok(Bytes::from_static(b"<root></root>")),
            }
        }
    }

    fn page(count: usize, total: Option<u64>) -> Result<String, u16> {
        let mut xml = String::from("<smallGiantsList>");
        if let Some(total) = total {
            xml.push_str(&format!("<total>{total}</total>"));
        }
        for i in 0..count {
            xml.push_str(&format!("<smallGiant><coNm>Company {i}</coNm></smallGiant>"));
        }
        xml.push_str("</smallGiantsList>");
        Ok(xml)
    }

    fn paginator(fetcher: Arc<ScriptedFetcher>) -> Paginator {
        Paginator::new(fetcher, Url::parse("https://example.com/list.do").unwrap())
    }

    fn params(display: u32, max_pages: u32) -> FetchParams {
        FetchParams { display, max_pages, ..Default::default() }
    }

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs().find(|(k, _)| k == key).map(|(_, v)| v.into_owned())
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let fetcher = ScriptedFetcher::new(vec![page(5, None), page(5, None), page(5, None), page(0, None)]);
        let items = paginator(fetcher.clone()).fetch_all("key", &params(5, 100)).await.unwrap();
        assert_eq!(items.len(), 15);
        assert_eq!(fetcher.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_stops_when_total_reached() {
        let fetcher = ScriptedFetcher::new(vec![page(5, Some(12)), page(5, Some(12)), page(2, Some(12)), page(5, None)]);
        let items = paginator(fetcher.clone()).fetch_all("key", &params(5, 100)).await.unwrap();
        assert_eq!(items.len(), 12);
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_first_total_wins() {
        let fetcher = ScriptedFetcher::new(vec![page(5, Some(10)), page(5, Some(1000)), page(5, None)]);
        let items = paginator(fetcher.clone()).fetch_all("key", &params(5, 100)).await.unwrap();
        assert_eq!(items.len(), 10);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_max_pages_cap() {
        let fetcher = ScriptedFetcher::new(vec![page(5, None); 10]);
        let items = paginator(fetcher.clone()).fetch_all("key", &params(5, 2)).await.unwrap();
        assert_eq!(items.len(), 10);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_request_params_in_order() {
        let fetcher = ScriptedFetcher::new(vec![page(1, None), page(0, None)]);
        let params = FetchParams { region: "11".into(), ..params(500, 10) };
        paginator(fetcher.clone()).fetch_all("secret", &params).await.unwrap();

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(query_value(&requests[0], "startPage").as_deref(), Some("1"));
        assert_eq!(query_value(&requests[1], "startPage").as_deref(), Some("2"));
        assert_eq!(query_value(&requests[0], "display").as_deref(), Some("100"));
        assert_eq!(query_value(&requests[0], "region").as_deref(), Some("11"));
        assert_eq!(query_value(&requests[0], "authKey").as_deref(), Some("secret"));
    }

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(params(0, 1).page_size(), 1);
        assert_eq!(params(50, 1).page_size(), 50);
        assert_eq!(params(500, 1).page_size(), 100);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let fetcher = ScriptedFetcher::new(vec![page(5, None), page(5, None), Err(503)]);
        let err = paginator(fetcher.clone()).fetch_all("key", &params(5, 100)).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamFetch { page: 3, .. }));
        assert!(err.is_upstream());
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_parse_failure_aborts() {
        let fetcher = ScriptedFetcher::new(vec![Ok("<broken>".into())]);
        let err = paginator(fetcher).fetch_all("key", &params(5, 100)).await.unwrap_err();
        assert!(matches!(err, Error::Parse { page: 1, .. }));
    }

    #[tokio::test]
    async fn test_zero_max_pages_makes_no_requests() {
        let fetcher = ScriptedFetcher::new(vec![page(5, None)]);
        let items = paginator(fetcher.clone()).fetch_all("key", &params(5, 0)).await.unwrap();
        assert!(items.is_empty());
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_between_pages() {
        let fetcher = ScriptedFetcher::new(vec![page(5, None), page(5, None), page(0, None)]);
        let params = FetchParams { sleep: Duration::from_secs(2), ..params(5, 100) };

        let start = tokio::time::Instant::now();
        paginator(fetcher.clone()).fetch_all("key", &params).await.unwrap();

        assert_eq!(fetcher.requests().len(), 3);
        assert!(start.elapsed() >= Duration::from_secs(4));
    }
}
