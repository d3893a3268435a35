//! HTTP routes for the small-giants registry.
//!
//! - `GET /smallgiants` returns `{ count, items }` as JSON
//! - `GET /smallgiants.csv` returns the same items as a CSV attachment
//! - `GET /health` reports configuration readiness

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;
use smallgiants_client::RegistryService;
use smallgiants_core::export::{Listing, to_csv};
use smallgiants_core::{AppConfig, Error, Item};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::params::ListingParams;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
const CSV_DISPOSITION: &str = "attachment; filename=smallgiants.csv";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service: Arc<RegistryService>,
    /// Backend name reported by `/health`.
    pub cache_backend: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    ok: bool,
    has_auth_key: bool,
    cache_backend: &'static str,
}

/// Build the router with all routes and request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/smallgiants", get(list_json))
        .route("/smallgiants.csv", get(list_csv))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Shared listing path: validate, resolve the auth key, then list.
async fn listing(
    state: &AppState, params: Result<Query<ListingParams>, QueryRejection>,
) -> Result<Vec<Item>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidInput(e.body_text()))?;
    let query = params.into_query()?;
    let auth_key = state.config.require_auth_key().map_err(Error::from)?;
    Ok(state.service.list(auth_key, &query).await?)
}

async fn list_json(
    State(state): State<AppState>, params: Result<Query<ListingParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let items = listing(&state, params).await?;
    Ok(Json(Listing::new(&items)).into_response())
}

async fn list_csv(
    State(state): State<AppState>, params: Result<Query<ListingParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let items = listing(&state, params).await?;
    let body = to_csv(&items)?;
    let headers = [(header::CONTENT_TYPE, CSV_CONTENT_TYPE), (header::CONTENT_DISPOSITION, CSV_DISPOSITION)];
    Ok((headers, body).into_response())
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        ok: true,
        has_auth_key: state.config.require_auth_key().is_ok(),
        cache_backend: state.cache_backend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use bytes::Bytes;
    use http_body_util::BodyExt;
    use smallgiants_client::{FetchError, PageFetcher, Paginator, Url, parse_base_url};
    use smallgiants_core::{CacheScope, TieredCache};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    const BODY: &str = "<smallGiantsList><total>2</total>\
        <smallGiant><corpNo>1</corpNo><coNm>Acme Corp</coNm></smallGiant>\
        <smallGiant><coNm>스몰캡</coNm><region>11</region></smallGiant></smallGiantsList>";

    struct StubFetcher {
        calls: AtomicUsize,
        status: Option<u16>,
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, _url: &Url) -> Result<Bytes, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.status {
                Some(status) => Err(FetchError::HttpError { status }),
                None => Ok(Bytes::from_static(BODY.as_bytes())),
            }
        }
    }

    fn app_with(auth_key: Option<&str>, status: Option<u16>) -> (Router, Arc<StubFetcher>) {
        let fetcher = Arc::new(StubFetcher { calls: AtomicUsize::new(0), status });
        let paginator = Paginator::new(fetcher.clone(), parse_base_url("https://example.com/list.do").unwrap());
        let cache = Arc::new(TieredCache::new(Some(Duration::from_secs(60))));
        let backend = cache.backend_name();
        let service = RegistryService::new(paginator, cache, CacheScope::Fetch);
        let config = AppConfig { auth_key: auth_key.map(str::to_string), ..Default::default() };
        let state = AppState { config: Arc::new(config), service: Arc::new(service), cache_backend: backend };
        (build_router(state), fetcher)
    }

    fn app() -> (Router, Arc<StubFetcher>) {
        app_with(Some("key"), None)
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Bytes) {
        let response = router.oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body)
    }

    fn json(body: &Bytes) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn test_list_json() {
        let (router, _) = app();
        let (status, _, body) = get(router, "/smallgiants").await;
        assert_eq!(status, StatusCode::OK);
        let value = json(&body);
        assert_eq!(value["count"], 2);
        assert_eq!(value["items"][0]["coNm"], "Acme Corp");
    }

    #[tokio::test]
    async fn test_list_json_filtered() {
        let (router, _) = app();
        let (status, _, body) = get(router, "/smallgiants?company=acme&match=partial").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["count"], 1);
    }

    #[tokio::test]
    async fn test_list_csv() {
        let (router, _) = app();
        let (status, headers, body) = get(router, "/smallgiants.csv").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], CSV_CONTENT_TYPE);
        assert_eq!(headers[header::CONTENT_DISPOSITION], CSV_DISPOSITION);

        let text = String::from_utf8(body.to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("coNm,corpNo,region"));
        assert_eq!(lines.next(), Some("Acme Corp,1,"));
        assert_eq!(lines.next(), Some("스몰캡,,11"));
    }

    #[tokio::test]
    async fn test_csv_empty_result() {
        let (router, _) = app();
        let (status, _, body) = get(router, "/smallgiants.csv?company=nobody&match=exact").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"\n");
    }

    #[tokio::test]
    async fn test_second_request_served_from_cache() {
        let (router, fetcher) = app();
        get(router.clone(), "/smallgiants").await;
        get(router, "/smallgiants.csv?company=acme").await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_auth_key_is_server_error() {
        let (router, fetcher) = app_with(None, None);
        let (status, _, body) = get(router, "/smallgiants").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json(&body)["error"], "CONFIG_ERROR");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let (router, _) = app_with(Some("key"), Some(503));
        let (status, _, body) = get(router, "/smallgiants").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let value = json(&body);
        assert_eq!(value["error"], "UPSTREAM_FETCH_FAILED");
        assert!(value["detail"].as_str().unwrap().contains("page 1"));
    }

    #[tokio::test]
    async fn test_invalid_params_rejected() {
        for uri in [
            "/smallgiants?display=0",
            "/smallgiants?display=101",
            "/smallgiants?maxPages=9000",
            "/smallgiants?sleep=6",
            "/smallgiants?match=fuzzy",
            "/smallgiants.csv?display=abc",
        ] {
            let (router, fetcher) = app();
            let (status, _, body) = get(router, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(json(&body)["error"], "INVALID_INPUT");
            assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app_with(None, None);
        let (status, _, body) = get(router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let value = json(&body);
        assert_eq!(value["ok"], true);
        assert_eq!(value["hasAuthKey"], false);
        assert_eq!(value["cacheBackend"], "memory");
    }
}
