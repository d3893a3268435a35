//! Upstream client for the Work24 small-giants registry.
//!
//! This crate provides the page fetch pipeline, XML parsing, the sequential
//! pagination controller and the cached listing service shared by the
//! server and CLI.

pub mod fetch;
pub mod paginate;
pub mod parse;
pub mod service;

pub use fetch::{FetchConfig, FetchError, HttpFetcher, PageFetcher, build_url, parse_base_url};
pub use paginate::{FetchParams, MAX_DISPLAY, Paginator};
pub use parse::{PageResult, ParseError, parse_page};
pub use reqwest::Url;
pub use service::{ListingQuery, RegistryService};

use std::sync::Arc;

use smallgiants_core::{AppConfig, ConfigError, Error};

/// Build a paginator over the real HTTP fetcher from configuration.
pub fn paginator_from_config(config: &AppConfig) -> Result<Paginator, Error> {
    let base_url = parse_base_url(&config.base_url)
        .map_err(|e| ConfigError::Invalid { field: "base_url".into(), reason: e.to_string() })?;
    let fetcher = HttpFetcher::new(FetchConfig::from(config))
        .map_err(|e| ConfigError::Invalid { field: "user_agent".into(), reason: e.to_string() })?;
    Ok(Paginator::new(Arc::new(fetcher), base_url))
}
