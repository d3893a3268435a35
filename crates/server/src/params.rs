//! Query parameters shared by the listing endpoints.

use std::time::Duration;

use serde::Deserialize;
use smallgiants_client::{FetchParams, ListingQuery};
use smallgiants_core::MatchMode;

use crate::error::ApiError;

const DISPLAY_RANGE: (u32, u32) = (1, 100);
const MAX_PAGES_RANGE: (u32, u32) = (1, 5000);
const SLEEP_MAX_SECS: f64 = 5.0;

/// Raw `?company=..&match=..` query as sent by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    #[serde(default)]
    pub company: String,
    #[serde(default, rename = "match")]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub normalize: bool,
    #[serde(default)]
    pub region: String,
    #[serde(default = "default_display")]
    pub display: u32,
    #[serde(default = "default_max_pages", alias = "max_pages")]
    pub max_pages: u32,
    /// Seconds between page requests.
    #[serde(default)]
    pub sleep: f64,
}

fn default_display() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    1000
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            company: String::new(),
            match_mode: MatchMode::default(),
            normalize: false,
            region: String::new(),
            display: default_display(),
            max_pages: default_max_pages(),
            sleep: 0.0,
        }
    }
}

fn check_range(name: &str, value: u32, (min, max): (u32, u32)) -> Result<(), ApiError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(format!("{name} must be between {min} and {max}, got {value}")))
    }
}

impl ListingParams {
    /// Check ranges and convert into a service query.
    pub fn into_query(self) -> Result<ListingQuery, ApiError> {
        check_range("display", self.display, DISPLAY_RANGE)?;
        check_range("maxPages", self.max_pages, MAX_PAGES_RANGE)?;
        if !self.sleep.is_finite() || !(0.0..=SLEEP_MAX_SECS).contains(&self.sleep) {
            return Err(ApiError::InvalidInput(format!(
                "sleep must be between 0 and {SLEEP_MAX_SECS} seconds, got {}",
                self.sleep
            )));
        }

        Ok(ListingQuery {
            company: self.company.trim().to_string(),
            match_mode: self.match_mode,
            normalize: self.normalize,
            fetch: FetchParams {
                region: self.region.trim().to_string(),
                display: self.display,
                max_pages: self.max_pages,
                sleep: Duration::from_secs_f64(self.sleep),
            },
        })
    }
}
