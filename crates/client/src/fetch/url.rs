//! Upstream request URL construction.

use url::Url;

/// Error type for URL construction failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty base URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse and check the configured upstream endpoint.
///
/// Any query string already on the endpoint is dropped; page parameters are
/// always appended fresh by [`build_url`].
pub fn parse_base_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_query(None);
    parsed.set_fragment(None);

    Ok(parsed)
}

/// Build the request URL for one page.
///
/// Parameter order is fixed: `authKey`, `returnType`, `startPage`, `display`,
/// then `region` only when non-empty.
pub fn build_url(base: &Url, auth_key: &str, start_page: u32, display: u32, region: &str) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("authKey", auth_key)
            .append_pair("returnType", "XML")
            .append_pair("startPage", &start_page.to_string())
            .append_pair("display", &display.to_string());
        if !region.is_empty() {
            query.append_pair("region", region);
        }
    }
    url
}

/// Copy of `url` with the `authKey` value masked, for logging.
pub fn redacted(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "authKey" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
