//! Search provider access.
//!
//! The pipeline talks to the provider through the [`NewsProvider`] trait so
//! the HTTP client can be swapped for a canned one in tests.
//!
//! [`SerpApiClient`] issues a single GET per keyword against SerpApi's search
//! endpoint. There is no retry: a failed call is reported once and the caller
//! decides what to do with it.

use crate::dates::DateRange;
use crate::error::SearchError;
use crate::models::RawNewsResult;
use crate::utils::truncate_for_log;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Default SerpApi endpoint.
pub const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search";

/// SerpApi reports an empty result set as an error payload with this text.
const NO_RESULTS_MARKER: &str = "hasn't returned any results";

/// What the pipeline asks a provider for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuery {
    pub keywords: String,
    pub range: DateRange,
    pub max_results: u32,
}

/// A source of raw news records.
pub trait NewsProvider {
    /// Run one search and return the raw `news_results` entries.
    async fn search(&self, query: &ProviderQuery) -> Result<Vec<RawNewsResult>, SearchError>;
}

/// Connection settings for [`SerpApiClient`].
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub endpoint: String,
    pub api_key: String,
    /// `google` (sent with `tbm=nws`) or a dedicated engine such as `google_news`.
    pub engine: String,
    pub language: String,
    pub country: String,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: SERPAPI_ENDPOINT.to_string(),
            api_key: api_key.into(),
            engine: "google".to_string(),
            language: "en".to_string(),
            country: "us".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for SerpApi.
#[derive(Debug)]
pub struct SerpApiClient {
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl SerpApiClient {
    /// Create a client for the given settings.
    ///
    /// # Arguments
    ///
    /// * `settings` - Endpoint, key, engine and locale; see [`ProviderSettings`]
    ///
    /// # Errors
    ///
    /// [`SearchError::MissingApiKey`] for a blank key, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: ProviderSettings) -> Result<Self, SearchError> {
        if settings.api_key.trim().is_empty() {
            return Err(SearchError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { settings, client })
    }

    /// Query string for one search. The API key is included, so never log
    /// the result as-is.
    pub fn query_params(&self, query: &ProviderQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("engine", self.settings.engine.clone())];
        if self.settings.engine == "google" {
            params.push(("tbm", "nws".to_string()));
        }
        params.extend([
            ("q", query.keywords.clone()),
            ("api_key", self.settings.api_key.clone()),
            ("num", query.max_results.to_string()),
            ("hl", self.settings.language.clone()),
            ("gl", self.settings.country.clone()),
            ("tbs", query.range.tbs()),
        ]);
        params
    }
}

impl NewsProvider for SerpApiClient {
    #[instrument(level = "info", skip_all, fields(keywords = %query.keywords, range = %query.range))]
    async fn search(&self, query: &ProviderQuery) -> Result<Vec<RawNewsResult>, SearchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(&self.settings.endpoint)
            .query(&self.query_params(query))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let elapsed_ms = t0.elapsed().as_millis();

        if !status.is_success() {
            warn!(status = status.as_u16(), elapsed_ms, "Search API returned an error status");
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let results = parse_response(&body)?;
        info!(count = results.len(), elapsed_ms, "Search API call complete");
        Ok(results)
    }
}

/// Extract `news_results` from a provider response body.
///
/// A missing `news_results` key is an empty result; an `error` payload is a
/// failure, except for the provider's own "no results" message.
///
/// # Arguments
///
/// * `body` - Raw JSON text returned by the provider
///
/// # Returns
///
/// One [`RawNewsResult`] per entry in `news_results`, in provider order.
/// Entries of an unexpected shape become empty records rather than errors.
///
/// # Errors
///
/// [`SearchError::Json`] for a body that is not JSON, or
/// [`SearchError::Provider`] for an `error` payload.
pub fn parse_response(body: &str) -> Result<Vec<RawNewsResult>, SearchError> {
    let mut value: serde_json::Value = serde_json::from_str(body)?;

    if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
        if message.contains(NO_RESULTS_MARKER) {
            debug!(%message, "Provider reported no results");
            return Ok(Vec::new());
        }
        return Err(SearchError::Provider(message.to_string()));
    }

    let entries = match value.get_mut("news_results").map(serde_json::Value::take) {
        Some(serde_json::Value::Array(entries)) => entries,
        Some(other) => {
            warn!(preview = %truncate_for_log(&other.to_string(), 120), "news_results is not an array");
            Vec::new()
        }
        None => Vec::new(),
    };

    Ok(entries.into_iter().map(RawNewsResult::from_value).collect())
}
