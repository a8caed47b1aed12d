//! Data models for search requests, provider records, and normalized articles.
//!
//! - [`RawNewsResult`]: one entry of the provider's `news_results` array, kept
//!   loose so that odd shapes never fail deserialization
//! - [`Article`]: the canonical record produced by [`crate::normalize`]
//! - [`SearchRequest`]: what a caller asks the pipeline for

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Placeholder used when the provider omits a title.
pub const NO_TITLE: &str = "No title available";
/// Placeholder used when the provider omits the article link.
pub const NO_URL: &str = "No URL available";
/// Placeholder used when the provider omits the publisher.
pub const UNKNOWN_SOURCE: &str = "Unknown source";
/// Placeholder used when no author can be recovered.
pub const UNKNOWN_AUTHOR: &str = "Unknown author";
/// Placeholder used when the provider gives neither `published_at` nor `date`.
pub const NO_DATE: &str = "No date available";

/// A normalized news article.
///
/// `timestamp_raw` is the provider's own date text. Sorting and filtering
/// derive a comparable value from it on demand; that value is never stored
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub source: String,
    pub source_url: String,
    pub author: String,
    pub timestamp_raw: String,
}

/// One entry of the provider's `news_results` array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawNewsResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub link: Option<String>,
    #[serde(default)]
    pub source: Option<RawSource>,
    /// Relative or absolute display date, e.g. `"2 days ago"` or `"Nov 3, 2023"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    /// UTC timestamp such as `"2023-11-03 07:00:00 UTC"`, when the engine provides one.
    #[serde(default, deserialize_with = "lenient_string")]
    pub published_at: Option<String>,
}

impl RawNewsResult {
    /// Build a record from an arbitrary JSON value. Anything that is not an
    /// object (or is an object of the wrong shape) becomes an empty record.
    pub fn from_value(value: serde_json::Value) -> Self {
        if !value.is_object() {
            debug!(kind = json_kind(&value), "news_results entry is not an object; using defaults");
            return RawNewsResult::default();
        }
        serde_json::from_value(value).unwrap_or_else(|e| {
            debug!(error = %e, "Unexpected news_results entry shape; using defaults");
            RawNewsResult::default()
        })
    }
}

/// The publisher field comes either as a bare name or as an object.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSource {
    Name(String),
    Detailed(RawSourceDetails),
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for RawSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::String(name) => RawSource::Name(name),
            serde_json::Value::Object(_) => match serde_json::from_value(value.clone()) {
                Ok(details) => RawSource::Detailed(details),
                Err(_) => RawSource::Other(value),
            },
            other => RawSource::Other(other),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSourceDetails {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Publisher homepage.
    #[serde(default, deserialize_with = "lenient_string")]
    pub link: Option<String>,
    #[serde(default)]
    pub authors: Option<RawAuthors>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawAuthors {
    One(String),
    Many(Vec<serde_json::Value>),
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for RawAuthors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(name) => RawAuthors::One(name),
            serde_json::Value::Array(names) => RawAuthors::Many(names),
            other => RawAuthors::Other(other),
        })
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Accept strings and numbers, treat everything else as missing.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A date bound as supplied by a caller: already typed, or text to be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateBound {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

impl From<NaiveDate> for DateBound {
    fn from(d: NaiveDate) -> Self {
        DateBound::Date(d)
    }
}

impl From<NaiveDateTime> for DateBound {
    fn from(dt: NaiveDateTime) -> Self {
        DateBound::DateTime(dt)
    }
}

impl From<&str> for DateBound {
    fn from(s: &str) -> Self {
        DateBound::Text(s.to_string())
    }
}

impl From<String> for DateBound {
    fn from(s: String) -> Self {
        DateBound::Text(s)
    }
}

/// A single keyword search. If either bound is missing, the pipeline falls
/// back to the default six-month window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub keywords: String,
    pub start: Option<DateBound>,
    pub end: Option<DateBound>,
    pub max_results: u32,
}

impl SearchRequest {
    pub fn new(keywords: impl Into<String>, max_results: u32) -> Self {
        Self {
            keywords: keywords.into(),
            start: None,
            end: None,
            max_results,
        }
    }

    pub fn with_range(mut self, start: impl Into<DateBound>, end: impl Into<DateBound>) -> Self {
        self.start = Some(start.into());
        self.end = Some(end.into());
        self
    }
}
