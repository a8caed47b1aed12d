//! Error taxonomy for the search pipeline.
//!
//! Errors fall into two groups:
//! - **Transient** failures talking to the search provider (transport, status,
//!   malformed body, provider error payload). These are logged and isolated to
//!   the keyword that hit them.
//! - **Configuration** problems (missing API key, bad date input, unreadable
//!   media list, unwritable output directory). These are surfaced to the user.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no search API key configured (set SERP_API_KEY, pass --api-key, or add api_key to the config file)")]
    MissingApiKey,

    #[error("no keywords given (pass --keywords or --topics-file)")]
    NoKeywords,

    #[error("could not parse date `{0}` (expected YYYY-MM-DD, MM/DD/YYYY, YYYYMMDD or YYYY/MM/DD)")]
    InvalidDate(String),

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },

    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed search response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("search API reported an error: {0}")]
    Provider(String),

    #[error("could not read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("output directory {} is not writable: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SearchError {
    /// True for provider-side failures that should degrade to "no results for
    /// this keyword" instead of stopping the run.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SearchError::Http(_)
                | SearchError::Status { .. }
                | SearchError::Json(_)
                | SearchError::Provider(_)
        )
    }
}
