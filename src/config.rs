//! Run configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command-line flags (and their environment fallbacks). Everything the
//! pipeline needs is handed to it explicitly from here.
//!
//! ```yaml
//! api_key: "..."            # or SERP_API_KEY
//! engine: google            # google (with tbm=nws) or google_news
//! max_results: 50
//! media_list: media.txt
//! output_dir: result
//! match_mode: suffix        # suffix | registered | substring
//! concurrency: 4
//! ```

use crate::api::{ProviderSettings, SERPAPI_ENDPOINT};
use crate::cli::Cli;
use crate::domains::MatchMode;
use crate::error::SearchError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub engine: String,
    pub language: String,
    pub country: String,
    pub max_results: u32,
    pub media_list: Option<PathBuf>,
    pub topics_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub concurrency: usize,
    pub match_mode: MatchMode,
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: SERPAPI_ENDPOINT.to_string(),
            engine: "google".to_string(),
            language: "en".to_string(),
            country: "us".to_string(),
            max_results: 20,
            media_list: None,
            topics_file: None,
            output_dir: PathBuf::from("result"),
            concurrency: 4,
            match_mode: MatchMode::Suffix,
            timeout_secs: 30,
        }
    }
}

/// Load a YAML config file. Missing keys take their defaults.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_config(path: &Path) -> Result<NewsConfig, SearchError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| SearchError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
    let config = parse_config(&text).map_err(|source| SearchError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded configuration");
    Ok(config)
}

fn parse_config(text: &str) -> Result<NewsConfig, serde_yaml::Error> {
    // An empty file deserializes to null rather than an empty mapping.
    if text.trim().is_empty() {
        return Ok(NewsConfig::default());
    }
    serde_yaml::from_str(text)
}

impl NewsConfig {
    /// Let command-line values win over file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(key) = &cli.api_key {
            self.api_key = Some(key.clone());
        }
        if let Some(engine) = &cli.engine {
            self.engine = engine.clone();
        }
        if let Some(n) = cli.max_results {
            self.max_results = n;
        }
        if let Some(path) = &cli.media_list {
            self.media_list = Some(path.clone());
        }
        if let Some(path) = &cli.topics_file {
            self.topics_file = Some(path.clone());
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(mode) = cli.match_mode {
            self.match_mode = mode;
        }
        if let Some(n) = cli.concurrency {
            self.concurrency = n;
        }
    }

    pub fn provider_settings(&self) -> Result<ProviderSettings, SearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(SearchError::MissingApiKey)?;
        Ok(ProviderSettings {
            endpoint: self.endpoint.clone(),
            engine: self.engine.clone(),
            language: self.language.clone(),
            country: self.country.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..ProviderSettings::new(api_key)
        })
    }
}
