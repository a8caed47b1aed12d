//! # News Sift
//!
//! Searches news coverage for one or more keywords through SerpApi, keeps
//! only articles from an allow-listed set of media outlets, and exports the
//! sorted results as CSV and plain-text digests.
//!
//! ## Usage
//!
//! ```sh
//! SERP_API_KEY=... news_sift -k "SOSV, climate tech" -p past-month -m media.txt
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: YAML file (optional) merged with CLI flags
//! 2. **Search**: one provider call per keyword, a few in flight at once
//! 3. **Filtering**: date window, then media allow-list
//! 4. **Ordering**: source name, then newest first; exact duplicates dropped
//! 5. **Output**: per-keyword CSV/text files plus a combined export

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod dates;
mod domains;
mod error;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod utils;

use api::SerpApiClient;
use cli::Cli;
use config::{NewsConfig, load_config};
use dates::resolve_range;
use domains::AllowList;
use error::SearchError;
use models::{DateBound, SearchRequest};
use outputs::{combined_file_name, csv::render_csv, keyword_file_name, text::render_text, write_export};
use pipeline::{Pipeline, combine};
use utils::{ensure_writable_dir, file_stamp, read_file_lines, split_keywords};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Optional .env with SERP_API_KEY and friends
    let dotenv = dotenvy::dotenv().ok();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_sift starting up");
    if let Some(path) = dotenv {
        debug!(path = %path.display(), "Loaded .env");
    }

    let args = Cli::parse();
    debug!(?args.keywords, ?args.topics_file, ?args.config, "Parsed CLI arguments");

    // ---- Configuration ----
    let mut config = match &args.config {
        Some(path) => load_config(path).await?,
        None => NewsConfig::default(),
    };
    config.apply_cli(&args);

    let mut keywords = args.keywords.as_deref().map(split_keywords).unwrap_or_default();
    if let Some(path) = &config.topics_file {
        keywords.extend(read_file_lines(path).await?);
    }
    if keywords.is_empty() {
        return Err(SearchError::NoKeywords.into());
    }

    let now = Local::now().naive_local();
    let (start, end): (Option<DateBound>, Option<DateBound>) = match args.preset {
        Some(preset) => {
            let (s, e) = preset.dates(now.date());
            (Some(s.into()), Some(e.into()))
        }
        None => (
            args.start.clone().map(DateBound::from),
            args.end.clone().map(DateBound::from),
        ),
    };
    // Reject bad date input before any network traffic.
    let range = resolve_range(start.as_ref(), end.as_ref(), now)?;
    info!(%range, keywords = keywords.len(), "Search window resolved");

    let allow_list = match &config.media_list {
        Some(path) => AllowList::load(path).await?,
        None => {
            warn!("No media list configured; results will not be filtered by outlet");
            AllowList::default()
        }
    };

    let output_dir = ensure_writable_dir(&config.output_dir).await?;
    let provider = SerpApiClient::new(config.provider_settings()?)?;
    let pipeline = Pipeline::new(provider, allow_list, config.match_mode)
        .with_concurrency(config.concurrency);

    // ---- Search ----
    let requests: Vec<SearchRequest> = keywords
        .iter()
        .map(|kw| {
            let request = SearchRequest::new(kw.as_str(), config.max_results);
            match (&start, &end) {
                (Some(s), Some(e)) => request.with_range(s.clone(), e.clone()),
                _ => request,
            }
        })
        .collect();
    let reports = pipeline.run_keywords(requests, now).await;

    // ---- Output ----
    let stamp = file_stamp(now);
    let mut failed = 0usize;
    for report in &reports {
        let articles = match &report.outcome {
            Ok(articles) => articles,
            Err(e) => {
                failed += 1;
                warn!(keywords = %report.keywords, error = %e, "Skipping exports for failed keyword");
                continue;
            }
        };

        let csv_name = keyword_file_name(&stamp, &report.keywords, "_filtered", "csv");
        if let Err(e) = write_export(&output_dir, &csv_name, &render_csv(articles)).await {
            error!(error = %e, "Failed to write CSV export");
        }
        let txt_name = keyword_file_name(&stamp, &report.keywords, "_filtered", "txt");
        let digest = render_text(articles, &report.keywords, now);
        if let Err(e) = write_export(&output_dir, &txt_name, &digest).await {
            error!(error = %e, "Failed to write text export");
        }
    }

    let combined = combine(&reports);
    if reports.len() > 1 {
        let all_keywords = keywords.join(", ");
        if let Err(e) =
            write_export(&output_dir, &combined_file_name(&stamp, "csv"), &render_csv(&combined)).await
        {
            error!(error = %e, "Failed to write combined CSV export");
        }
        let digest = render_text(&combined, &all_keywords, now);
        if let Err(e) = write_export(&output_dir, &combined_file_name(&stamp, "txt"), &digest).await {
            error!(error = %e, "Failed to write combined text export");
        }
    }

    if combined.is_empty() {
        info!("No articles found matching the criteria");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        keywords = reports.len(),
        failed,
        articles = combined.len(),
        allowed_domains = pipeline.allow_list().len(),
        "Execution complete"
    );

    Ok(())
}
