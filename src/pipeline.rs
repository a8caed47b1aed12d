//! The search pipeline: fetch, normalize, filter, sort, dedupe.
//!
//! # Stages
//!
//! 1. Resolve the date window (explicit bounds or the six-month default)
//! 2. Call the provider once for the keyword
//! 3. Normalize every raw record into an [`Article`]
//! 4. Keep articles whose parsed date falls inside the window
//! 5. Keep articles from allow-listed media (no-op for an empty list)
//! 6. Sort by source name, then newest first within a source
//! 7. Drop repeated `(source, url)` pairs
//!
//! Several keywords run through [`Pipeline::run_keywords`] with bounded
//! concurrency. Each keyword gets its own [`KeywordReport`], so one failed
//! lookup never hides the others.

use crate::api::{NewsProvider, ProviderQuery};
use crate::dates::{DateRange, Timestamp, parse_timestamp_at, resolve_range};
use crate::domains::{AllowList, MatchMode, is_allowed};
use crate::error::SearchError;
use crate::models::{Article, SearchRequest};
use crate::normalize::normalize;
use chrono::NaiveDateTime;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use tracing::{debug, error, info, instrument, warn};

/// Outcome of one keyword search.
#[derive(Debug)]
pub struct KeywordReport {
    pub keywords: String,
    pub outcome: Result<Vec<Article>, SearchError>,
}

impl KeywordReport {
    /// Articles found, or nothing if the search failed.
    pub fn articles_or_empty(&self) -> &[Article] {
        self.outcome.as_deref().unwrap_or_default()
    }
}

/// A configured search pipeline around one provider.
#[derive(Debug)]
pub struct Pipeline<P> {
    provider: P,
    allow_list: AllowList,
    match_mode: MatchMode,
    concurrency: usize,
}

impl<P: NewsProvider> Pipeline<P> {
    pub fn new(provider: P, allow_list: AllowList, match_mode: MatchMode) -> Self {
        Self {
            provider,
            allow_list,
            match_mode,
            concurrency: 1,
        }
    }

    /// Number of keyword searches allowed in flight at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Run one search. `now` anchors the default window and relative dates
    /// such as "3 hours ago".
    #[instrument(level = "info", skip_all, fields(keywords = %request.keywords))]
    pub async fn run(
        &self,
        request: &SearchRequest,
        now: NaiveDateTime,
    ) -> Result<Vec<Article>, SearchError> {
        let range = resolve_range(request.start.as_ref(), request.end.as_ref(), now)?;
        info!(%range, max_results = request.max_results, "Searching for news");

        let query = ProviderQuery {
            keywords: request.keywords.clone(),
            range,
            max_results: request.max_results,
        };
        let raw = self.provider.search(&query).await?;
        let articles: Vec<Article> = raw.iter().map(normalize).collect();
        let fetched = articles.len();

        let in_range = filter_by_date(articles, &range, now);
        let dated = in_range.len();

        let allowed = filter_by_media(in_range, &self.allow_list, self.match_mode);
        let from_media = allowed.len();

        let results = dedupe(sort_articles(allowed, now));
        info!(
            fetched,
            in_range = dated,
            allowed = from_media,
            returned = results.len(),
            "Search complete"
        );
        Ok(results)
    }

    /// Run several searches, at most `concurrency` at a time, all against the
    /// same `now`. Reports come back in the order the requests were given.
    pub async fn run_keywords(
        &self,
        requests: Vec<SearchRequest>,
        now: NaiveDateTime,
    ) -> Vec<KeywordReport> {
        info!(
            keywords = requests.len(),
            concurrency = self.concurrency,
            "Running keyword searches"
        );
        stream::iter(requests)
            .map(|request| async move {
                let outcome = self.run(&request, now).await;
                match &outcome {
                    Ok(articles) => {
                        debug!(keywords = %request.keywords, count = articles.len(), "Keyword done")
                    }
                    Err(e) if e.is_transient() => {
                        warn!(keywords = %request.keywords, error = %e, "Search failed; no results for this keyword")
                    }
                    Err(e) => error!(keywords = %request.keywords, error = %e, "Search request rejected"),
                }
                KeywordReport {
                    keywords: request.keywords,
                    outcome,
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

/// Keep articles whose parsed date lies inside `range`. Unreadable dates
/// never do.
pub fn filter_by_date(articles: Vec<Article>, range: &DateRange, now: NaiveDateTime) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|article| {
            let ts = parse_timestamp_at(article.timestamp_raw.as_str(), now);
            let keep = range.contains(ts);
            if !keep {
                debug!(title = %article.title, timestamp = %article.timestamp_raw, parsed = %ts, "Outside date range");
            }
            keep
        })
        .collect()
}

/// Keep articles from allow-listed media. An empty list keeps everything.
pub fn filter_by_media(articles: Vec<Article>, allow_list: &AllowList, mode: MatchMode) -> Vec<Article> {
    if allow_list.is_empty() {
        return articles;
    }
    articles
        .into_iter()
        .filter(|article| {
            let keep = is_allowed(article, allow_list, mode);
            if !keep {
                debug!(url = %article.url, source_url = %article.source_url, "Not an allowed media domain");
            }
            keep
        })
        .collect()
}

/// Sort by source name ascending, then by parsed date newest first.
pub fn sort_articles(articles: Vec<Article>, now: NaiveDateTime) -> Vec<Article> {
    let mut keyed: Vec<(Timestamp, Article)> = articles
        .into_iter()
        .map(|a| (parse_timestamp_at(a.timestamp_raw.as_str(), now), a))
        .collect();
    keyed.sort_by(|(ta, a), (tb, b)| a.source.cmp(&b.source).then_with(|| tb.cmp(ta)));
    keyed.into_iter().map(|(_, a)| a).collect()
}

/// Drop later repeats of the same `(source, url)` pair.
pub fn dedupe(articles: Vec<Article>) -> Vec<Article> {
    articles
        .into_iter()
        .unique_by(|a| (a.source.clone(), a.url.clone()))
        .collect()
}

/// Concatenate per-keyword results in report order, without repeats.
pub fn combine(reports: &[KeywordReport]) -> Vec<Article> {
    dedupe(
        reports
            .iter()
            .flat_map(|r| r.articles_or_empty().iter().cloned())
            .collect(),
    )
}
