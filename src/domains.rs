//! Domain extraction and media allow-list matching.
//!
//! Article links and publisher homepages come in every shape (`www.`
//! prefixes, subdomains such as `edition.cnn.com`, regional suffixes such as
//! `bbc.co.uk`). The allow-list is usually typed by hand as bare domains.
//! [`MatchMode`] decides how the two are compared.

use crate::error::SearchError;
use crate::models::Article;
use crate::utils::read_file_lines;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, instrument};
use url::Url;

/// How an article domain is compared against an allow-list entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Equal to the entry, or a subdomain of it (`news.example.com` matches
    /// `example.com`, `notexample.com` does not).
    #[default]
    Suffix,
    /// Registered domains (domain + public suffix) must be equal.
    Registered,
    /// The entry appears anywhere in the domain. Admits false positives such
    /// as `cnn.com` matching `notcnn.com`.
    Substring,
}

/// Network location of `url`, lower-cased, without a leading `www.`.
///
/// Returns an empty string when `url` is not an absolute URL with a host.
pub fn registrable_domain(url: &str) -> String {
    url_host(url.trim())
        .map(|host| strip_www(&host).to_string())
        .unwrap_or_default()
}

/// Registered domain of a URL or bare host name, ignoring subdomains:
/// `https://news.bbc.co.uk/x` gives `bbc.co.uk`.
///
/// Returns an empty string when no public suffix rule yields a domain.
pub fn registered_domain(input: &str) -> String {
    let host = url_host(input.trim()).unwrap_or_else(|| bare_host(input));
    psl::domain_str(&host)
        .map(str::to_string)
        .unwrap_or_default()
}

fn url_host(input: &str) -> Option<String> {
    let parsed = Url::parse(input).ok()?;
    parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Host part of something like `Example.com/politics/`.
fn bare_host(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let without_scheme = lowered
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(&lowered);
    without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_string()
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Normalize one allow-list line into a host name.
fn normalize_entry(entry: &str) -> Option<String> {
    let entry = entry.trim().to_lowercase();
    let entry = entry.trim_end_matches('/');
    if entry.is_empty() {
        return None;
    }
    let host = url_host(entry).unwrap_or_else(|| bare_host(entry));
    let host = strip_www(&host);
    (!host.is_empty()).then(|| host.to_string())
}

/// The set of media domains permitted in filtered results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    domains: BTreeSet<String>,
}

impl AllowList {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = entries
            .into_iter()
            .filter_map(|e| normalize_entry(e.as_ref()))
            .collect();
        Self { domains }
    }

    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, SearchError> {
        let lines = read_file_lines(path).await?;
        let list = Self::from_entries(lines);
        info!(domains = list.len(), "Loaded media allow-list");
        Ok(list)
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    /// Whether `url` (an article link or publisher homepage) belongs to a
    /// listed domain.
    pub fn allows_url(&self, url: &str, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Suffix => {
                let domain = registrable_domain(url);
                !domain.is_empty()
                    && self.iter().any(|entry| {
                        domain == entry
                            || domain
                                .strip_suffix(entry)
                                .is_some_and(|prefix| prefix.ends_with('.'))
                    })
            }
            MatchMode::Registered => {
                let domain = registered_domain(url);
                !domain.is_empty() && self.iter().any(|entry| registered_domain(entry) == domain)
            }
            MatchMode::Substring => {
                let domain = registrable_domain(url);
                !domain.is_empty() && self.iter().any(|entry| domain.contains(entry))
            }
        }
    }
}

/// An article is allowed when either its link or its publisher homepage
/// matches the allow-list.
pub fn is_allowed(article: &Article, allow_list: &AllowList, mode: MatchMode) -> bool {
    allow_list.allows_url(&article.url, mode) || allow_list.allows_url(&article.source_url, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NO_URL, UNKNOWN_AUTHOR};

    fn article(url: &str, source_url: &str) -> Article {
        Article {
            title: "Headline".into(),
            url: url.into(),
            source: "Outlet".into(),
            source_url: source_url.into(),
            author: UNKNOWN_AUTHOR.into(),
            timestamp_raw: "1 day ago".into(),
        }
    }

    #[test]
    fn test_registrable_domain() {
        assert_eq!(registrable_domain("https://www.example.com/a/b"), "example.com");
        assert_eq!(registrable_domain("https://News.Example.com/x?y=1"), "news.example.com");
        assert_eq!(registrable_domain("http://example.com:8080/"), "example.com");
        assert_eq!(registrable_domain("not a url"), "");
        assert_eq!(registrable_domain(""), "");
        assert_eq!(registrable_domain(NO_URL), "");
        assert_eq!(registrable_domain("mailto:desk@example.com"), "");
    }

    #[test]
    fn test_registered_domain() {
        assert_eq!(registered_domain("https://news.example.com/x"), "example.com");
        assert_eq!(registered_domain("https://www.bbc.co.uk/news"), "bbc.co.uk");
        assert_eq!(registered_domain("edition.cnn.com"), "cnn.com");
        assert_eq!(registered_domain("not a url"), "");
        assert_eq!(registered_domain(""), "");
    }

    #[test]
    fn test_allow_list_normalizes_entries() {
        let text = "CNN.com\n\n  https://www.Reuters.com/  \nwww.ft.com\ntechcrunch.com/category/climate\ncnn.com\n";
        let list = AllowList::from_entries(text.lines());
        let entries: Vec<&str> = list.iter().collect();
        assert_eq!(entries, vec!["cnn.com", "ft.com", "reuters.com", "techcrunch.com"]);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_subdomain_matches_bare_entry() {
        let list = AllowList::from_entries(["example.com"]);
        for mode in [MatchMode::Suffix, MatchMode::Registered, MatchMode::Substring] {
            assert!(
                is_allowed(&article("https://news.example.com/x", ""), &list, mode),
                "{mode:?}"
            );
            assert!(
                !is_allowed(&article("https://other.org/x", "https://other.org"), &list, mode),
                "{mode:?}"
            );
        }
    }

    #[test]
    fn test_source_url_alone_can_match() {
        let list = AllowList::from_entries(["theverge.com"]);
        let a = article("https://aggregator.example/redirect/123", "https://www.theverge.com");
        assert!(is_allowed(&a, &list, MatchMode::Suffix));
    }

    #[test]
    fn test_suffix_mode_rejects_lookalikes() {
        let list = AllowList::from_entries(["cnn.com"]);
        let lookalike = article("https://notcnn.com/story", "");
        assert!(!is_allowed(&lookalike, &list, MatchMode::Suffix));
        assert!(!is_allowed(&lookalike, &list, MatchMode::Registered));
        assert!(is_allowed(&lookalike, &list, MatchMode::Substring));
    }

    #[test]
    fn test_registered_mode_handles_multi_label_suffixes() {
        let list = AllowList::from_entries(["https://www.bbc.co.uk"]);
        assert!(is_allowed(
            &article("https://feeds.bbc.co.uk/news/world", ""),
            &list,
            MatchMode::Registered
        ));
        assert!(!is_allowed(
            &article("https://example.co.uk/news", ""),
            &list,
            MatchMode::Registered
        ));
    }

    #[test]
    fn test_malformed_urls_never_match() {
        let list = AllowList::from_entries(["example.com"]);
        let a = article(NO_URL, "");
        for mode in [MatchMode::Suffix, MatchMode::Registered, MatchMode::Substring] {
            assert!(!is_allowed(&a, &list, mode), "{mode:?}");
        }
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("media.txt");
        std::fs::write(&path, "apnews.com\n\nhttps://www.npr.org/\n").unwrap();

        let list = AllowList::load(&path).await.unwrap();
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["apnews.com", "npr.org"]);

        let missing = AllowList::load(&dir.path().join("nope.txt")).await;
        assert!(matches!(missing, Err(SearchError::ReadFile { .. })));
    }
}
