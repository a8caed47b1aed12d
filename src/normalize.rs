//! Mapping provider records onto [`Article`].
//!
//! The provider's `source` field is either a bare name or an object carrying
//! `name`, `link` and `authors`; `authors` is itself a string, a list, or
//! missing. Those variants stop here: everything downstream sees only
//! [`Article`].

use crate::models::{
    Article, NO_DATE, NO_TITLE, NO_URL, RawAuthors, RawNewsResult, RawSource, UNKNOWN_AUTHOR,
    UNKNOWN_SOURCE,
};

/// Build the canonical article for one provider record.
///
/// Missing or empty fields get placeholders; `published_at` wins over `date`
/// when both are present.
pub fn normalize(raw: &RawNewsResult) -> Article {
    let (source, source_url, author) = match &raw.source {
        Some(RawSource::Name(name)) => (
            non_empty(Some(name)).unwrap_or(UNKNOWN_SOURCE).to_string(),
            String::new(),
            UNKNOWN_AUTHOR.to_string(),
        ),
        Some(RawSource::Detailed(details)) => (
            non_empty(details.name.as_ref())
                .unwrap_or(UNKNOWN_SOURCE)
                .to_string(),
            non_empty(details.link.as_ref()).unwrap_or_default().to_string(),
            details
                .authors
                .as_ref()
                .and_then(join_authors)
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        ),
        Some(RawSource::Other(_)) | None => (
            UNKNOWN_SOURCE.to_string(),
            String::new(),
            UNKNOWN_AUTHOR.to_string(),
        ),
    };

    let timestamp_raw = non_empty(raw.published_at.as_ref())
        .or_else(|| non_empty(raw.date.as_ref()))
        .unwrap_or(NO_DATE)
        .to_string();

    Article {
        title: non_empty(raw.title.as_ref()).unwrap_or(NO_TITLE).to_string(),
        url: non_empty(raw.link.as_ref()).unwrap_or(NO_URL).to_string(),
        source,
        source_url,
        author,
        timestamp_raw,
    }
}

/// The value as given, unless it is missing or only whitespace.
fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

fn join_authors(authors: &RawAuthors) -> Option<String> {
    match authors {
        RawAuthors::One(name) => non_empty(Some(name)).map(str::to_string),
        RawAuthors::Many(names) => {
            let names: Vec<&str> = names
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            (!names.is_empty()).then(|| names.join(", "))
        }
        RawAuthors::Other(_) => None,
    }
}
