//! CSV export.
//!
//! Columns: `number, source, source_url, date, author, title, url`, with
//! 1-based row numbers. `date` is the provider's raw date text. Fields are
//! quoted per RFC 4180 when they contain a comma, quote, or line break.

use crate::models::Article;
use std::borrow::Cow;
use std::fmt::Write;

pub const HEADER: [&str; 7] = ["number", "source", "source_url", "date", "author", "title", "url"];

const LINE_END: &str = "\r\n";

/// Render articles as CSV text, header included.
pub fn render_csv(articles: &[Article]) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER.iter().copied());
    for (i, article) in articles.iter().enumerate() {
        let number = (i + 1).to_string();
        push_row(
            &mut out,
            [
                number.as_str(),
                article.source.as_str(),
                article.source_url.as_str(),
                article.timestamp_raw.as_str(),
                article.author.as_str(),
                article.title.as_str(),
                article.url.as_str(),
            ],
        );
    }
    out
}

fn push_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        // Writing to a String cannot fail.
        let _ = write!(out, "{}", escape_field(field));
    }
    out.push_str(LINE_END);
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, author: &str) -> Article {
        Article {
            title: title.into(),
            url: "https://apnews.com/article/x".into(),
            source: "AP News".into(),
            source_url: "https://apnews.com".into(),
            author: author.into(),
            timestamp_raw: "07/02/2025, 05:49 PM, +0000 UTC".into(),
        }
    }

    #[test]
    fn test_header_only_for_no_articles() {
        assert_eq!(
            render_csv(&[]),
            "number,source,source_url,date,author,title,url\r\n"
        );
    }

    #[test]
    fn test_rows_are_numbered_and_quoted() {
        let csv = render_csv(&[
            article("Plain title", "Jane Doe"),
            article("Say \"hello\"", "Doe, Jane, Roe, Rick"),
        ]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "1,AP News,https://apnews.com,\"07/02/2025, 05:49 PM, +0000 UTC\",Jane Doe,Plain title,https://apnews.com/article/x"
        );
        assert!(lines[2].starts_with("2,"));
        assert!(lines[2].contains("\"Doe, Jane, Roe, Rick\""));
        assert!(lines[2].contains("\"Say \"\"hello\"\"\""));
    }
}
