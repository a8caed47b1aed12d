//! Plain-text digest export.

use crate::models::Article;
use chrono::NaiveDateTime;
use std::fmt::Write;

/// Render a readable digest: a heading naming the keywords, a generation
/// time, then one block per article separated by a rule line.
pub fn render_text(articles: &[Article], keywords: &str, generated_on: NaiveDateTime) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "NEWS SEARCH RESULTS - KEYWORDS: {}", keywords.to_uppercase());
    let _ = writeln!(out, "{}\n", "=".repeat(50));
    let _ = writeln!(out, "Generated on: {}\n", generated_on.format("%Y-%m-%d %H:%M:%S"));

    for (i, article) in articles.iter().enumerate() {
        let _ = writeln!(out, "Article {}:", i + 1);
        let _ = writeln!(out, "Title: {}", article.title);
        let _ = writeln!(out, "URL: {}", article.url);
        let _ = writeln!(out, "Source: {}", article.source);
        let _ = writeln!(out, "Author: {}", article.author);
        let _ = writeln!(out, "Timestamp: {}", article.timestamp_raw);
        let _ = writeln!(out, "{}\n", "-".repeat(40));
    }
    out
}
