//! Small helpers for file reading, output directories, and naming.

use crate::error::SearchError;
use chrono::NaiveDateTime;
use std::fs as stdfs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Read a text file and return its trimmed, non-empty lines.
///
/// Used for topic lists and media allow-lists, both one entry per line.
///
/// # Arguments
///
/// * `path` - File to read
///
/// # Returns
///
/// Each line with surrounding whitespace removed, blank lines skipped, in
/// file order.
///
/// # Errors
///
/// [`SearchError::ReadFile`] if the file is missing or not valid UTF-8.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn read_file_lines(path: &Path) -> Result<Vec<String>, SearchError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| SearchError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    debug!(count = lines.len(), "Read lines");
    Ok(lines)
}

/// Split a comma-separated keyword string, dropping empty pieces.
///
/// ```ignore
/// assert_eq!(split_keywords("SOSV, Climate Tech,"), vec!["SOSV", "Climate Tech"]);
/// ```
pub fn split_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with an
/// ellipsis and remaining byte count appended.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of bytes to keep
///
/// # Returns
///
/// The original string if it fits, otherwise a truncated version with
/// `"…(+N bytes)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Timestamp prefix used in export filenames, e.g. `20250702_174900`.
pub fn file_stamp(now: NaiveDateTime) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Keywords made safe for a filename: spaces become underscores and path
/// separators are dropped.
pub fn safe_keywords(keywords: &str) -> String {
    keywords
        .trim()
        .replace(' ', "_")
        .replace(['/', '\\'], "")
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file so
/// an unwritable output location fails before any search runs.
///
/// # Arguments
///
/// * `path` - The output directory
///
/// # Returns
///
/// The directory path, ready for [`write_export`](crate::outputs::write_export).
///
/// # Errors
///
/// [`SearchError::OutputDir`] if the directory cannot be created or written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<PathBuf, SearchError> {
    let to_err = |source| SearchError::OutputDir {
        path: path.to_path_buf(),
        source,
    };
    fs::create_dir_all(path).await.map_err(to_err)?;

    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path).map_err(to_err)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(path.to_path_buf())
}
