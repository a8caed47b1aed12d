//! Export writers for search results.
//!
//! # Submodules
//!
//! - [`csv`]: one row per article, for spreadsheets
//! - [`text`]: a readable digest, also used as an email body by external senders
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── 20250702_174900_climate_tech_filtered.csv
//! ├── 20250702_174900_climate_tech_filtered.txt
//! ├── news_20250702_174900.csv      # only when several keywords were searched
//! └── news_20250702_174900.txt
//! ```
//!
//! Filenames carry a second-resolution timestamp and the keywords, so
//! concurrent runs for different keywords never write the same file.

pub mod csv;
pub mod text;

use crate::error::SearchError;
use crate::utils::safe_keywords;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// File name for one keyword's export: `{stamp}_{keywords}{suffix}.{ext}`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     keyword_file_name("20250702_174900", "climate tech", "_filtered", "csv"),
///     "20250702_174900_climate_tech_filtered.csv"
/// );
/// ```
pub fn keyword_file_name(stamp: &str, keywords: &str, suffix: &str, ext: &str) -> String {
    format!("{}_{}{}.{}", stamp, safe_keywords(keywords), suffix, ext)
}

/// `news_{stamp}.{ext}`
pub fn combined_file_name(stamp: &str, ext: &str) -> String {
    format!("news_{}.{}", stamp, ext)
}

/// Write rendered export content to `dir/file_name`.
///
/// # Arguments
///
/// * `dir` - Output directory, already checked by
///   [`ensure_writable_dir`](crate::utils::ensure_writable_dir)
/// * `file_name` - Name from [`keyword_file_name`] or [`combined_file_name`]
/// * `contents` - Rendered CSV or text
///
/// # Returns
///
/// The full path written.
///
/// # Errors
///
/// [`SearchError::Export`] if the write fails; the error is also logged.
#[instrument(level = "info", skip(contents), fields(dir = %dir.display()))]
pub async fn write_export(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf, SearchError> {
    let path = dir.join(file_name);
    if let Err(source) = fs::write(&path, contents).await {
        error!(path = %path.display(), error = %source, "Failed writing export");
        return Err(SearchError::Export { path, source });
    }
    info!(path = %path.display(), bytes = contents.len(), "Wrote export");
    Ok(path)
}
