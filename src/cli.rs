//! Command-line interface definitions for News Sift.
//!
//! Every option can also come from the YAML file given with `--config`;
//! flags given here take precedence.

use crate::dates::Preset;
use crate::domains::MatchMode;
use clap::Parser;
use std::path::PathBuf;

/// Search news by keyword, keep allow-listed media, export CSV and text.
///
/// # Examples
///
/// ```sh
/// # Past month of coverage for two topics, filtered by media.txt
/// news_sift -k "SOSV, climate tech" -p past-month -m media.txt
///
/// # Explicit range, topics from a file, results into ./out
/// news_sift -t topics.txt -s 2025-01-01 -e 2025-03-31 -o out
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Comma-separated keywords; each one is searched separately
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// File with one search topic per line
    #[arg(short, long)]
    pub topics_file: Option<PathBuf>,

    /// Start date (YYYY-MM-DD, MM/DD/YYYY, YYYYMMDD or YYYY/MM/DD)
    #[arg(short, long, requires = "end")]
    pub start: Option<String>,

    /// End date, inclusive (same formats as --start)
    #[arg(short, long, requires = "start")]
    pub end: Option<String>,

    /// Named date window instead of --start/--end
    #[arg(short, long, value_enum, conflicts_with_all = ["start", "end"])]
    pub preset: Option<Preset>,

    /// Maximum results requested per keyword
    #[arg(short = 'n', long)]
    pub max_results: Option<u32>,

    /// Newline-delimited list of allowed media domains or URLs
    #[arg(short, long)]
    pub media_list: Option<PathBuf>,

    /// Directory for CSV and text exports
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// How article domains are compared with the media list
    #[arg(long, value_enum)]
    pub match_mode: Option<MatchMode>,

    /// Keyword searches allowed in flight at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// SerpApi key
    #[arg(long, env = "SERP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Search engine name passed to SerpApi
    #[arg(long)]
    pub engine: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "news_sift",
            "--keywords",
            "SOSV, climate tech",
            "--start",
            "2025-01-01",
            "--end",
            "2025-01-31",
            "--media-list",
            "media.txt",
        ]);

        assert_eq!(cli.keywords.as_deref(), Some("SOSV, climate tech"));
        assert_eq!(cli.start.as_deref(), Some("2025-01-01"));
        assert_eq!(cli.end.as_deref(), Some("2025-01-31"));
        assert_eq!(cli.media_list, Some(PathBuf::from("media.txt")));
        assert_eq!(cli.preset, None);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "news_sift",
            "-t",
            "topics.txt",
            "-p",
            "past-week",
            "-n",
            "50",
            "-o",
            "/tmp/out",
        ]);

        assert_eq!(cli.topics_file, Some(PathBuf::from("topics.txt")));
        assert_eq!(cli.preset, Some(Preset::PastWeek));
        assert_eq!(cli.max_results, Some(50));
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_preset_conflicts_with_explicit_dates() {
        let result = Cli::try_parse_from([
            "news_sift",
            "-k",
            "x",
            "-p",
            "ytd",
            "-s",
            "2025-01-01",
            "-e",
            "2025-02-01",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_start_requires_end() {
        assert!(Cli::try_parse_from(["news_sift", "-k", "x", "-s", "2025-01-01"]).is_err());
    }
}
