//! Command-line interface definitions for News Extract.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! All tunables can be provided via command-line flags or environment variables.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the News Extract application.
///
/// Runs either as a batch enrichment job (`--input`/`--output`) or against a
/// single URL (`--url`), which prints the extraction report as JSON.
///
/// # Examples
///
/// ```sh
/// # Enrich a collection of article records
/// news_extract -i ./data/news.json -o ./data/news_with_content.json
///
/// # Inspect a single URL without the browser layer
/// news_extract --url https://example.com/story --no-render
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON array of article records, each with a `url` field
    #[arg(short, long, required_unless_present = "url", requires = "output")]
    pub input: Option<PathBuf>,

    /// Path of the enriched JSON collection
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Extract a single URL and print the report
    #[arg(short, long, conflicts_with = "input")]
    pub url: Option<String>,

    /// Number of URLs processed concurrently in batch mode
    #[arg(long, env = "EXTRACT_CONCURRENCY", default_value_t = 12)]
    pub concurrency: usize,

    /// Maximum number of simultaneous browser sessions
    #[arg(long, env = "RENDER_POOL_SIZE", default_value_t = crate::config::DEFAULT_RENDER_POOL)]
    pub render_pool: usize,

    /// Navigation timeout for rendered pages, in milliseconds
    #[arg(long, env = "RENDER_NAV_TIMEOUT_MS", default_value_t = 30_000)]
    pub nav_timeout_ms: u64,

    /// Timeout for direct HTTP fetches, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 15)]
    pub http_timeout_secs: u64,

    /// Minimum characters of text for a layer to be accepted
    #[arg(long, env = "MIN_CONTENT_CHARS", default_value_t = crate::config::MIN_CONTENT_CHARS)]
    pub min_chars: usize,

    /// Readability output shorter than this switches the rendered layer to its fallback extractor
    #[arg(long, env = "RENDER_FALLBACK_CHARS", default_value_t = crate::config::RENDER_FALLBACK_CHARS)]
    pub render_fallback_chars: usize,

    /// Largest accepted response body for direct fetches, in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_body_bytes: usize,

    /// Chromium/Chrome executable used by the rendering layer
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Skip the headless browser layer
    #[arg(long, env = "NO_RENDER")]
    pub no_render: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_batch_parsing() {
        let cli = Cli::parse_from([
            "news_extract",
            "--input",
            "./in.json",
            "--output",
            "./out.json",
        ]);

        assert_eq!(cli.input, Some(PathBuf::from("./in.json")));
        assert_eq!(cli.output, Some(PathBuf::from("./out.json")));
        assert_eq!(cli.url, None);
        assert!(!cli.no_render);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["news_extract", "-i", "/tmp/in.json", "-o", "/tmp/out.json"]);

        assert_eq!(cli.input, Some(PathBuf::from("/tmp/in.json")));
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/out.json")));
    }

    #[test]
    fn test_cli_single_url() {
        let cli = Cli::parse_from(["news_extract", "-u", "https://example.com/story"]);
        assert_eq!(cli.url.as_deref(), Some("https://example.com/story"));
        assert_eq!(cli.input, None);
    }

    #[test]
    fn test_cli_requires_a_source() {
        assert!(Cli::try_parse_from(["news_extract"]).is_err());
        assert!(Cli::try_parse_from(["news_extract", "-i", "in.json"]).is_err());
    }
}
