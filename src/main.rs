//! # News Extract
//!
//! Recovers the main text of news articles from their URLs, despite anti-bot
//! defenses, script-built pages and inconsistent markup.
//!
//! ## Features
//!
//! - Three extraction layers tried in order: a fast static fetch, a static
//!   fetch with readability scoring, and headless Chromium rendering
//! - A shared token pool capping simultaneous browser sessions
//! - Retries with exponential backoff for transient rendering failures
//! - Per-layer diagnostics for every URL
//!
//! ## Usage
//!
//! ```sh
//! news_extract -i ./news.json -o ./news_with_content.json
//! news_extract --url https://example.com/story
//! ```
//!
//! ## Architecture
//!
//! 1. **Read**: Load the upstream article records
//! 2. **Extract**: Run each URL through the layer chain (12 at a time by default)
//! 3. **Write**: Save all records, each with `content` filled in or `null`

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod batch;
mod cli;
mod config;
mod content;
mod error;
mod extractor;
mod fetch;
mod models;
mod outputs;
mod render;
mod retry;
mod strategies;
mod utils;

use cli::Cli;
use config::ExtractorConfig;
use extractor::Extractor;
use outputs::json;
use utils::{ensure_writable_dir, truncate_for_log};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_extract starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = ExtractorConfig::from(&args);
    let extractor = Extractor::from_config(&config)?;
    info!(
        layers = ?extractor.layers(),
        min_chars = extractor.min_chars(),
        render_pool = config.render.pool_size,
        nav_timeout = ?config.render.nav_timeout,
        "Extractor ready"
    );

    if let Some(url) = args.url.as_deref() {
        let report = extractor.extract_with_report(url).await?;
        if let Some(result) = &report.result {
            info!(
                strategy = %result.strategy,
                chars = result.text.chars().count(),
                preview = %truncate_for_log(&result.text, 200),
                "Extracted article"
            );
        }
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let (Some(input), Some(output)) = (args.input.as_deref(), args.output.as_deref()) else {
        return Err("either --url or both --input and --output are required".into());
    };

    // Early check: fail before extracting anything if the result cannot be saved.
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let records = json::read_records(input).await?;
    let (records, summary) = batch::enrich_records(&extractor, records, args.concurrency).await;

    if let Err(e) = json::write_records(&records, output).await {
        error!(path = %output.display(), error = %e, "Failed to write enriched records");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        extracted = summary.extracted,
        failed = summary.failed,
        skipped = summary.skipped,
        "Execution complete"
    );

    Ok(())
}
