//! JSON input and output for article record collections.
//!
//! The whole collection is written once, after every record has been
//! processed, so a crashed run never leaves a half-written file behind.

use crate::models::ArticleRecord;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Read a JSON array of article records.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_records(path: &Path) -> Result<Vec<ArticleRecord>, Box<dyn Error>> {
    let raw = fs::read_to_string(path).await?;
    let records: Vec<ArticleRecord> = serde_json::from_str(&raw)?;
    info!(count = records.len(), "Read article records");
    Ok(records)
}

/// Write `records` as one pretty-printed JSON array, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_records(records: &[ArticleRecord], path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(count = records.len(), "Wrote enriched records");
    Ok(())
}
