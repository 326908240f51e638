//! Batch enrichment of upstream article records.
//!
//! Every record is processed exactly once, with up to `concurrency` requests
//! in flight. Output order equals input order. A record that cannot be
//! enriched gets `content: null`; nothing aborts the batch.

use crate::extractor::Extractor;
use crate::models::{ArticleRecord, StrategyKind};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// How one record ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordOutcome {
    Extracted(StrategyKind),
    NoContent,
    Skipped,
}

/// Totals for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub extracted: usize,
    /// Records whose URL went through every layer without result.
    pub failed: usize,
    /// Records with a missing or malformed URL.
    pub skipped: usize,
    pub by_strategy: HashMap<StrategyKind, usize>,
    pub elapsed_ms: u64,
}

/// Fill in `content` for every record.
pub async fn enrich_records(
    extractor: &Extractor,
    records: Vec<ArticleRecord>,
    concurrency: usize,
) -> (Vec<ArticleRecord>, BatchSummary) {
    let started = Instant::now();
    let total = records.len();
    info!(total, concurrency, layers = ?extractor.layers(), "Starting batch enrichment");

    let enriched: Vec<(ArticleRecord, RecordOutcome)> = stream::iter(records.into_iter().enumerate())
        .map(|(index, record)| enrich_one(extractor, index, record))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut summary = BatchSummary {
        total,
        by_strategy: enriched
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                RecordOutcome::Extracted(kind) => Some(*kind),
                _ => None,
            })
            .counts(),
        elapsed_ms: started.elapsed().as_millis() as u64,
        ..Default::default()
    };
    for (_, outcome) in &enriched {
        match outcome {
            RecordOutcome::Extracted(_) => summary.extracted += 1,
            RecordOutcome::NoContent => summary.failed += 1,
            RecordOutcome::Skipped => summary.skipped += 1,
        }
    }

    info!(
        total = summary.total,
        extracted = summary.extracted,
        failed = summary.failed,
        skipped = summary.skipped,
        static_fast = summary.by_strategy.get(&StrategyKind::StaticFast).copied().unwrap_or(0),
        static_readability = summary
            .by_strategy
            .get(&StrategyKind::StaticReadability)
            .copied()
            .unwrap_or(0),
        rendered = summary.by_strategy.get(&StrategyKind::Rendered).copied().unwrap_or(0),
        elapsed_ms = summary.elapsed_ms,
        "Completed batch enrichment"
    );

    (enriched.into_iter().map(|(record, _)| record).collect(), summary)
}

async fn enrich_one(
    extractor: &Extractor,
    index: usize,
    mut record: ArticleRecord,
) -> (ArticleRecord, RecordOutcome) {
    let Some(url) = record.url_str().map(str::to_owned) else {
        match &record.url {
            Some(other) => warn!(index, url = %other, "Record url is not a string; leaving content empty"),
            None => warn!(index, "Record has no url; leaving content empty"),
        }
        record.content = None;
        return (record, RecordOutcome::Skipped);
    };

    debug!(index, %url, "Enriching record");
    let outcome = match extractor.extract(&url).await {
        Ok(Some(result)) => {
            let kind = result.strategy;
            record.content = Some(result.text);
            RecordOutcome::Extracted(kind)
        }
        Ok(None) => {
            record.content = None;
            RecordOutcome::NoContent
        }
        Err(e) => {
            warn!(index, %url, error = %e, "Skipping record with unusable url");
            record.content = None;
            RecordOutcome::Skipped
        }
    };
    (record, outcome)
}
