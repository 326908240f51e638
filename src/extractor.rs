//! Extraction orchestrator.
//!
//! Tries each layer in priority order and accepts the first article that
//! meets the minimum content threshold. Layers run strictly one after the
//! other; a layer that errors or comes up short hands over to the next one.
//!
//! ```text
//! STATIC_FAST ──short/error──▶ STATIC_READABILITY ──short/error──▶ RENDERED ──short/error──▶ None
//!      │                              │                                │
//!      └──────────── ≥ min_chars ─────┴────────────────────────────────┴──▶ ExtractionResult
//! ```

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, FetchError};
use crate::fetch::HttpFetcher;
use crate::models::{
    ExtractionReport, ExtractionResult, LayerAttempt, LayerOutcome, StrategyKind,
};
use crate::render::chromium::ChromiumLauncher;
use crate::render::{RenderBackend, RenderLimiter};
use crate::strategies::{Rendered, StaticFast, StaticReadability, Strategy};
use itertools::Itertools;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use url::Url;

/// Runs the layer chain for one URL at a time.
///
/// Shareable across tasks; the only shared state is the rendering token pool.
pub struct Extractor {
    strategies: Vec<Box<dyn Strategy>>,
    min_chars: usize,
}

impl Extractor {
    /// Use an explicit, ordered list of layers.
    pub fn new(strategies: Vec<Box<dyn Strategy>>, min_chars: usize) -> Self {
        Self {
            strategies,
            min_chars,
        }
    }

    /// Build the production chain: both static layers, then Chromium rendering when enabled.
    pub fn from_config(config: &ExtractorConfig) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(config.http_timeout, config.max_body_bytes)?;
        let mut strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(StaticFast::new(fetcher.clone())),
            Box::new(StaticReadability::new(fetcher)),
        ];

        if config.render.enabled {
            let launcher = Arc::new(ChromiumLauncher::new(config.render.chrome_path.clone()));
            let backend = RenderBackend::new(
                launcher,
                RenderLimiter::new(config.render.pool_size),
                config.render.nav_timeout,
                config.render.retry,
            );
            strategies.push(Box::new(Rendered::new(
                backend,
                config.render_fallback_chars,
            )));
        }

        Ok(Self::new(strategies, config.min_chars))
    }

    /// The layers in the order they are tried.
    pub fn layers(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    /// Extract the article behind `url`.
    ///
    /// `Ok(None)` when no layer produced enough text. Only a malformed URL is an error.
    pub async fn extract(&self, url: &str) -> Result<Option<ExtractionResult>, ExtractError> {
        Ok(self.extract_with_report(url).await?.result)
    }

    /// Like [`Extractor::extract`], also returning every layer that was tried.
    #[instrument(level = "info", skip(self))]
    pub async fn extract_with_report(&self, url: &str) -> Result<ExtractionReport, ExtractError> {
        validate_url(url)?;

        let started = Instant::now();
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let layer = strategy.kind();
            let t0 = Instant::now();
            let outcome = strategy.attempt(url).await;
            let elapsed_ms = t0.elapsed().as_millis() as u64;

            match outcome {
                Ok(article) if article.chars() >= self.min_chars => {
                    let chars = article.chars();
                    info!(layer = layer.as_str(), %url, elapsed_ms, chars, "extract_success");
                    attempts.push(LayerAttempt {
                        strategy: layer,
                        outcome: LayerOutcome::Accepted { chars },
                        elapsed_ms,
                    });

                    let result = ExtractionResult {
                        url: url.to_string(),
                        title: article.title,
                        text: article.text,
                        strategy: layer,
                        extractor: article.extractor,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    };
                    return Ok(ExtractionReport {
                        url: url.to_string(),
                        result: Some(result),
                        attempts,
                    });
                }
                Ok(article) => {
                    let chars = article.chars();
                    info!(
                        layer = layer.as_str(),
                        %url,
                        elapsed_ms,
                        chars,
                        min_chars = self.min_chars,
                        "extract_insufficient"
                    );
                    attempts.push(LayerAttempt {
                        strategy: layer,
                        outcome: LayerOutcome::Insufficient { chars },
                        elapsed_ms,
                    });
                }
                Err(e) => {
                    warn!(layer = layer.as_str(), %url, elapsed_ms, error = %e, "extract_failed");
                    attempts.push(LayerAttempt {
                        strategy: layer,
                        outcome: LayerOutcome::Errored {
                            error: e.to_string(),
                        },
                        elapsed_ms,
                    });
                }
            }
        }

        let history = attempts
            .iter()
            .map(|a| match &a.outcome {
                LayerOutcome::Accepted { chars } => format!("{}=accepted({chars})", a.strategy),
                LayerOutcome::Insufficient { chars } => format!("{}=short({chars})", a.strategy),
                LayerOutcome::Errored { .. } => format!("{}=error", a.strategy),
            })
            .join(" ");
        warn!(
            %url,
            layers = %history,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "extract_failed_all_layers"
        );

        Ok(ExtractionReport {
            url: url.to_string(),
            result: None,
            attempts,
        })
    }
}

/// Accept only absolute `http`/`https` URLs.
pub fn validate_url(url: &str) -> Result<Url, ExtractError> {
    let parsed = Url::parse(url).map_err(|source| ExtractError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ExtractError::UnsupportedScheme {
            scheme: other.to_string(),
        }),
    }
}
