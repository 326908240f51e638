//! Layer 3: headless rendering, then readability with a precision fallback.
//!
//! Readability output shorter than the fallback threshold is replaced by the
//! precision extractor's output, whatever its length. The orchestrator then
//! applies the minimum content threshold as for every other layer.

use super::Strategy;
use crate::content::{ExtractedArticle, precision, readability};
use crate::error::StrategyError;
use crate::models::{ContentExtractor, StrategyKind, char_count};
use crate::render::RenderBackend;
use async_trait::async_trait;
use tracing::debug;

pub struct Rendered {
    backend: RenderBackend,
    fallback_chars: usize,
}

impl Rendered {
    pub fn new(backend: RenderBackend, fallback_chars: usize) -> Self {
        Self {
            backend,
            fallback_chars,
        }
    }
}

#[async_trait]
impl Strategy for Rendered {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Rendered
    }

    async fn attempt(&self, url: &str) -> Result<ExtractedArticle, StrategyError> {
        let html = self
            .backend
            .fetch_html(url)
            .await
            .ok_or(StrategyError::NotRendered)?;
        let article = extract_rendered(&html, self.fallback_chars).ok_or(StrategyError::NoContent)?;
        debug!(
            layer = "rendered",
            %url,
            chars = article.chars(),
            extractor = ?article.extractor,
            "rendered page extracted"
        );
        Ok(article)
    }
}

fn extract_rendered(html: &str, fallback_chars: usize) -> Option<ExtractedArticle> {
    let readable = readability::extract(html);
    let title = readable.as_ref().and_then(|r| r.title.clone());

    match readable {
        Some(r) if char_count(&r.text) >= fallback_chars => Some(ExtractedArticle {
            title: r.title,
            text: r.text,
            extractor: ContentExtractor::Readability,
        }),
        _ => precision::extract(html).map(|text| ExtractedArticle {
            title,
            text,
            extractor: ContentExtractor::Precision,
        }),
    }
}
