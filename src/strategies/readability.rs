//! Layer 2: an independent fetch plus readability scoring.

use super::Strategy;
use crate::content::{ExtractedArticle, readability};
use crate::error::StrategyError;
use crate::fetch::HttpFetcher;
use crate::models::{ContentExtractor, StrategyKind};
use async_trait::async_trait;
use tracing::debug;

pub struct StaticReadability {
    fetcher: HttpFetcher,
}

impl StaticReadability {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Strategy for StaticReadability {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StaticReadability
    }

    async fn attempt(&self, url: &str) -> Result<ExtractedArticle, StrategyError> {
        let html = self.fetcher.fetch_html(url).await?;
        let readable = readability::extract(&html).ok_or(StrategyError::NoContent)?;
        let article = ExtractedArticle {
            title: readable.title,
            text: readable.text,
            extractor: ContentExtractor::Readability,
        };
        debug!(layer = "static_readability", %url, chars = article.chars(), "readability extracted");
        Ok(article)
    }
}
