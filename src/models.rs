//! Data models for article records and extraction diagnostics.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ArticleRecord`]: An upstream article record, enriched with `content`
//! - [`ExtractionResult`]: The accepted text of one URL plus how it was obtained
//! - [`ExtractionReport`]: The result together with the per-layer history
//! - [`StrategyKind`] / [`ContentExtractor`]: Which layer and which algorithm won

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// An article record as supplied by the upstream news fetch.
///
/// Only `url` is interpreted. Every other field is carried through untouched,
/// so the output collection is the input collection plus `content`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ArticleRecord {
    /// The article URL as supplied. Kept as raw JSON so a record with a
    /// non-string `url` is passed through with `content: null` instead of
    /// failing the whole collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Value>,
    /// Extracted article text, `None` when no layer produced enough content.
    #[serde(default)]
    pub content: Option<String>,
    /// Any other fields of the upstream record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ArticleRecord {
    /// Build a bare record for a URL.
    #[cfg(test)]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(Value::String(url.into())),
            ..Default::default()
        }
    }

    /// The URL, when the record carries one as a string.
    pub fn url_str(&self) -> Option<&str> {
        self.url.as_ref().and_then(Value::as_str)
    }
}

/// The extraction layer that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    /// Direct HTTP GET plus main-block heuristics.
    StaticFast,
    /// Direct HTTP GET plus readability scoring.
    StaticReadability,
    /// Headless browser rendering.
    Rendered,
}

impl StrategyKind {
    /// Short layer name used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::StaticFast => "static_fast",
            StrategyKind::StaticReadability => "static_readability",
            StrategyKind::Rendered => "rendered",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The content algorithm that produced the accepted text.
///
/// The rendered layer can finish with either readability or the precision
/// fallback, so this is tracked separately from [`StrategyKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentExtractor {
    MainBlock,
    Readability,
    Precision,
}

/// The accepted content of one URL.
///
/// `text` always meets the minimum content threshold that gated its acceptance.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ExtractionResult {
    /// The requested URL.
    pub url: String,
    /// Article title, if one could be resolved.
    pub title: Option<String>,
    /// Plain-text article body.
    pub text: String,
    /// The layer that produced `text`.
    pub strategy: StrategyKind,
    /// The algorithm inside that layer that produced `text`.
    pub extractor: ContentExtractor,
    /// Wall-clock time from the start of the request to acceptance.
    pub elapsed_ms: u64,
}

/// What happened when one layer was tried.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LayerOutcome {
    Accepted { chars: usize },
    Insufficient { chars: usize },
    Errored { error: String },
}

/// One entry of the per-request layer history.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LayerAttempt {
    pub strategy: StrategyKind,
    #[serde(flatten)]
    pub outcome: LayerOutcome,
    pub elapsed_ms: u64,
}

impl LayerAttempt {
    #[cfg(test)]
    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, LayerOutcome::Accepted { .. })
    }
}

/// Result of one request together with every layer that was tried.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ExtractionReport {
    pub url: String,
    pub result: Option<ExtractionResult>,
    pub attempts: Vec<LayerAttempt>,
}

/// Number of characters (not bytes) in a piece of text.
///
/// All content thresholds are expressed in characters.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}
