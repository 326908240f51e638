//! Error types for each stage of the extraction pipeline.
//!
//! Only [`ExtractError`] ever reaches a caller of the orchestrator. The other
//! types are logged where they occur and degrade to "try the next layer".

use thiserror::Error;

/// Programmer-error inputs rejected by [`crate::extractor::Extractor`].
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported url scheme {scheme:?} (expected http or https)")]
    UnsupportedScheme { scheme: String },
}

/// Failures of a direct HTTP fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http status {0}")]
    Status(u16),
    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("unexpected content type {0:?}")]
    NotHtml(String),
}

/// Failures inside the rendering backend.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no browser executable available: {0}")]
    Unavailable(String),
    #[error("browser launch failed: {0}")]
    Launch(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("navigation timed out after {0}ms")]
    Timeout(u64),
    #[error("page script failed: {0}")]
    Script(String),
}

impl RenderError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// A missing browser binary will still be missing on the next attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RenderError::Unavailable(_))
    }
}

/// Why a layer produced no article.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("no article content found")]
    NoContent,
    #[error("rendering produced no html")]
    NotRendered,
}
