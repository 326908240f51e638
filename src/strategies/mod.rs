//! The extraction layers, in the order the orchestrator tries them.
//!
//! Each layer implements [`Strategy`]: given a URL it either returns the
//! article it found or explains why it found none. Length gating against the
//! minimum content threshold happens in the orchestrator, so every layer is
//! judged by the same rule.

pub mod fast;
pub mod readability;
pub mod rendered;

pub use fast::StaticFast;
pub use readability::StaticReadability;
pub use rendered::Rendered;

use crate::content::ExtractedArticle;
use crate::error::StrategyError;
use crate::models::StrategyKind;
use async_trait::async_trait;

/// One extraction layer.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Try to recover the article behind `url`.
    ///
    /// Errors mean "this layer found nothing"; they never abort a request.
    async fn attempt(&self, url: &str) -> Result<ExtractedArticle, StrategyError>;
}
