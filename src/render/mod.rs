//! Headless-browser rendering backend.
//!
//! Defines the [`BrowserLauncher`] and [`RenderSession`] traits that abstract
//! over the browser engine (Chromium via chromiumoxide in production, an
//! in-memory fake in tests), and the [`RenderBackend`] that drives them under
//! a shared token pool and a retry policy.

pub mod backend;
pub mod chromium;
#[cfg(test)]
pub mod fake;
pub mod limiter;
pub mod profile;

pub use backend::RenderBackend;
pub use limiter::RenderLimiter;
pub use profile::RenderProfile;

use crate::error::RenderError;
use async_trait::async_trait;

/// Starts isolated browser contexts.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a fresh context presenting `profile`, with JavaScript enabled.
    async fn launch(&self, profile: &RenderProfile) -> Result<Box<dyn RenderSession>, RenderError>;
}

/// One browser context bound to a single request.
///
/// The owner must call [`RenderSession::close`] exactly once on every path.
#[async_trait]
pub trait RenderSession: Send {
    /// Apply anti-bot-detection patches. Called before navigation.
    async fn prepare(&mut self) -> Result<(), RenderError>;
    /// Load `url` and wait for the network to settle. Returns the HTTP status when known.
    async fn navigate(&mut self, url: &str) -> Result<Option<u16>, RenderError>;
    /// The fully rendered HTML of the current page.
    async fn content(&mut self) -> Result<String, RenderError>;
    /// Tear the context down.
    async fn close(self: Box<Self>);
}
