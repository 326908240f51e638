//! Rendering with a bounded token pool and retries.
//!
//! One attempt: take a token, pick a profile, launch a session, prepare it,
//! navigate under a timeout, read the HTML and close the session. The attempt
//! is wrapped in [`Retry`]; an HTTP error status ends the call without retrying.
//!
//! Every browser call is time-bounded. A session whose attempt is dropped
//! midway is closed in the background, and its token is only returned once
//! that close finishes.

use super::limiter::RenderToken;
use super::{BrowserLauncher, RenderLimiter, RenderProfile, RenderSession};
use crate::error::RenderError;
use crate::retry::{AttemptAsync, Retry, RetryPolicy};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Extra time allowed on top of the navigation timeout for the whole
/// prepare, navigate and content sequence.
const DRIVE_MARGIN: Duration = Duration::from_secs(10);
/// Upper bound on tearing a session down.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(20);

/// What a single render attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Html(String),
    /// The page answered with a 4xx/5xx status.
    HttpError(u16),
}

/// A single render attempt, without retries.
pub struct RenderAttempt {
    launcher: Arc<dyn BrowserLauncher>,
    limiter: RenderLimiter,
    nav_timeout: Duration,
}

/// A launched session and the token it runs under.
///
/// Dropping the guard without calling [`SessionGuard::close`] closes the
/// session on a background task.
struct SessionGuard {
    session: Option<Box<dyn RenderSession>>,
    token: Option<RenderToken>,
}

impl SessionGuard {
    fn new(session: Box<dyn RenderSession>, token: RenderToken) -> Self {
        Self {
            session: Some(session),
            token: Some(token),
        }
    }

    fn session(&mut self) -> Result<&mut (dyn RenderSession + 'static), RenderError> {
        self.session
            .as_deref_mut()
            .ok_or_else(|| RenderError::Unavailable("session already closed".into()))
    }

    async fn close(mut self) {
        if let Some(session) = self.session.take() {
            close_bounded(session).await;
        }
        self.token.take();
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let token = self.token.take();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("render attempt dropped; closing session in background");
                handle.spawn(async move {
                    close_bounded(session).await;
                    drop(token);
                });
            }
            Err(_) => warn!("render attempt dropped outside a runtime; session leaked"),
        }
    }
}

async fn close_bounded(session: Box<dyn RenderSession>) {
    if tokio::time::timeout(CLOSE_TIMEOUT, session.close()).await.is_err() {
        warn!(
            timeout_ms = CLOSE_TIMEOUT.as_millis() as u64,
            "closing render session timed out"
        );
    }
}

impl RenderAttempt {
    /// Run [`Self::drive`] with an overall deadline.
    async fn drive_bounded(
        &self,
        session: &mut dyn RenderSession,
        url: &str,
    ) -> Result<Rendered, RenderError> {
        let deadline = self.nav_timeout + DRIVE_MARGIN;
        tokio::time::timeout(deadline, self.drive(session, url))
            .await
            .map_err(|_| RenderError::Timeout(deadline.as_millis() as u64))?
    }

    async fn drive(
        &self,
        session: &mut dyn RenderSession,
        url: &str,
    ) -> Result<Rendered, RenderError> {
        session.prepare().await?;

        let timeout_ms = self.nav_timeout.as_millis() as u64;
        let status = tokio::time::timeout(self.nav_timeout, session.navigate(url))
            .await
            .map_err(|_| RenderError::Timeout(timeout_ms))??;

        if let Some(status) = status.filter(|s| (400..600).contains(s)) {
            return Ok(Rendered::HttpError(status));
        }

        Ok(Rendered::Html(session.content().await?))
    }
}

impl AttemptAsync for RenderAttempt {
    type Output = Rendered;
    type Error = RenderError;

    async fn attempt(&self, url: &str) -> Result<Rendered, RenderError> {
        let token = self.limiter.acquire().await?;
        debug!(
            in_use = self.limiter.in_use(),
            capacity = self.limiter.capacity(),
            "render token acquired"
        );
        let profile = RenderProfile::random();
        let t0 = Instant::now();

        let session = self.launcher.launch(&profile).await?;
        let mut guard = SessionGuard::new(session, token);
        let outcome = match guard.session() {
            Ok(session) => self.drive_bounded(session, url).await,
            Err(e) => Err(e),
        };
        guard.close().await;

        let elapsed_ms = t0.elapsed().as_millis() as u64;
        match &outcome {
            Ok(Rendered::Html(html)) => info!(
                layer = "rendered",
                %url,
                elapsed_ms,
                bytes = html.len(),
                user_agent = profile.user_agent,
                width = profile.viewport.width,
                "render succeeded"
            ),
            Ok(Rendered::HttpError(status)) => info!(
                layer = "rendered",
                %url,
                elapsed_ms,
                status,
                "render returned http error"
            ),
            Err(e) => warn!(
                layer = "rendered",
                %url,
                elapsed_ms,
                error = %e,
                "render attempt failed"
            ),
        }
        outcome
    }
}

/// Renders pages in a headless browser and returns their final HTML.
pub struct RenderBackend {
    retry: Retry<RenderAttempt>,
}

impl RenderBackend {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        limiter: RenderLimiter,
        nav_timeout: Duration,
        policy: RetryPolicy,
    ) -> Self {
        let attempt = RenderAttempt {
            launcher,
            limiter,
            nav_timeout,
        };
        Self {
            retry: Retry::new(attempt, policy, RenderError::is_retryable),
        }
    }

    #[cfg(test)]
    pub fn limiter(&self) -> &RenderLimiter {
        &self.retry.inner().limiter
    }

    /// Render `url` and return its HTML.
    ///
    /// `None` when the page answers with an error status, or when every
    /// attempt failed. Never returns an error.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_html(&self, url: &str) -> Option<String> {
        match self.retry.attempt(url).await {
            Ok(Rendered::Html(html)) => Some(html),
            Ok(Rendered::HttpError(_)) => None,
            Err(e) => {
                warn!(
                    layer = "rendered",
                    %url,
                    attempts = self.retry.policy().max_attempts,
                    error = %e,
                    "rendering gave up"
                );
                None
            }
        }
    }
}
