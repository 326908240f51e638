//! Runtime configuration for the extraction pipeline.
//!
//! [`ExtractorConfig::default`] carries the production constants; the CLI
//! overrides individual values.

use crate::cli::Cli;
use crate::retry::RetryPolicy;
use std::path::PathBuf;
use std::time::Duration;

/// Minimum characters of text for any layer to be accepted.
pub const MIN_CONTENT_CHARS: usize = 1000;
/// Readability output shorter than this triggers the precision fallback in the rendered layer.
pub const RENDER_FALLBACK_CHARS: usize = 500;
/// Default capacity of the rendering token pool.
pub const DEFAULT_RENDER_POOL: usize = 5;
/// Default navigation timeout for a rendered page.
pub const DEFAULT_NAV_TIMEOUT: Duration = Duration::from_millis(30_000);

/// User agent sent by the static layers.
pub const STATIC_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";

/// Tunables shared by the orchestrator and its layers.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub min_chars: usize,
    pub render_fallback_chars: usize,
    pub http_timeout: Duration,
    pub max_body_bytes: usize,
    pub render: RenderConfig,
}

/// Tunables of the rendering backend.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// `false` removes the rendered layer from the chain.
    pub enabled: bool,
    pub pool_size: usize,
    pub nav_timeout: Duration,
    pub retry: RetryPolicy,
    /// Explicit browser executable; discovered on `PATH` when `None`.
    pub chrome_path: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_chars: MIN_CONTENT_CHARS,
            render_fallback_chars: RENDER_FALLBACK_CHARS,
            http_timeout: Duration::from_secs(15),
            max_body_bytes: 10 * 1024 * 1024,
            render: RenderConfig::default(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pool_size: DEFAULT_RENDER_POOL,
            nav_timeout: DEFAULT_NAV_TIMEOUT,
            retry: RetryPolicy::default(),
            chrome_path: None,
        }
    }
}

impl From<&Cli> for ExtractorConfig {
    fn from(args: &Cli) -> Self {
        Self {
            min_chars: args.min_chars,
            render_fallback_chars: args.render_fallback_chars,
            http_timeout: Duration::from_secs(args.http_timeout_secs),
            max_body_bytes: args.max_body_bytes,
            render: RenderConfig {
                enabled: !args.no_render,
                pool_size: args.render_pool.max(1),
                nav_timeout: Duration::from_millis(args.nav_timeout_ms),
                retry: RetryPolicy::default(),
                chrome_path: args.chrome_path.clone(),
            },
        }
    }
}
