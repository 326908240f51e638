//! Chromium sessions driven over CDP with chromiumoxide.
//!
//! Every session launches its own headless browser with a throwaway profile
//! directory, so no cookies or storage leak between requests.

use super::{BrowserLauncher, RenderProfile, RenderSession};
use crate::error::RenderError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use rand::{Rng, rng};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const NAV_STATUS_JS: &str =
    "(() => { const e = performance.getEntriesByType('navigation')[0]; return e ? (e.responseStatus || null) : null; })()";
const RESOURCE_COUNT_JS: &str = "performance.getEntriesByType('resource').length";
const OUTER_HTML_JS: &str = "document.documentElement.outerHTML";

const QUIET_POLL: Duration = Duration::from_millis(500);
const QUIET_MAX_POLLS: usize = 20;

/// Bound on each shutdown step before the process is killed.
const SHUTDOWN_STEP: Duration = Duration::from_secs(5);

/// Find a Chromium or Chrome binary on this machine.
pub fn find_chromium() -> Option<PathBuf> {
    for name in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Launches one headless Chromium per session.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    executable: Option<PathBuf>,
}

impl ChromiumLauncher {
    /// Use `explicit` when given, otherwise search the system.
    pub fn new(explicit: Option<PathBuf>) -> Self {
        let executable = explicit.or_else(find_chromium);
        match &executable {
            Some(path) => debug!(path = %path.display(), "using chromium"),
            None => warn!("no chromium executable found; rendering layer will be skipped"),
        }
        Self { executable }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, profile: &RenderProfile) -> Result<Box<dyn RenderSession>, RenderError> {
        let executable = self
            .executable
            .clone()
            .ok_or_else(|| RenderError::Unavailable("no chromium executable found".into()))?;

        let user_data_dir =
            std::env::temp_dir().join(format!("news-extract-{:016x}", rng().random::<u64>()));
        let viewport = profile.viewport;

        let config = BrowserConfig::builder()
            .chrome_executable(executable)
            .user_data_dir(&user_data_dir)
            .window_size(viewport.width, viewport.height)
            .headless_mode(HeadlessMode::New)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={}", profile.user_agent))
            .build()
            .map_err(RenderError::Launch)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "cdp handler event error");
                }
            }
        });

        let page = match open_page(&browser, profile).await {
            Ok(page) => page,
            Err(e) => {
                shutdown(&mut browser, handler, &user_data_dir).await;
                return Err(e);
            }
        };

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler,
            user_agent: profile.user_agent,
            user_data_dir,
        }))
    }
}

async fn open_page(browser: &Browser, profile: &RenderProfile) -> Result<Page, RenderError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| RenderError::Launch(e.to_string()))?;

    let viewport = profile.viewport;
    let metrics = SetDeviceMetricsOverrideParams::new(
        viewport.width as i64,
        viewport.height as i64,
        1.0,
        viewport.is_mobile(),
    );
    page.execute(metrics)
        .await
        .map_err(|e| RenderError::Launch(e.to_string()))?;

    Ok(page)
}

async fn shutdown(browser: &mut Browser, handler: JoinHandle<()>, user_data_dir: &Path) {
    match tokio::time::timeout(SHUTDOWN_STEP, browser.close()).await {
        Ok(Err(e)) => debug!(error = %e, "browser close failed"),
        Err(_) => debug!("browser close timed out"),
        Ok(Ok(_)) => {}
    }
    if tokio::time::timeout(SHUTDOWN_STEP, browser.wait()).await.is_err() {
        warn!("browser did not exit; killing it");
        if let Some(Err(e)) = browser.kill().await {
            warn!(error = %e, "failed to kill browser");
        }
    }
    handler.abort();
    if let Err(e) = tokio::fs::remove_dir_all(user_data_dir).await {
        debug!(error = %e, dir = %user_data_dir.display(), "profile dir cleanup failed");
    }
}

/// A single headless Chromium with one page.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    user_agent: &'static str,
    user_data_dir: PathBuf,
}

impl ChromiumSession {
    async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T, RenderError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| RenderError::Script(e.to_string()))?
            .into_value()
            .map_err(|e| RenderError::Script(format!("{e:?}")))
    }

    /// Poll until no new resources load between two checks.
    async fn wait_for_network_quiet(&self) {
        let mut last = None;
        for _ in 0..QUIET_MAX_POLLS {
            tokio::time::sleep(QUIET_POLL).await;
            let count: Option<u64> = self.eval(RESOURCE_COUNT_JS).await.ok();
            if count.is_some() && count == last {
                return;
            }
            last = count;
        }
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn prepare(&mut self) -> Result<(), RenderError> {
        self.page
            .enable_stealth_mode_with_agent(self.user_agent)
            .await
            .map_err(|e| RenderError::Script(e.to_string()))
    }

    async fn navigate(&mut self, url: &str) -> Result<Option<u16>, RenderError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;
        if let Err(e) = self.page.wait_for_navigation().await {
            debug!(error = %e, "wait_for_navigation failed");
        }
        self.wait_for_network_quiet().await;

        let status: Option<u16> = self.eval(NAV_STATUS_JS).await.unwrap_or(None);
        Ok(status.filter(|s| *s > 0))
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        self.eval(OUTER_HTML_JS).await
    }

    async fn close(self: Box<Self>) {
        let ChromiumSession {
            mut browser,
            page,
            handler,
            user_data_dir,
            ..
        } = *self;
        match tokio::time::timeout(SHUTDOWN_STEP, page.close()).await {
            Ok(Err(e)) => debug!(error = %e, "page close failed"),
            Err(_) => debug!("page close timed out"),
            Ok(Ok(())) => {}
        }
        shutdown(&mut browser, handler, &user_data_dir).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::profile::VIEWPORTS;

    #[tokio::test]
    async fn test_missing_executable_is_unavailable() {
        let launcher = ChromiumLauncher { executable: None };
        let profile = RenderProfile {
            user_agent: "test-agent",
            viewport: VIEWPORTS[0],
        };
        match launcher.launch(&profile).await {
            Err(e) => assert!(!e.is_retryable()),
            Ok(_) => panic!("launch should fail without an executable"),
        }
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_renders_data_url() {
        let launcher = ChromiumLauncher::new(None);
        let mut session = launcher
            .launch(&RenderProfile::random())
            .await
            .expect("failed to launch chromium");

        session.prepare().await.expect("stealth failed");
        session
            .navigate("data:text/html,<h1>Hello</h1><p id=x></p><script>document.getElementById('x').textContent='World'</script>")
            .await
            .expect("navigation failed");
        let html = session.content().await.expect("content failed");
        session.close().await;

        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("World"));
    }
}
