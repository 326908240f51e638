//! In-memory browser for exercising the render pipeline without Chromium.

use super::{BrowserLauncher, RenderProfile, RenderSession};
use crate::error::RenderError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted behavior for one session, consumed in launch order.
#[derive(Debug, Clone)]
pub enum Step {
    Html(String),
    Status(u16),
    Fail,
    PrepareFail,
    /// Navigation never finishes.
    Hang,
    /// Reading the page never finishes.
    ContentHang,
    /// Closing never finishes (after counting the close).
    CloseHang,
    Unavailable,
}

#[derive(Debug, Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub prepared: AtomicUsize,
    pub closes: AtomicUsize,
    pub active: AtomicUsize,
    pub peak: AtomicUsize,
}

#[derive(Debug)]
pub struct FakeLauncher {
    steps: Mutex<VecDeque<Step>>,
    default: Step,
    delay: Duration,
    counters: Arc<Counters>,
}

impl std::ops::Deref for FakeLauncher {
    type Target = Counters;

    fn deref(&self) -> &Counters {
        &self.counters
    }
}

impl FakeLauncher {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            default: Step::Fail,
            delay: Duration::ZERO,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Behavior once the scripted steps run out.
    pub fn with_default(mut self, step: Step) -> Self {
        self.default = step;
        self
    }

    /// Time each navigation takes.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn next_step(&self) -> Step {
        self.steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone())
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, _profile: &RenderProfile) -> Result<Box<dyn RenderSession>, RenderError> {
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        let step = self.next_step();
        if matches!(step, Step::Unavailable) {
            return Err(RenderError::Unavailable("no browser".into()));
        }

        let active = self.counters.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(active, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            step,
            delay: self.delay,
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct FakeSession {
    step: Step,
    delay: Duration,
    counters: Arc<Counters>,
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn prepare(&mut self) -> Result<(), RenderError> {
        self.counters.prepared.fetch_add(1, Ordering::SeqCst);
        match self.step {
            Step::PrepareFail => Err(RenderError::Script("stealth failed".into())),
            _ => Ok(()),
        }
    }

    async fn navigate(&mut self, _url: &str) -> Result<Option<u16>, RenderError> {
        tokio::time::sleep(self.delay).await;
        match &self.step {
            Step::Status(status) => Ok(Some(*status)),
            Step::Fail => Err(RenderError::Navigation("net::ERR_CONNECTION_RESET".into())),
            Step::Hang => std::future::pending().await,
            _ => Ok(Some(200)),
        }
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        match &self.step {
            Step::Html(html) => Ok(html.clone()),
            Step::ContentHang => std::future::pending().await,
            _ => Ok(String::new()),
        }
    }

    async fn close(self: Box<Self>) {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        self.counters.active.fetch_sub(1, Ordering::SeqCst);
        if matches!(self.step, Step::CloseHang) {
            std::future::pending::<()>().await;
        }
    }
}
