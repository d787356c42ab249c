//! In-process browser placeholder.
//!
//! [`BrowserDriver`] is the seam a real browser automation backend would
//! plug into. [`RecordingBrowser`] only records what it was asked to do.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn launch(&self) -> anyhow::Result<()>;
    async fn goto(&self, url: &str) -> anyhow::Result<()>;
    async fn fill_and_submit(&self, selector: &str, text: &str) -> anyhow::Result<()>;
    async fn close(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BrowserEvent {
    Launched,
    Navigated { url: String },
    Submitted { selector: String, text: String },
    Closed,
}

#[derive(Debug, Default)]
pub struct RecordingBrowser {
    events: Mutex<Vec<BrowserEvent>>,
    open: AtomicBool,
}

impl RecordingBrowser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<BrowserEvent> {
        self.events.lock().clone()
    }

    /// URL of the last navigation, if any.
    #[must_use]
    pub fn current_url(&self) -> Option<String> {
        self.events.lock().iter().rev().find_map(|e| match e {
            BrowserEvent::Navigated { url } => Some(url.clone()),
            _ => None,
        })
    }

    fn record(&self, event: BrowserEvent) {
        tracing::trace!(?event, "Browser event");
        self.events.lock().push(event);
    }

    fn ensure_open(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.open.load(Ordering::SeqCst), "browser is not running");
        Ok(())
    }
}

#[async_trait]
impl BrowserDriver for RecordingBrowser {
    async fn launch(&self) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        anyhow::ensure!(
            !self.open.swap(true, Ordering::SeqCst),
            "browser already running"
        );
        self.record(BrowserEvent::Launched);
        Ok(())
    }

    async fn goto(&self, url: &str) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        self.ensure_open()?;
        self.record(BrowserEvent::Navigated {
            url: url.to_owned(),
        });
        Ok(())
    }

    async fn fill_and_submit(&self, selector: &str, text: &str) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        self.ensure_open()?;
        self.record(BrowserEvent::Submitted {
            selector: selector.to_owned(),
            text: text.to_owned(),
        });
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        self.open.store(false, Ordering::SeqCst);
        self.record(BrowserEvent::Closed);
        Ok(())
    }
}
