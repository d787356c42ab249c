#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

//! Probe fixtures that record every lifecycle call into a shared journal.

use async_trait::async_trait;
use fixturekit::{Fixture, FixtureCtx, FixtureError, Lifecycle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Entries with the given prefix, prefix stripped.
    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .iter()
            .filter_map(|e| e.strip_prefix(prefix).map(str::to_owned))
            .collect()
    }
}

type InitHook = Box<dyn Fn(&Journal) + Send + Sync>;

pub struct Probe {
    lifecycle: Lifecycle,
    journal: Journal,
    children: Vec<Arc<dyn Fixture>>,
    fail_init: bool,
    fail_dispose: bool,
    init_delay: Option<Duration>,
    on_init: Option<InitHook>,
    inits: AtomicUsize,
    disposes: AtomicUsize,
}

impl Probe {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            lifecycle: Lifecycle::new(name),
            journal: journal.clone(),
            children: Vec::new(),
            fail_init: false,
            fail_dispose: false,
            init_delay: None,
            on_init: None,
            inits: AtomicUsize::new(0),
            disposes: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: Arc<dyn Fixture>) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    #[must_use]
    pub fn failing_dispose(mut self) -> Self {
        self.fail_dispose = true;
        self
    }

    #[must_use]
    pub fn slow_init(mut self, delay: Duration) -> Self {
        self.init_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn on_init(mut self, hook: impl Fn(&Journal) + Send + Sync + 'static) -> Self {
        self.on_init = Some(Box::new(hook));
        self
    }

    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn dispose_count(&self) -> usize {
        self.disposes.load(Ordering::SeqCst)
    }

    /// Domain operation valid only while the probe and its ancestors are active.
    pub fn search(&self, query: &str) -> Result<(), FixtureError> {
        self.lifecycle.ensure_active("search")?;
        self.journal
            .push(format!("search:{}:{query}", self.lifecycle.name()));
        Ok(())
    }
}

#[async_trait]
impl Fixture for Probe {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn children(&self) -> Vec<Arc<dyn Fixture>> {
        self.children.clone()
    }

    async fn initialize(&self, ctx: &FixtureCtx) -> anyhow::Result<()> {
        if let Some(delay) = self.init_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(hook) = &self.on_init {
            hook(&self.journal);
        }
        self.inits.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            self.journal.push(format!("init-failed:{}", ctx.path()));
            anyhow::bail!("{} refused to start", self.lifecycle.name());
        }
        self.journal.push(format!("init:{}", ctx.path()));
        Ok(())
    }

    async fn dispose(&self, ctx: &FixtureCtx) -> anyhow::Result<()> {
        self.disposes.fetch_add(1, Ordering::SeqCst);
        self.journal.push(format!("dispose:{}", ctx.path()));
        if self.fail_dispose {
            anyhow::bail!("{} refused to stop", self.lifecycle.name());
        }
        Ok(())
    }
}

/// outer -> middle -> inner, with `customize` applied to inner.
pub fn three_levels(
    journal: &Journal,
    customize: impl FnOnce(Probe) -> Probe,
) -> (Arc<Probe>, Arc<Probe>, Arc<Probe>) {
    let inner = Arc::new(customize(Probe::new("inner", journal)));
    let middle = Arc::new(Probe::new("middle", journal).with_child(inner.clone()));
    let outer = Arc::new(Probe::new("outer", journal).with_child(middle.clone()));
    (outer, middle, inner)
}
