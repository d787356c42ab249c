//! Scoped ownership of an acquired fixture tree.

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use crate::contracts::Fixture;
use crate::error::FixtureError;
use crate::lifecycle::Lifecycle;
use crate::runtime::{Acquired, mark_disposing, release};

/// An acquired fixture tree.
///
/// Call [`FixtureScope::dispose`] to release it and observe release errors.
/// Dropping an undisposed scope marks the tree as disposing immediately and
/// releases it on the current Tokio runtime in the background.
#[must_use = "dropping a fixture scope releases the tree in the background; call `dispose().await`"]
pub struct FixtureScope<T: Fixture> {
    root: Arc<T>,
    pending: Option<Vec<Acquired>>,
    dispose_timeout: Duration,
}

impl<T: Fixture> FixtureScope<T> {
    pub(crate) fn new(root: Arc<T>, acquired: Vec<Acquired>, dispose_timeout: Duration) -> Self {
        Self {
            root,
            pending: Some(acquired),
            dispose_timeout,
        }
    }

    #[must_use]
    pub fn fixture(&self) -> &Arc<T> {
        &self.root
    }

    #[must_use]
    pub fn lifecycle(&self) -> &Lifecycle {
        self.root.lifecycle()
    }

    /// Paths of the acquired nodes, in acquisition order.
    #[must_use]
    pub fn acquired_paths(&self) -> Vec<String> {
        self.pending
            .iter()
            .flatten()
            .map(|entry| entry.ctx.path().to_owned())
            .collect()
    }

    /// Release the tree, last-acquired node first.
    ///
    /// # Errors
    /// Returns `FixtureError::Release` listing every node that failed to
    /// dispose. All other nodes are still released.
    pub async fn dispose(mut self) -> Result<(), FixtureError> {
        let Some(entries) = self.pending.take() else {
            return Ok(());
        };

        tracing::info!(fixture = self.root.lifecycle().name(), "Phase: dispose");
        let failures = release(entries, self.dispose_timeout).await;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(FixtureError::Release { failures })
        }
    }
}

impl<T: Fixture> Deref for FixtureScope<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.root
    }
}

impl<T: Fixture> Drop for FixtureScope<T> {
    fn drop(&mut self) {
        let Some(entries) = self.pending.take() else {
            return;
        };
        let path = self.root.lifecycle().path();
        mark_disposing(&entries);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(
                    fixture = %path,
                    "Fixture scope dropped without dispose, releasing in background"
                );
                let dispose_timeout = self.dispose_timeout;
                handle.spawn(async move {
                    let failures = release(entries, dispose_timeout).await;
                    if !failures.is_empty() {
                        let err = FixtureError::Release { failures };
                        tracing::warn!(fixture = %path, error = %err, "Background release failed");
                    }
                });
            }
            Err(_) => {
                tracing::error!(
                    fixture = %path,
                    fixtures = entries.len(),
                    "Fixture scope dropped outside a Tokio runtime, fixtures were not released"
                );
            }
        }
    }
}
