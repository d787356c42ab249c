//! Fixture runtime: acquires a fixture tree and releases it in reverse.
//!
//! Phase order for a tree:
//! - acquire: pre-order walk. A node's own `initialize` runs, then each
//!   declared child subtree in declared order. A node turns `Active` only
//!   once its whole subtree is ready.
//! - release: every acquired node is popped off the acquisition stack and
//!   disposed, so release order is the exact inverse of acquisition.
//!
//! If any `initialize` fails, times out, or is cancelled, the nodes acquired
//! so far are released before the error is returned. Release never stops at
//! the first failure; every acquired node is disposed exactly once.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::RuntimeConfig;
use crate::contracts::{Fixture, FixtureCtx};
use crate::error::{FixtureError, LifecycleStep};
use crate::lifecycle::LifecycleState;
use crate::scope::FixtureScope;

/// A node that finished its own `initialize` and must be disposed.
pub(crate) struct Acquired {
    pub(crate) node: Arc<dyn Fixture>,
    pub(crate) ctx: FixtureCtx,
}

/// Drives fixture trees through acquisition and release.
///
/// Cloning is cheap; clones share the cancellation token.
#[derive(Debug, Clone, Default)]
pub struct FixtureRuntime {
    config: RuntimeConfig,
    cancel: CancellationToken,
}

enum ScopeOutcome<R> {
    Finished(anyhow::Result<R>),
    Cancelled,
    Panicked(Box<dyn std::any::Any + Send>),
}

impl FixtureRuntime {
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned token; cancelling it cancels every tree this runtime acquires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Acquire `root` and its whole subtree.
    ///
    /// # Errors
    /// - `LifecycleViolation` if the root was already acquired once
    /// - `AlreadyAttached` if the root belongs to another tree, or a node appears twice
    /// - `Initialize`, `Timeout` or `Cancelled` if the first node fails
    /// - `PartialInitialization` if a node fails after others were acquired;
    ///   those have been released by the time the error is returned
    pub async fn acquire<T: Fixture>(&self, root: Arc<T>) -> Result<FixtureScope<T>, FixtureError> {
        let lifecycle = root.lifecycle().clone();
        if lifecycle.parent().is_some() {
            return Err(FixtureError::AlreadyAttached {
                fixture: lifecycle.path(),
            });
        }

        tracing::info!(fixture = lifecycle.name(), "Phase: acquire");

        let mut acquired = Vec::new();
        let mut visited = HashSet::new();
        let node: Arc<dyn Fixture> = root.clone();

        let outcome = self
            .acquire_node(node, &self.cancel, &mut acquired, &mut visited)
            .await;

        match outcome {
            Ok(()) => {
                tracing::info!(
                    fixture = lifecycle.name(),
                    fixtures = acquired.len(),
                    "Fixture tree active"
                );
                Ok(FixtureScope::new(
                    root,
                    acquired,
                    self.config.dispose_timeout(),
                ))
            }
            Err(failure) if acquired.is_empty() => Err(failure),
            Err(failure) => {
                let released = acquired.len();
                tracing::warn!(
                    fixture = lifecycle.name(),
                    error = %failure,
                    released,
                    "Acquisition failed, releasing acquired fixtures"
                );
                let cleanup = release(acquired, self.config.dispose_timeout()).await;
                Err(FixtureError::PartialInitialization {
                    failure: Box::new(failure),
                    released,
                    cleanup,
                })
            }
        }
    }

    fn acquire_node<'a>(
        &'a self,
        node: Arc<dyn Fixture>,
        parent_cancel: &'a CancellationToken,
        acquired: &'a mut Vec<Acquired>,
        visited: &'a mut HashSet<usize>,
    ) -> BoxFuture<'a, Result<(), FixtureError>> {
        async move {
            let lifecycle = node.lifecycle().clone();
            if !visited.insert(lifecycle.key()) {
                return Err(FixtureError::AlreadyAttached {
                    fixture: lifecycle.path(),
                });
            }
            lifecycle.transition(
                LifecycleState::Created,
                LifecycleState::Initializing,
                "initialize",
            )?;

            let path = lifecycle.path();
            let ctx = FixtureCtx::new(path.clone(), parent_cancel.child_token());

            tracing::debug!(fixture = %path, "Initializing fixture");
            let init = node.initialize(&ctx);
            if let Err(err) =
                run_step(LifecycleStep::Initialize, &ctx, self.config.init_timeout(), init).await
            {
                lifecycle.set(LifecycleState::Failed);
                tracing::warn!(fixture = %path, error = %err, "Fixture failed to initialize");
                return Err(err);
            }
            acquired.push(Acquired {
                node: Arc::clone(&node),
                ctx: ctx.clone(),
            });

            for child in node.children() {
                let child_lifecycle = child.lifecycle();
                if visited.contains(&child_lifecycle.key()) {
                    return Err(FixtureError::AlreadyAttached {
                        fixture: format!("{path}/{}", child_lifecycle.name()),
                    });
                }
                child_lifecycle.attach(&lifecycle)?;
                self.acquire_node(child, ctx.cancellation_token(), acquired, visited)
                    .await?;
            }

            lifecycle.set(LifecycleState::Active);
            tracing::debug!(fixture = %path, "Fixture active");
            Ok(())
        }
        .boxed()
    }

    /// Acquire `root`, run `body` against it, then release the tree.
    ///
    /// Release runs when the body returns, fails, or panics, and when the
    /// runtime's cancellation token fires while the body is running. A panic
    /// is resumed after release.
    ///
    /// # Errors
    /// Returns acquisition errors, the body's error, `Cancelled`, or the
    /// release error. A body error that is followed by a release failure
    /// carries the release failure as context.
    pub async fn run_scoped<T, R, F, Fut>(&self, root: Arc<T>, body: F) -> anyhow::Result<R>
    where
        T: Fixture,
        F: FnOnce(Arc<T>) -> Fut,
        Fut: Future<Output = anyhow::Result<R>>,
    {
        let scope = self.acquire(root).await?;
        let fixture = Arc::clone(scope.fixture());
        let path = scope.lifecycle().path();

        let outcome = tokio::select! {
            biased;
            () = self.cancel.cancelled() => ScopeOutcome::Cancelled,
            res = AssertUnwindSafe(body(fixture)).catch_unwind() => match res {
                Ok(result) => ScopeOutcome::Finished(result),
                Err(payload) => ScopeOutcome::Panicked(payload),
            },
        };

        let released = scope.dispose().await;

        match outcome {
            ScopeOutcome::Finished(Ok(value)) => {
                released?;
                Ok(value)
            }
            ScopeOutcome::Finished(Err(err)) => match released {
                Ok(()) => Err(err),
                Err(release_err) => {
                    Err(err.context(format!("fixtures also failed to release: {release_err}")))
                }
            },
            ScopeOutcome::Cancelled => {
                tracing::info!(fixture = %path, "Scope cancelled, fixtures released");
                released?;
                Err(FixtureError::Cancelled { fixture: path }.into())
            }
            ScopeOutcome::Panicked(payload) => {
                if let Err(err) = released {
                    tracing::error!(fixture = %path, error = %err, "Release after panic failed");
                }
                std::panic::resume_unwind(payload)
            }
        }
    }
}

/// Run one lifecycle step under the step deadline.
///
/// `initialize` also races the node's cancellation token. `dispose` ignores
/// cancellation so release always gets a chance to run.
async fn run_step<F>(
    step: LifecycleStep,
    ctx: &FixtureCtx,
    limit: Duration,
    fut: F,
) -> Result<(), FixtureError>
where
    F: Future<Output = anyhow::Result<()>>,
{
    let guarded = async {
        match step {
            LifecycleStep::Initialize => tokio::select! {
                biased;
                () = ctx.cancellation_token().cancelled() => Err(FixtureError::Cancelled {
                    fixture: ctx.path().to_owned(),
                }),
                res = fut => res.map_err(|source| {
                    FixtureError::step_failed(step, ctx.path().to_owned(), source)
                }),
            },
            LifecycleStep::Dispose => fut
                .await
                .map_err(|source| FixtureError::step_failed(step, ctx.path().to_owned(), source)),
        }
    };

    tokio::time::timeout(limit, guarded)
        .await
        .unwrap_or_else(|_elapsed| {
            Err(FixtureError::Timeout {
                fixture: ctx.path().to_owned(),
                step,
                limit,
            })
        })
}

pub(crate) fn mark_disposing(entries: &[Acquired]) {
    for entry in entries {
        entry.node.lifecycle().set(LifecycleState::Disposing);
    }
}

/// Dispose `entries` last-acquired first. Returns every failure.
pub(crate) async fn release(entries: Vec<Acquired>, dispose_timeout: Duration) -> Vec<FixtureError> {
    mark_disposing(&entries);

    let mut failures = Vec::new();
    for entry in entries.into_iter().rev() {
        let dispose = entry.node.dispose(&entry.ctx);
        match run_step(LifecycleStep::Dispose, &entry.ctx, dispose_timeout, dispose).await {
            Ok(()) => tracing::debug!(fixture = entry.ctx.path(), "Disposed fixture"),
            Err(err) => {
                tracing::warn!(fixture = entry.ctx.path(), error = %err, "Failed to dispose fixture");
                failures.push(err);
            }
        }
        entry.node.lifecycle().set(LifecycleState::Disposed);
    }
    failures
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::lifecycle::Lifecycle;
    use async_trait::async_trait;
    use tracing_test::traced_test;

    struct Leaf {
        lifecycle: Lifecycle,
        fail: bool,
    }

    impl Leaf {
        fn new(name: &str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                lifecycle: Lifecycle::new(name),
                fail,
            })
        }
    }

    #[async_trait]
    impl Fixture for Leaf {
        fn lifecycle(&self) -> &Lifecycle {
            &self.lifecycle
        }

        async fn initialize(&self, _ctx: &FixtureCtx) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(())
        }

        async fn dispose(&self, _ctx: &FixtureCtx) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn acquire_and_dispose_log_phases() {
        let rt = FixtureRuntime::default();
        let scope = rt.acquire(Leaf::new("leaf", false)).await.unwrap();
        scope.dispose().await.unwrap();

        assert!(logs_contain("Phase: acquire"));
        assert!(logs_contain("Fixture tree active"));
        assert!(logs_contain("Phase: dispose"));
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_initialize_is_logged() {
        let rt = FixtureRuntime::default();
        let leaf = Leaf::new("leaf", true);

        let err = rt.acquire(leaf.clone()).await.err().unwrap();

        assert!(matches!(err, FixtureError::Initialize { .. }));
        assert_eq!(leaf.lifecycle().state(), LifecycleState::Failed);
        assert!(logs_contain("Fixture failed to initialize"));
    }

    #[tokio::test]
    async fn release_of_nothing_reports_nothing() {
        let failures = release(Vec::new(), Duration::from_millis(10)).await;
        assert!(failures.is_empty());
    }

    #[tokio::test]
    async fn dispose_step_times_out() {
        let ctx = FixtureCtx::new("slow".to_owned(), CancellationToken::new());
        let err = run_step(
            LifecycleStep::Dispose,
            &ctx,
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            FixtureError::Timeout { step: LifecycleStep::Dispose, .. }
        ));
    }

    #[tokio::test]
    async fn dispose_step_ignores_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ctx = FixtureCtx::new("cancelled".to_owned(), cancel);

        run_step(LifecycleStep::Dispose, &ctx, Duration::from_secs(1), async { Ok(()) })
            .await
            .unwrap();
    }
}
