use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::Lifecycle;

/// Per-node context handed to `initialize` and `dispose`.
#[derive(Debug, Clone)]
pub struct FixtureCtx {
    path: String,
    cancel: CancellationToken,
}

impl FixtureCtx {
    pub(crate) fn new(path: String, cancel: CancellationToken) -> Self {
        Self { path, cancel }
    }

    /// Slash-separated path of the node inside its tree.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Child token of the parent's token; cancelled when the tree is cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// One layer of a test environment.
///
/// The runtime calls `initialize` on a node before acquiring its children,
/// and `dispose` in exactly the inverse order of successful initialization.
/// Implementations only manage their own resource; children are declared via
/// [`Fixture::children`] and handled by the runtime.
#[async_trait]
pub trait Fixture: Send + Sync + 'static {
    fn lifecycle(&self) -> &Lifecycle;

    /// Children in declared (initialization) order.
    fn children(&self) -> Vec<Arc<dyn Fixture>> {
        Vec::new()
    }

    async fn initialize(&self, ctx: &FixtureCtx) -> anyhow::Result<()>;

    async fn dispose(&self, ctx: &FixtureCtx) -> anyhow::Result<()>;
}
