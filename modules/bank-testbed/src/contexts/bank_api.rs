//! Bank API layer: owns the database and the webhook receiver.

use async_trait::async_trait;
use fixturekit::{Fixture, FixtureCtx, FixtureError, Lifecycle};
use parking_lot::Mutex;
use std::sync::Arc;

use super::{DatabaseContext, WebhookContext};
use crate::users::User;

/// A mocked logged-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub struct BankApiContext {
    lifecycle: Lifecycle,
    database: Arc<DatabaseContext>,
    webhooks: Arc<WebhookContext>,
    sessions: Mutex<Vec<Session>>,
}

impl BankApiContext {
    pub const NAME: &'static str = "bank_api";

    #[must_use]
    pub fn new(database: Arc<DatabaseContext>, webhooks: Arc<WebhookContext>) -> Self {
        Self {
            lifecycle: Lifecycle::new(Self::NAME),
            database,
            webhooks,
            sessions: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn database(&self) -> &Arc<DatabaseContext> {
        &self.database
    }

    #[must_use]
    pub fn webhooks(&self) -> &Arc<WebhookContext> {
        &self.webhooks
    }

    /// Make the API treat `user` as logged in.
    ///
    /// Publishes a `user.authenticated` webhook.
    ///
    /// # Errors
    /// `LifecycleViolation` unless the API and its ancestors are active.
    pub async fn mock_authentication_for_user(&self, user: &User) -> Result<(), FixtureError> {
        self.lifecycle.ensure_active("mock authentication")?;
        tokio::task::yield_now().await;

        let session = Session {
            user: user.clone(),
            token: uuid::Uuid::new_v4().simple().to_string(),
        };
        tracing::info!(user = user.name(), "Mocked authentication");
        self.sessions.lock().push(session);

        self.webhooks
            .publish(
                "user.authenticated",
                serde_json::json!({ "name": user.name(), "age": user.age() }),
            )
            .await
    }

    /// The most recently authenticated user.
    ///
    /// # Errors
    /// `LifecycleViolation` unless the API and its ancestors are active.
    pub fn authenticated_user(&self) -> Result<Option<User>, FixtureError> {
        self.lifecycle.ensure_active("read session")?;
        Ok(self.sessions.lock().last().map(|s| s.user.clone()))
    }

    /// # Errors
    /// `LifecycleViolation` unless the API and its ancestors are active.
    pub fn sessions(&self) -> Result<Vec<Session>, FixtureError> {
        self.lifecycle.ensure_active("list sessions")?;
        Ok(self.sessions.lock().clone())
    }
}

#[async_trait]
impl Fixture for BankApiContext {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn children(&self) -> Vec<Arc<dyn Fixture>> {
        let database: Arc<dyn Fixture> = self.database.clone();
        let webhooks: Arc<dyn Fixture> = self.webhooks.clone();
        vec![database, webhooks]
    }

    async fn initialize(&self, ctx: &FixtureCtx) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        tracing::debug!(fixture = ctx.path(), "Bank API mock started");
        Ok(())
    }

    async fn dispose(&self, ctx: &FixtureCtx) -> anyhow::Result<()> {
        let sessions = std::mem::take(&mut *self.sessions.lock());
        tokio::task::yield_now().await;
        tracing::debug!(
            fixture = ctx.path(),
            sessions = sessions.len(),
            "Bank API mock stopped"
        );
        Ok(())
    }
}
