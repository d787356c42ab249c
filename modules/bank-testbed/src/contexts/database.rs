//! In-memory storage layer.

use async_trait::async_trait;
use fixturekit::{Fixture, FixtureCtx, FixtureError, Lifecycle};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::users::{BuildError, CreateHook, User, UserBuilder, UserDraft};

/// Record that a user's email activation link was followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailActivation {
    pub user: String,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    email_activations: Vec<EmailActivation>,
}

pub struct DatabaseContext {
    lifecycle: Lifecycle,
    tables: Arc<Mutex<Tables>>,
}

impl DatabaseContext {
    pub const NAME: &'static str = "database";

    #[must_use]
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::new(Self::NAME),
            tables: Arc::default(),
        }
    }

    /// Test-data builder whose `create()` persists into this database.
    #[must_use]
    pub fn user_builder(&self) -> TestUserBuilder {
        let persist = PersistUser {
            lifecycle: self.lifecycle.clone(),
            tables: Arc::clone(&self.tables),
        };
        TestUserBuilder {
            builder: UserBuilder::for_tests().with_hook(Arc::new(persist)),
            lifecycle: self.lifecycle.clone(),
            tables: Arc::clone(&self.tables),
        }
    }

    /// # Errors
    /// `LifecycleViolation` unless the database and its ancestors are active.
    pub fn users(&self) -> Result<Vec<User>, FixtureError> {
        self.lifecycle.ensure_active("list users")?;
        Ok(self.tables.lock().users.clone())
    }

    /// # Errors
    /// `LifecycleViolation` unless the database and its ancestors are active.
    pub fn find_user(&self, name: &str) -> Result<Option<User>, FixtureError> {
        self.lifecycle.ensure_active("find user")?;
        Ok(self
            .tables
            .lock()
            .users
            .iter()
            .find(|u| u.name() == name)
            .cloned())
    }

    /// # Errors
    /// `LifecycleViolation` unless the database and its ancestors are active.
    pub fn email_activations(&self) -> Result<Vec<EmailActivation>, FixtureError> {
        self.lifecycle.ensure_active("list email activations")?;
        Ok(self.tables.lock().email_activations.clone())
    }
}

impl Default for DatabaseContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fixture for DatabaseContext {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    async fn initialize(&self, ctx: &FixtureCtx) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        tracing::debug!(fixture = ctx.path(), "Database ready");
        Ok(())
    }

    async fn dispose(&self, ctx: &FixtureCtx) -> anyhow::Result<()> {
        let dropped = {
            let mut tables = self.tables.lock();
            let dropped = tables.users.len();
            *tables = Tables::default();
            dropped
        };
        tokio::task::yield_now().await;
        tracing::debug!(fixture = ctx.path(), users = dropped, "Database wiped");
        Ok(())
    }
}

/// Persists created users. Refuses to run unless the database is active.
struct PersistUser {
    lifecycle: Lifecycle,
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl CreateHook for PersistUser {
    fn name(&self) -> &'static str {
        "persist_user"
    }

    async fn before_create(&self, _draft: &UserDraft) -> anyhow::Result<()> {
        self.lifecycle.ensure_active("create user")?;
        Ok(())
    }

    async fn after_create(&self, user: &User) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        self.tables.lock().users.push(user.clone());
        Ok(())
    }
}

/// Simulates the user following the email activation link.
struct ValidateEmail {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl CreateHook for ValidateEmail {
    fn name(&self) -> &'static str {
        "validate_email"
    }

    async fn after_create(&self, user: &User) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        self.tables.lock().email_activations.push(EmailActivation {
            user: user.name().to_owned(),
        });
        Ok(())
    }
}

/// [`UserBuilder`] bound to a [`DatabaseContext`].
///
/// Seeded like [`UserBuilder::for_tests`].
#[derive(Debug, Clone)]
pub struct TestUserBuilder {
    builder: UserBuilder,
    lifecycle: Lifecycle,
    tables: Arc<Mutex<Tables>>,
}

impl TestUserBuilder {
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.builder = self.builder.with_name(name);
        self
    }

    #[must_use]
    pub fn with_age(mut self, age: i32) -> Self {
        self.builder = self.builder.with_age(age);
        self
    }

    /// Also record the user's email as activated when created.
    #[must_use]
    pub fn with_validated_email(mut self) -> Self {
        let hook = ValidateEmail {
            tables: Arc::clone(&self.tables),
        };
        self.builder = self.builder.with_hook(Arc::new(hook));
        self
    }

    /// Build the user and persist it.
    ///
    /// # Errors
    /// `BuildError::Validation` for an empty name. `BuildError::Hook` wrapping
    /// a `LifecycleViolation` if the database is not active.
    pub async fn create(&self) -> Result<User, BuildError> {
        tracing::debug!(fixture = self.lifecycle.name(), "Creating test user");
        self.builder.create().await
    }
}
