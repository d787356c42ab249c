//! Fluent user builder with composable finalization hooks.
//!
//! `create()` runs every hook's `before_create` in registration order, then
//! base validation, then every hook's `after_create` in registration order.
//! The first failing step aborts the build.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use super::{BuildError, HookStage, User, UserDraft};

/// Extension point for [`UserBuilder::create`].
#[async_trait]
pub trait CreateHook: Send + Sync {
    fn name(&self) -> &'static str;

    /// Runs before validation, against the unvalidated draft.
    async fn before_create(&self, _draft: &UserDraft) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the user has been constructed.
    async fn after_create(&self, _user: &User) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct UserBuilder {
    draft: UserDraft,
    hooks: Vec<Arc<dyn CreateHook>>,
}

impl UserBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded with a unique random name and age 30.
    #[must_use]
    pub fn for_tests() -> Self {
        Self::new()
            .with_name(uuid::Uuid::new_v4().to_string())
            .with_age(30)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.draft.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_age(mut self, age: i32) -> Self {
        self.draft.age = age;
        self
    }

    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn CreateHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    #[must_use]
    pub fn draft(&self) -> &UserDraft {
        &self.draft
    }

    /// Validate the draft and build a [`User`], running hooks around it.
    ///
    /// Every call re-validates and re-builds.
    ///
    /// # Errors
    /// `BuildError::Validation` if the name is unset or empty,
    /// `BuildError::Hook` if a hook fails.
    pub async fn create(&self) -> Result<User, BuildError> {
        for hook in &self.hooks {
            hook.before_create(&self.draft)
                .await
                .map_err(|source| BuildError::Hook {
                    hook: hook.name(),
                    stage: HookStage::BeforeCreate,
                    source,
                })?;
        }

        let user = self.draft.validate()?;

        for hook in &self.hooks {
            hook.after_create(&user)
                .await
                .map_err(|source| BuildError::Hook {
                    hook: hook.name(),
                    stage: HookStage::AfterCreate,
                    source,
                })?;
        }

        tracing::debug!(user = user.name(), age = user.age(), "User created");
        Ok(user)
    }
}

impl fmt::Debug for UserBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks: Vec<&str> = self.hooks.iter().map(|h| h.name()).collect();
        f.debug_struct("UserBuilder")
            .field("draft", &self.draft)
            .field("hooks", &hooks)
            .finish()
    }
}
