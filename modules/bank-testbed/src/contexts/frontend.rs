//! Frontend layer: the browser session plus the bank API behind it.

use async_trait::async_trait;
use fixturekit::{Fixture, FixtureCtx, Lifecycle};
use std::sync::Arc;

use super::{BankApiContext, FrontPage, SearchPage};
use crate::browser::BrowserDriver;
use crate::config::FrontendConfig;
use crate::error::TestbedError;

pub struct FrontendContext {
    lifecycle: Lifecycle,
    config: FrontendConfig,
    bank_api: Arc<BankApiContext>,
    browser: Arc<dyn BrowserDriver>,
}

impl FrontendContext {
    pub const NAME: &'static str = "frontend";

    #[must_use]
    pub fn new(
        config: FrontendConfig,
        bank_api: Arc<BankApiContext>,
        browser: Arc<dyn BrowserDriver>,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::new(Self::NAME),
            config,
            bank_api,
            browser,
        }
    }

    #[must_use]
    pub fn bank_api(&self) -> &Arc<BankApiContext> {
        &self.bank_api
    }

    #[must_use]
    pub fn config(&self) -> &FrontendConfig {
        &self.config
    }

    /// # Errors
    /// `LifecycleViolation` unless the frontend is active, `Browser` if
    /// navigation fails.
    pub async fn navigate_to_front_page(&self) -> Result<FrontPage, TestbedError> {
        self.lifecycle.ensure_active("navigate to front page")?;
        let url = self.config.front_page_url();
        self.browser
            .goto(&url)
            .await
            .map_err(TestbedError::browser("open front page"))?;
        tracing::debug!(%url, "Front page opened");
        Ok(FrontPage::new(url))
    }

    /// # Errors
    /// `LifecycleViolation` unless the frontend is active, `Browser` if
    /// navigation fails.
    pub async fn navigate_to_search_page(&self) -> Result<SearchPage, TestbedError> {
        self.lifecycle.ensure_active("navigate to search page")?;
        let url = self.config.search_page_url();
        self.browser
            .goto(&url)
            .await
            .map_err(TestbedError::browser("open search page"))?;
        tracing::debug!(%url, "Search page opened");
        Ok(SearchPage::new(
            self.lifecycle.clone(),
            Arc::clone(&self.browser),
            url,
        ))
    }
}

#[async_trait]
impl Fixture for FrontendContext {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn children(&self) -> Vec<Arc<dyn Fixture>> {
        let bank_api: Arc<dyn Fixture> = self.bank_api.clone();
        vec![bank_api]
    }

    async fn initialize(&self, ctx: &FixtureCtx) -> anyhow::Result<()> {
        self.browser.launch().await?;
        tracing::debug!(fixture = ctx.path(), base_url = %self.config.base_url, "Browser launched");
        Ok(())
    }

    async fn dispose(&self, ctx: &FixtureCtx) -> anyhow::Result<()> {
        self.browser.close().await?;
        tracing::debug!(fixture = ctx.path(), "Browser closed");
        Ok(())
    }
}
