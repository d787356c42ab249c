//! Page-scoped contexts handed out by [`super::FrontendContext`].
//!
//! Pages borrow the frontend's lifecycle, so they stop working once the
//! frontend is released.

use fixturekit::Lifecycle;
use std::sync::Arc;

use crate::browser::BrowserDriver;
use crate::error::TestbedError;

const SEARCH_INPUT: &str = "input[name=\"q\"]";

#[derive(Debug, Clone)]
pub struct FrontPage {
    url: String,
}

impl FrontPage {
    pub(crate) fn new(url: String) -> Self {
        Self { url }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

pub struct SearchPage {
    lifecycle: Lifecycle,
    browser: Arc<dyn BrowserDriver>,
    url: String,
}

impl SearchPage {
    pub(crate) fn new(lifecycle: Lifecycle, browser: Arc<dyn BrowserDriver>, url: String) -> Self {
        Self {
            lifecycle,
            browser,
            url,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Type `query` into the search field and submit it.
    ///
    /// # Errors
    /// `LifecycleViolation` once the owning frontend is no longer active,
    /// `Browser` if the browser rejects the input.
    pub async fn perform_search(&self, query: &str) -> Result<(), TestbedError> {
        self.lifecycle.ensure_active("perform search")?;
        self.browser
            .fill_and_submit(SEARCH_INPUT, query)
            .await
            .map_err(TestbedError::browser("submit search"))?;
        tracing::info!(query, page = %self.url, "Search submitted");
        Ok(())
    }
}

impl std::fmt::Debug for SearchPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPage")
            .field("fixture", &self.lifecycle.path())
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
