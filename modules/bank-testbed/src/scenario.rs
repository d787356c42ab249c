//! The end-to-end search scenario run against a frontend tree.

use fixturekit::FixtureRuntime;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::contexts::FrontendContext;
use crate::users::User;

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub user: User,
    pub front_page_url: String,
    pub search_page_url: String,
    pub query: String,
    pub webhook_deliveries: usize,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created user: {}, Age: {}", self.user.name(), self.user.age())?;
        writeln!(f, "Front page: {}", self.front_page_url)?;
        writeln!(f, "Search page: {}", self.search_page_url)?;
        writeln!(f, "Searched for: {}", self.query)?;
        write!(f, "Webhook deliveries: {}", self.webhook_deliveries)
    }
}

/// Run the search steps against an already active frontend tree.
///
/// Creates a user aged 24 through the database builder, mocks its login,
/// opens the front page and the search page, and submits `query`.
///
/// # Errors
/// Any build, lifecycle or browser error from the steps.
pub async fn perform_search_scenario(
    frontend: &FrontendContext,
    query: &str,
) -> anyhow::Result<ScenarioReport> {
    let bank_api = frontend.bank_api();

    let user = bank_api
        .database()
        .user_builder()
        .with_age(24)
        .create()
        .await?;
    bank_api.mock_authentication_for_user(&user).await?;

    let front_page = frontend.navigate_to_front_page().await?;
    let search_page = frontend.navigate_to_search_page().await?;
    search_page.perform_search(query).await?;

    Ok(ScenarioReport {
        user,
        front_page_url: front_page.url().to_owned(),
        search_page_url: search_page.url().to_owned(),
        query: query.to_owned(),
        webhook_deliveries: bank_api.webhooks().deliveries()?.len(),
    })
}

/// Acquire `frontend`, run [`perform_search_scenario`] and release the tree.
///
/// # Errors
/// Acquisition, scenario or release errors.
pub async fn run_search_scenario(
    runtime: &FixtureRuntime,
    frontend: Arc<FrontendContext>,
    query: &str,
) -> anyhow::Result<ScenarioReport> {
    runtime
        .run_scoped(frontend, |frontend| async move {
            perform_search_scenario(&frontend, query).await
        })
        .await
}
