//! Assembles the default frontend fixture tree.

use fixturekit::{ConfigError, ConfigProvider, load_fixture_config};
use std::sync::Arc;

use crate::browser::{BrowserDriver, RecordingBrowser};
use crate::config::{FrontendConfig, WebhookConfig};
use crate::contexts::{BankApiContext, DatabaseContext, FrontendContext, WebhookContext};

/// Build `frontend -> bank_api -> {database, webhooks}` from `provider`,
/// using a [`RecordingBrowser`].
///
/// # Errors
/// `ConfigError` if the `frontend` or `webhooks` entry is malformed or its
/// `config` section does not fit the fixture's config type.
pub fn wire_frontend_testbed(
    provider: &dyn ConfigProvider,
) -> Result<Arc<FrontendContext>, ConfigError> {
    wire_frontend_testbed_with(provider, Arc::new(RecordingBrowser::new()))
}

/// Same as [`wire_frontend_testbed`] with a caller-supplied browser driver.
///
/// # Errors
/// See [`wire_frontend_testbed`].
pub fn wire_frontend_testbed_with(
    provider: &dyn ConfigProvider,
    browser: Arc<dyn BrowserDriver>,
) -> Result<Arc<FrontendContext>, ConfigError> {
    let frontend_cfg: FrontendConfig = load_fixture_config(provider, FrontendContext::NAME)?;
    let webhook_cfg: WebhookConfig = load_fixture_config(provider, WebhookContext::NAME)?;

    let database = Arc::new(DatabaseContext::new());
    let webhooks = Arc::new(WebhookContext::new(webhook_cfg));
    let bank_api = Arc::new(BankApiContext::new(database, webhooks));

    Ok(Arc::new(FrontendContext::new(frontend_cfg, bank_api, browser)))
}
