#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use bank_testbed::{
    BrowserDriver, BrowserEvent, RecordingBrowser, perform_search_scenario, run_search_scenario,
    wire_frontend_testbed, wire_frontend_testbed_with,
};
use fixturekit::{
    ConfigError, ConfigProvider, EmptyConfigProvider, Fixture, FixtureError, FixtureRuntime,
    LifecycleState,
};
use serde_json::json;
use std::sync::Arc;

struct JsonProvider(serde_json::Value);

impl ConfigProvider for JsonProvider {
    fn fixture_section(&self, fixture: &str) -> Option<&serde_json::Value> {
        self.0.get(fixture)
    }
}

fn wired() -> (Arc<bank_testbed::FrontendContext>, Arc<RecordingBrowser>) {
    let browser = Arc::new(RecordingBrowser::new());
    let frontend = wire_frontend_testbed_with(&EmptyConfigProvider, browser.clone()).unwrap();
    (frontend, browser)
}

#[tokio::test]
async fn tree_is_acquired_top_down_in_declared_order() {
    let (frontend, _browser) = wired();

    let scope = FixtureRuntime::default().acquire(frontend.clone()).await.unwrap();

    assert_eq!(
        scope.acquired_paths(),
        vec![
            "frontend",
            "frontend/bank_api",
            "frontend/bank_api/database",
            "frontend/bank_api/webhooks",
        ]
    );
    assert!(frontend.bank_api().webhooks().lifecycle().is_active());
    scope.dispose().await.unwrap();
}

#[tokio::test]
async fn search_scenario_drives_every_layer_and_releases_the_tree() {
    let (frontend, browser) = wired();

    let report = run_search_scenario(&FixtureRuntime::default(), frontend.clone(), "test query")
        .await
        .unwrap();

    assert_eq!(report.user.age(), 24);
    assert_eq!(report.query, "test query");
    assert_eq!(report.search_page_url, "http://localhost:4200/search");
    assert_eq!(report.webhook_deliveries, 1);

    assert_eq!(
        browser.events(),
        vec![
            BrowserEvent::Launched,
            BrowserEvent::Navigated {
                url: "http://localhost:4200/".into()
            },
            BrowserEvent::Navigated {
                url: "http://localhost:4200/search".into()
            },
            BrowserEvent::Submitted {
                selector: "input[name=\"q\"]".into(),
                text: "test query".into()
            },
            BrowserEvent::Closed,
        ]
    );

    let bank_api = frontend.bank_api();
    for lifecycle in [
        frontend.lifecycle(),
        bank_api.lifecycle(),
        bank_api.database().lifecycle(),
        bank_api.webhooks().lifecycle(),
    ] {
        assert_eq!(lifecycle.state(), LifecycleState::Disposed);
    }
}

#[tokio::test]
async fn scenario_steps_record_user_session_and_webhook() {
    let (frontend, _browser) = wired();
    let scope = FixtureRuntime::default().acquire(frontend.clone()).await.unwrap();

    let report = perform_search_scenario(&frontend, "savings").await.unwrap();

    let bank_api = frontend.bank_api();
    assert_eq!(bank_api.authenticated_user().unwrap(), Some(report.user.clone()));
    assert_eq!(bank_api.database().users().unwrap(), vec![report.user.clone()]);
    let deliveries = bank_api.webhooks().deliveries().unwrap();
    assert_eq!(deliveries[0].event, "user.authenticated");
    assert_eq!(deliveries[0].payload["name"], json!(report.user.name()));

    scope.dispose().await.unwrap();
}

#[tokio::test]
async fn navigation_before_acquire_is_a_lifecycle_violation() {
    let (frontend, browser) = wired();

    let err = frontend.navigate_to_search_page().await.unwrap_err();

    assert!(err.is_lifecycle_violation());
    assert!(browser.events().is_empty());
}

#[tokio::test]
async fn page_context_stops_working_after_release() {
    let (frontend, browser) = wired();
    let scope = FixtureRuntime::default().acquire(frontend.clone()).await.unwrap();
    let page = frontend.navigate_to_search_page().await.unwrap();

    scope.dispose().await.unwrap();
    let err = page.perform_search("too late").await.unwrap_err();

    assert!(err.is_lifecycle_violation());
    assert!(
        !browser
            .events()
            .iter()
            .any(|e| matches!(e, BrowserEvent::Submitted { .. }))
    );
}

#[tokio::test]
async fn inactive_ancestor_blocks_child_operations() {
    let (frontend, _browser) = wired();
    let user = bank_testbed::UserBuilder::new().with_name("Alice").create().await.unwrap();

    // bank_api alone is not the root of an acquired tree yet
    let err = frontend
        .bank_api()
        .mock_authentication_for_user(&user)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FixtureError::LifecycleViolation { state: LifecycleState::Created, .. }
    ));
}

#[tokio::test]
async fn webhook_failure_releases_the_acquired_layers() {
    let browser = Arc::new(RecordingBrowser::new());
    let provider = JsonProvider(json!({
        "webhooks": { "config": { "endpoint": "mailto:ops@example.com" } }
    }));
    let frontend = wire_frontend_testbed_with(&provider, browser.clone()).unwrap();

    let err = FixtureRuntime::default()
        .acquire(frontend.clone())
        .await
        .err()
        .unwrap();

    let FixtureError::PartialInitialization {
        released, cleanup, ..
    } = &err
    else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(*released, 3);
    assert!(cleanup.is_empty());
    assert_eq!(
        err.root_failure().fixture(),
        Some("frontend/bank_api/webhooks")
    );

    let bank_api = frontend.bank_api();
    assert_eq!(bank_api.webhooks().lifecycle().state(), LifecycleState::Failed);
    assert_eq!(bank_api.database().lifecycle().state(), LifecycleState::Disposed);
    assert_eq!(frontend.lifecycle().state(), LifecycleState::Disposed);
    assert_eq!(browser.events().last(), Some(&BrowserEvent::Closed));
}

struct BrokenBrowser;

#[async_trait]
impl BrowserDriver for BrokenBrowser {
    async fn launch(&self) -> anyhow::Result<()> {
        anyhow::bail!("no display available")
    }

    async fn goto(&self, _url: &str) -> anyhow::Result<()> {
        unreachable!("never launched")
    }

    async fn fill_and_submit(&self, _selector: &str, _text: &str) -> anyhow::Result<()> {
        unreachable!("never launched")
    }

    async fn close(&self) -> anyhow::Result<()> {
        unreachable!("never launched")
    }
}

#[tokio::test]
async fn browser_launch_failure_leaves_nothing_acquired() {
    let frontend = wire_frontend_testbed_with(&EmptyConfigProvider, Arc::new(BrokenBrowser)).unwrap();

    let err = FixtureRuntime::default()
        .acquire(frontend.clone())
        .await
        .err()
        .unwrap();

    assert!(matches!(err, FixtureError::Initialize { ref fixture, .. } if fixture == "frontend"));
    assert_eq!(
        frontend.bank_api().lifecycle().state(),
        LifecycleState::Created
    );
}

#[test]
fn frontend_section_is_read_from_config() {
    let provider = JsonProvider(json!({
        "frontend": { "config": { "base_url": "https://bank.test" } }
    }));

    let frontend = wire_frontend_testbed(&provider).unwrap();

    assert_eq!(frontend.config().search_page_url(), "https://bank.test/search");
}

#[test]
fn malformed_section_is_a_config_error() {
    let provider = JsonProvider(json!({
        "frontend": { "config": { "base_url": 42 } }
    }));

    let err = wire_frontend_testbed(&provider).err().unwrap();

    assert!(matches!(err, ConfigError::InvalidSection { ref fixture, .. } if fixture == "frontend"));
}

#[test]
fn misspelled_webhooks_section_is_a_config_error() {
    let provider = JsonProvider(json!({
        "webhooks": { "confg": { "endpoint": "http://localhost:9000/hooks" } }
    }));

    let err = wire_frontend_testbed(&provider).err().unwrap();

    assert!(matches!(err, ConfigError::Malformed { ref fixture, .. } if fixture == "webhooks"));
}
