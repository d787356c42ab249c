//! Bank testbed: a user builder and a layered fixture tree for
//! frontend-to-database integration tests.
//!
//! All external systems (browser, bank API, database, webhook receiver) are
//! in-process recorders.

#![forbid(unsafe_code)]

pub mod browser;
pub mod config;
pub mod contexts;
pub mod error;
pub mod scenario;
pub mod users;
pub mod wiring;

pub use browser::{BrowserDriver, BrowserEvent, RecordingBrowser};
pub use config::{FrontendConfig, WebhookConfig};
pub use contexts::{
    BankApiContext, DatabaseContext, EmailActivation, FrontPage, FrontendContext, SearchPage,
    Session, TestUserBuilder, WebhookContext, WebhookDelivery,
};
pub use error::TestbedError;
pub use scenario::{ScenarioReport, perform_search_scenario, run_search_scenario};
pub use users::{BuildError, CreateHook, HookStage, User, UserBuilder, UserDraft};
pub use wiring::{wire_frontend_testbed, wire_frontend_testbed_with};
