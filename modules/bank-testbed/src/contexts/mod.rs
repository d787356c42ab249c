//! Fixture contexts, one per layer of the test environment.
//!
//! ```text
//! frontend
//! `-- bank_api
//!     |-- database
//!     `-- webhooks
//! ```

pub mod bank_api;
pub mod database;
pub mod frontend;
pub mod pages;
pub mod webhooks;

pub use bank_api::{BankApiContext, Session};
pub use database::{DatabaseContext, EmailActivation, TestUserBuilder};
pub use frontend::FrontendContext;
pub use pages::{FrontPage, SearchPage};
pub use webhooks::{WebhookContext, WebhookDelivery};
