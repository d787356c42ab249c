//! Layered async test fixtures.
//!
//! A fixture tree is a set of [`Fixture`] nodes, each owning its children
//! exclusively. [`FixtureRuntime::acquire`] initializes the tree top-down in
//! declared order and returns a [`FixtureScope`]; disposing the scope releases
//! every node in the inverse order. Partial failures release whatever was
//! already acquired.
//!
//! ```ignore
//! let runtime = FixtureRuntime::new(RuntimeConfig::default());
//! runtime
//!     .run_scoped(frontend, |frontend| async move {
//!         let page = frontend.navigate_to_search_page().await?;
//!         page.perform_search("test query").await?;
//!         Ok(())
//!     })
//!     .await?;
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod contracts;
pub mod error;
pub mod lifecycle;
pub mod runtime;
pub mod scope;

pub use config::{
    ConfigError, ConfigProvider, EmptyConfigProvider, RuntimeConfig, load_fixture_config,
};
pub use contracts::{Fixture, FixtureCtx};
pub use error::{FixtureError, LifecycleStep};
pub use lifecycle::{Lifecycle, LifecycleState};
pub use runtime::FixtureRuntime;
pub use scope::FixtureScope;
