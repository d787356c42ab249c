//! Users and the fluent user builder.

pub mod builder;
pub mod error;
pub mod model;

pub use builder::{CreateHook, UserBuilder};
pub use error::{BuildError, HookStage};
pub use model::{User, UserDraft};
