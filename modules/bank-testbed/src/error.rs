use fixturekit::FixtureError;

use crate::users::BuildError;

/// Errors from testbed domain operations.
#[derive(thiserror::Error, Debug)]
pub enum TestbedError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("browser failed to {action}: {source}")]
    Browser {
        action: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl TestbedError {
    #[must_use]
    pub fn is_lifecycle_violation(&self) -> bool {
        match self {
            Self::Fixture(err) => err.is_lifecycle_violation(),
            Self::Build(err) => err.is_lifecycle_violation(),
            Self::Browser { .. } => false,
        }
    }

    pub(crate) fn browser(action: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::Browser { action, source }
    }
}
