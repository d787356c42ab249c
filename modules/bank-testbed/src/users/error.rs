use std::fmt;

/// Which side of base finalization a hook was running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    BeforeCreate,
    AfterCreate,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BeforeCreate => "before_create",
            Self::AfterCreate => "after_create",
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("{field} {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("create hook '{hook}' failed in {stage}: {source}")]
    Hook {
        hook: &'static str,
        stage: HookStage,
        #[source]
        source: anyhow::Error,
    },
}

impl BuildError {
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// True when a hook failed because its fixture was not active.
    #[must_use]
    pub fn is_lifecycle_violation(&self) -> bool {
        match self {
            Self::Hook { source, .. } => source
                .downcast_ref::<fixturekit::FixtureError>()
                .is_some_and(fixturekit::FixtureError::is_lifecycle_violation),
            Self::Validation { .. } => false,
        }
    }
}
