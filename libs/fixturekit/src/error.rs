//! Error taxonomy for fixture acquisition, release and domain operations.

use std::fmt;
use std::time::Duration;

use crate::lifecycle::LifecycleState;

/// The lifecycle step a fixture was executing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStep {
    Initialize,
    Dispose,
}

impl fmt::Display for LifecycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleStep::Initialize => write!(f, "initialize"),
            LifecycleStep::Dispose => write!(f, "dispose"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// A fixture's own `initialize` returned an error.
    #[error("fixture '{fixture}' failed to initialize: {source}")]
    Initialize {
        fixture: String,
        #[source]
        source: anyhow::Error,
    },

    /// A fixture's own `dispose` returned an error.
    #[error("fixture '{fixture}' failed to dispose: {source}")]
    Dispose {
        fixture: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("fixture '{fixture}' did not {step} within {limit:?}")]
    Timeout {
        fixture: String,
        step: LifecycleStep,
        limit: Duration,
    },

    #[error("fixture '{fixture}' was cancelled")]
    Cancelled { fixture: String },

    /// An operation was invoked outside the fixture's valid window.
    #[error("cannot {operation} on fixture '{fixture}': '{blocking}' is {state}")]
    LifecycleViolation {
        fixture: String,
        operation: &'static str,
        blocking: String,
        state: LifecycleState,
    },

    /// The node is already owned by another parent, or appears twice in one tree.
    #[error("fixture '{fixture}' is already attached elsewhere in a fixture tree")]
    AlreadyAttached { fixture: String },

    /// A node failed after others were acquired; the acquired ones were released.
    #[error("{failure} ({released} acquired fixture(s) released, {} release failure(s))", .cleanup.len())]
    PartialInitialization {
        #[source]
        failure: Box<FixtureError>,
        released: usize,
        cleanup: Vec<FixtureError>,
    },

    /// One or more fixtures failed to release. Release continues past failures.
    #[error("{} fixture(s) failed to release: {}", .failures.len(), summarize(.failures))]
    Release { failures: Vec<FixtureError> },
}

fn summarize(failures: &[FixtureError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl FixtureError {
    #[must_use]
    pub fn is_lifecycle_violation(&self) -> bool {
        matches!(self, Self::LifecycleViolation { .. })
    }

    /// The error that caused acquisition to fail, looking through partial
    /// initialization wrappers.
    #[must_use]
    pub fn root_failure(&self) -> &FixtureError {
        match self {
            Self::PartialInitialization { failure, .. } => failure.root_failure(),
            other => other,
        }
    }

    /// Path of the fixture the error is about, if it concerns a single one.
    #[must_use]
    pub fn fixture(&self) -> Option<&str> {
        match self {
            Self::Initialize { fixture, .. }
            | Self::Dispose { fixture, .. }
            | Self::Timeout { fixture, .. }
            | Self::Cancelled { fixture }
            | Self::LifecycleViolation { fixture, .. }
            | Self::AlreadyAttached { fixture } => Some(fixture),
            Self::PartialInitialization { failure, .. } => failure.fixture(),
            Self::Release { .. } => None,
        }
    }

    pub(crate) fn step_failed(step: LifecycleStep, fixture: String, source: anyhow::Error) -> Self {
        match step {
            LifecycleStep::Initialize => Self::Initialize { fixture, source },
            LifecycleStep::Dispose => Self::Dispose { fixture, source },
        }
    }
}
