//! Lifecycle state shared between a fixture, its runtime and the handles it gives out.
//!
//! Every fixture owns one [`Lifecycle`]. The runtime drives it through
//! `Created -> Initializing -> Active -> Disposing -> Disposed` (or `Failed`
//! when the fixture's own initialization fails). Domain operations call
//! [`Lifecycle::ensure_active`], which walks the ancestor chain so an
//! operation on a child is rejected until the whole tree above it is ready.

use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::FixtureError;

/// Lifecycle state of a single fixture node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Constructed, never acquired
    Created,
    /// Own `initialize` running, or children still being acquired
    Initializing,
    /// Node and its whole subtree are ready
    Active,
    /// Release of the tree has begun
    Disposing,
    /// Released; terminal
    Disposed,
    /// Own `initialize` failed; terminal
    Failed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Created => write!(f, "created"),
            LifecycleState::Initializing => write!(f, "initializing"),
            LifecycleState::Active => write!(f, "active"),
            LifecycleState::Disposing => write!(f, "disposing"),
            LifecycleState::Disposed => write!(f, "disposed"),
            LifecycleState::Failed => write!(f, "failed"),
        }
    }
}

struct Inner {
    name: Arc<str>,
    state: RwLock<LifecycleState>,
    parent: OnceLock<Lifecycle>,
}

/// Cheaply cloneable handle to a fixture node's lifecycle.
///
/// Clones observe the same state, so page objects and hooks created by a
/// fixture can keep a clone and validate liveness later.
#[derive(Clone)]
pub struct Lifecycle {
    inner: Arc<Inner>,
}

impl Lifecycle {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                state: RwLock::new(LifecycleState::Created),
                parent: OnceLock::new(),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.inner.state.read()
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Lifecycle> {
        self.inner.parent.get()
    }

    /// Slash-separated path from the root, e.g. `frontend/bank_api/database`.
    #[must_use]
    pub fn path(&self) -> String {
        let mut names = vec![self.name()];
        let mut cursor = self.parent();
        while let Some(node) = cursor {
            names.push(node.name());
            cursor = node.parent();
        }
        names.reverse();
        names.join("/")
    }

    /// True when this node and every ancestor are `Active`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.first_inactive().is_none()
    }

    /// Guard for domain operations.
    ///
    /// # Errors
    /// Returns [`FixtureError::LifecycleViolation`] naming the closest node in
    /// the ancestor chain (starting with this one) that is not `Active`.
    pub fn ensure_active(&self, operation: &'static str) -> Result<(), FixtureError> {
        match self.first_inactive() {
            None => Ok(()),
            Some((blocking, state)) => Err(FixtureError::LifecycleViolation {
                fixture: self.path(),
                operation,
                blocking,
                state,
            }),
        }
    }

    fn first_inactive(&self) -> Option<(String, LifecycleState)> {
        let mut cursor = Some(self);
        while let Some(node) = cursor {
            let state = node.state();
            if state != LifecycleState::Active {
                return Some((node.name().to_owned(), state));
            }
            cursor = node.parent();
        }
        None
    }

    /// Identity of the underlying node, used to detect shared nodes and cycles.
    pub(crate) fn key(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Lifecycle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Links this node under `parent`. A node belongs to exactly one parent.
    pub(crate) fn attach(&self, parent: &Lifecycle) -> Result<(), FixtureError> {
        if self.ptr_eq(parent) {
            return Err(FixtureError::AlreadyAttached {
                fixture: self.path(),
            });
        }
        match self.inner.parent.get() {
            Some(existing) if existing.ptr_eq(parent) => Ok(()),
            Some(_) => Err(FixtureError::AlreadyAttached {
                fixture: self.path(),
            }),
            None => self
                .inner
                .parent
                .set(parent.clone())
                .map_err(|_| FixtureError::AlreadyAttached {
                    fixture: self.name().to_owned(),
                }),
        }
    }

    /// Moves to `to` only if the current state is `from`.
    pub(crate) fn transition(
        &self,
        from: LifecycleState,
        to: LifecycleState,
        operation: &'static str,
    ) -> Result<(), FixtureError> {
        let mut state = self.inner.state.write();
        if *state != from {
            return Err(FixtureError::LifecycleViolation {
                fixture: self.path(),
                operation,
                blocking: self.name().to_owned(),
                state: *state,
            });
        }
        *state = to;
        Ok(())
    }

    pub(crate) fn set(&self, to: LifecycleState) {
        *self.inner.state.write() = to;
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("path", &self.path())
            .field("state", &self.state())
            .finish()
    }
}
