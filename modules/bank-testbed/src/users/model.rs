use serde::Serialize;

use super::BuildError;

/// A constructed user. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    name: String,
    age: i32,
}

impl User {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn age(&self) -> i32 {
        self.age
    }
}

/// Pending attribute values collected by a [`super::UserBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub(crate) name: Option<String>,
    pub(crate) age: i32,
}

impl UserDraft {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn age(&self) -> i32 {
        self.age
    }

    /// Base finalization: the name is required and must not be empty.
    pub(crate) fn validate(&self) -> Result<User, BuildError> {
        match self.name.as_deref() {
            None => Err(BuildError::Validation {
                field: "name",
                message: "must be provided",
            }),
            Some("") => Err(BuildError::Validation {
                field: "name",
                message: "must not be empty",
            }),
            Some(name) => Ok(User {
                name: name.to_owned(),
                age: self.age,
            }),
        }
    }
}
