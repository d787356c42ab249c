//! Typed access to fixture configuration.
//!
//! A fixture's entry lives under `fixtures.<name>` and holds at most one key,
//! `config`. Fixtures are placeholders that must run unconfigured, so an
//! absent entry, an absent `config` or a `null` one all load as `T::default()`.
//! Anything else in the entry is reported, so a misspelled `config` key does
//! not silently fall back to defaults.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const CONFIG_KEY: &str = "config";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("fixture '{fixture}' entry is malformed: {found}")]
    Malformed { fixture: String, found: String },
    #[error("invalid config for fixture '{fixture}': {source}")]
    InvalidSection {
        fixture: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of raw per-fixture entries.
pub trait ConfigProvider: Send + Sync {
    /// The `fixtures.<fixture>` entry, if configured.
    fn fixture_section(&self, fixture: &str) -> Option<&Value>;
}

/// Provider with no entries; every fixture loads its defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyConfigProvider;

impl ConfigProvider for EmptyConfigProvider {
    fn fixture_section(&self, _fixture: &str) -> Option<&Value> {
        None
    }
}

/// Load the `config` section of a fixture's entry.
///
/// # Errors
/// `ConfigError::Malformed` if the entry is not an object or carries keys
/// other than `config`; `ConfigError::InvalidSection` if `config` does not
/// deserialize into `T`.
pub fn load_fixture_config<T: DeserializeOwned + Default>(
    provider: &dyn ConfigProvider,
    fixture: &str,
) -> Result<T, ConfigError> {
    let entry = match provider.fixture_section(fixture) {
        None | Some(Value::Null) => return Ok(T::default()),
        Some(Value::Object(entry)) => entry,
        Some(other) => {
            return Err(ConfigError::Malformed {
                fixture: fixture.to_owned(),
                found: format!("expected an object, found {}", kind(other)),
            });
        }
    };

    if let Some(key) = entry.keys().find(|key| key.as_str() != CONFIG_KEY) {
        return Err(ConfigError::Malformed {
            fixture: fixture.to_owned(),
            found: format!("unexpected key '{key}', only '{CONFIG_KEY}' is allowed"),
        });
    }

    match entry.get(CONFIG_KEY) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(section) => {
            serde_json::from_value(section.clone()).map_err(|source| ConfigError::InvalidSection {
                fixture: fixture.to_owned(),
                source,
            })
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Deadlines applied by the runtime to every lifecycle step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Upper bound for a single fixture's `initialize`.
    pub init_timeout_ms: u64,
    /// Upper bound for a single fixture's `dispose`.
    pub dispose_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            init_timeout_ms: 30_000,
            dispose_timeout_ms: 10_000,
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }

    #[must_use]
    pub fn dispose_timeout(&self) -> Duration {
        Duration::from_millis(self.dispose_timeout_ms)
    }
}
