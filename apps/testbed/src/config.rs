//! Layered application configuration.
//!
//! Precedence, lowest first: built-in defaults, YAML file (`--config`),
//! `TESTBED__*` environment variables (`__` separates nesting levels), CLI
//! flags.

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use fixturekit::{ConfigProvider, RuntimeConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const ENV_PREFIX: &str = "TESTBED__";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: LogFormat::Plain,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub runtime: RuntimeConfig,
    /// Raw per-fixture sections: `fixtures.<name>.config`.
    pub fixtures: BTreeMap<String, serde_json::Value>,
}

impl AppConfig {
    /// Load defaults, then the optional YAML file, then the environment.
    ///
    /// # Errors
    /// Fails if `path` is not a file or the merged config does not deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            anyhow::ensure!(
                path.is_file(),
                "config file does not exist: {}",
                path.display()
            );
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment
            .extract()
            .context("failed to load configuration")
    }

    /// `-v` info, `-vv` debug, `-vvv` trace.
    pub fn apply_cli_overrides(&mut self, verbose: u8) {
        let level = match verbose {
            0 => return,
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        level.clone_into(&mut self.logging.level);
    }

    /// # Errors
    /// Fails if the config cannot be serialized.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration as YAML")
    }
}

impl ConfigProvider for AppConfig {
    fn fixture_section(&self, fixture: &str) -> Option<&serde_json::Value> {
        self.fixtures.get(fixture)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let cfg = AppConfig::load(None).unwrap();
        assert_eq!(cfg.runtime, RuntimeConfig::default());
        assert_eq!(cfg.logging.format, LogFormat::Plain);
        assert!(cfg.fixtures.is_empty());
    }

    #[test]
    fn yaml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "runtime:\n  init_timeout_ms: 250\nfixtures:\n  frontend:\n    config:\n      base_url: http://bank.test\n"
        )
        .unwrap();

        let cfg = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(cfg.runtime.init_timeout_ms, 250);
        assert_eq!(cfg.runtime.dispose_timeout_ms, 10_000);
        assert_eq!(
            cfg.fixture_section("frontend").unwrap()["config"]["base_url"],
            "http://bank.test"
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/testbed.yaml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn verbosity_raises_level() {
        let mut cfg = AppConfig::default();
        cfg.apply_cli_overrides(0);
        assert_eq!(cfg.logging.level, "warn");
        cfg.apply_cli_overrides(2);
        assert_eq!(cfg.logging.level, "debug");
        cfg.apply_cli_overrides(9);
        assert_eq!(cfg.logging.level, "trace");
    }

    #[test]
    fn yaml_dump_contains_sections() {
        let yaml = AppConfig::default().to_yaml().unwrap();
        assert!(yaml.contains("logging:"), "{yaml}");
        assert!(yaml.contains("init_timeout_ms: 30000"), "{yaml}");
    }
}
