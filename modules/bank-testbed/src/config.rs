//! Per-fixture configuration sections.

use serde::{Deserialize, Serialize};

/// `fixtures.frontend.config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontendConfig {
    pub base_url: String,
    pub front_page_path: String,
    pub search_page_path: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4200".to_owned(),
            front_page_path: "/".to_owned(),
            search_page_path: "/search".to_owned(),
        }
    }
}

impl FrontendConfig {
    #[must_use]
    pub fn front_page_url(&self) -> String {
        self.page_url(&self.front_page_path)
    }

    #[must_use]
    pub fn search_page_url(&self) -> String {
        self.page_url(&self.search_page_path)
    }

    fn page_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// `fixtures.webhooks.config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookConfig {
    /// Label of the receiving endpoint. Must be an http(s) URL when set.
    pub endpoint: Option<String>,
}
