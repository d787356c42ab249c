//! Outgoing notification layer. Deliveries are recorded, never sent.

use async_trait::async_trait;
use fixturekit::{Fixture, FixtureCtx, FixtureError, Lifecycle};
use parking_lot::Mutex;
use serde::Serialize;

use crate::config::WebhookConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookDelivery {
    pub endpoint: Option<String>,
    pub event: String,
    pub payload: serde_json::Value,
}

pub struct WebhookContext {
    lifecycle: Lifecycle,
    config: WebhookConfig,
    deliveries: Mutex<Vec<WebhookDelivery>>,
}

impl WebhookContext {
    pub const NAME: &'static str = "webhooks";

    #[must_use]
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            lifecycle: Lifecycle::new(Self::NAME),
            config,
            deliveries: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    /// Record a notification for `event`.
    ///
    /// # Errors
    /// `LifecycleViolation` unless the webhook context and its ancestors are active.
    pub async fn publish(
        &self,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), FixtureError> {
        self.lifecycle.ensure_active("publish webhook")?;
        tokio::task::yield_now().await;
        tracing::debug!(fixture = self.lifecycle.name(), event, "Webhook recorded");
        self.deliveries.lock().push(WebhookDelivery {
            endpoint: self.config.endpoint.clone(),
            event: event.to_owned(),
            payload,
        });
        Ok(())
    }

    /// # Errors
    /// `LifecycleViolation` unless the webhook context and its ancestors are active.
    pub fn deliveries(&self) -> Result<Vec<WebhookDelivery>, FixtureError> {
        self.lifecycle.ensure_active("list webhook deliveries")?;
        Ok(self.deliveries.lock().clone())
    }
}

#[async_trait]
impl Fixture for WebhookContext {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    async fn initialize(&self, ctx: &FixtureCtx) -> anyhow::Result<()> {
        if let Some(endpoint) = &self.config.endpoint {
            anyhow::ensure!(
                endpoint.starts_with("http://") || endpoint.starts_with("https://"),
                "webhook endpoint '{endpoint}' is not an http(s) URL"
            );
        }
        tokio::task::yield_now().await;
        tracing::debug!(
            fixture = ctx.path(),
            endpoint = self.config.endpoint.as_deref().unwrap_or("<none>"),
            "Webhook receiver ready"
        );
        Ok(())
    }

    async fn dispose(&self, ctx: &FixtureCtx) -> anyhow::Result<()> {
        let pending = std::mem::take(&mut *self.deliveries.lock());
        tokio::task::yield_now().await;
        tracing::debug!(
            fixture = ctx.path(),
            deliveries = pending.len(),
            "Webhook receiver stopped"
        );
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use fixturekit::FixtureRuntime;
    use std::sync::Arc;

    #[tokio::test]
    async fn publish_records_delivery_with_endpoint() {
        let hooks = Arc::new(WebhookContext::new(WebhookConfig {
            endpoint: Some("http://hooks.test/in".into()),
        }));
        let scope = FixtureRuntime::default().acquire(hooks.clone()).await.unwrap();

        hooks
            .publish("user.created", serde_json::json!({ "name": "Alice" }))
            .await
            .unwrap();

        let deliveries = hooks.deliveries().unwrap();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].event, "user.created");
        assert_eq!(deliveries[0].endpoint.as_deref(), Some("http://hooks.test/in"));
        scope.dispose().await.unwrap();
    }

    #[tokio::test]
    async fn invalid_endpoint_fails_initialize() {
        let hooks = Arc::new(WebhookContext::new(WebhookConfig {
            endpoint: Some("ftp://nope".into()),
        }));

        let err = FixtureRuntime::default().acquire(hooks).await.err().unwrap();

        assert!(err.to_string().contains("webhooks"), "{err}");
    }

    #[tokio::test]
    async fn publish_outside_active_window_is_rejected() {
        let hooks = WebhookContext::new(WebhookConfig::default());

        let err = hooks
            .publish("user.created", serde_json::Value::Null)
            .await
            .unwrap_err();

        assert!(err.is_lifecycle_violation());
        assert!(hooks.deliveries.lock().is_empty());
    }
}
