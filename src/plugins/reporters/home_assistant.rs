use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::StatusConfig;
use crate::models::StatusReport;
use crate::plugins::traits::StatusReporter;
use crate::utils::error::{AppError, Result};

/// Upserts an entity state through the Home Assistant REST API.
pub struct HomeAssistantReporter {
    client: Client,
    endpoint: String,
    token: String,
}

impl HomeAssistantReporter {
    pub fn new(base_url: &str, token: &str, entity: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/states/{}", base_url.trim_end_matches('/'), entity),
            token: token.to_string(),
        })
    }

    /// `None` when no base URL is configured.
    pub fn from_config(config: &StatusConfig) -> Result<Option<Self>> {
        let Some(base_url) = config.base_url.as_deref().filter(|u| !u.is_empty()) else {
            return Ok(None);
        };
        let token = config.token.as_deref().unwrap_or_default();

        Self::new(base_url, token, &config.entity, Duration::from_secs(config.timeout_secs)).map(Some)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl StatusReporter for HomeAssistantReporter {
    async fn report(&self, report: &StatusReport) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(report)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Report(format!(
                "Home Assistant API returned status {}",
                status.as_u16()
            )));
        }

        tracing::trace!("Reported state '{}' to {}", report.state.as_str(), self.endpoint);
        Ok(())
    }
}
