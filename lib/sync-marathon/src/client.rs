//! HTTP client for the Marathon REST API

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use sync_api::ApplicationDefinition;
use sync_core::{ApplicationSource, CoreError};
use thiserror::Error;
use tracing::debug;

pub type Result<T> = std::result::Result<T, MarathonError>;

#[derive(Error, Debug)]
pub enum MarathonError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Marathon returned {status} for {app_id}: {body}")]
    Status {
        app_id: String,
        status: u16,
        body: String,
    },

    #[error("Invalid application payload: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Clone, Debug)]
pub struct MarathonConfig {
    /// Base URL, e.g. `http://marathon.mesos:8080`
    pub url: String,
    pub timeout: Duration,
}

impl Default for MarathonConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Deserialize)]
struct AppResponse {
    app: ApplicationDefinition,
}

/// MarathonClient reads application definitions
pub struct MarathonClient {
    client: reqwest::Client,
    base_url: String,
}

impl MarathonClient {
    pub fn new(config: MarathonConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one application, `GET /v2/apps/{id}`
    pub async fn application(&self, app_id: &str) -> Result<ApplicationDefinition> {
        let url = format!("{}/v2/apps/{}", self.base_url, app_id.trim_start_matches('/'));
        debug!("Fetching Marathon application from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(MarathonError::Status {
                app_id: app_id.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AppResponse = serde_json::from_str(&body)?;
        debug!(
            "Fetched {} with {} port definitions",
            parsed.app.id,
            parsed.app.port_definitions().len()
        );
        Ok(parsed.app)
    }
}

#[async_trait]
impl ApplicationSource for MarathonClient {
    async fn fetch(&self, app_id: &str) -> sync_core::Result<ApplicationDefinition> {
        self.application(app_id)
            .await
            .map_err(|e| CoreError::Source(e.to_string()))
    }
}
