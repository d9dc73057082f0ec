//! HTTP client for the Consul agent API

use async_trait::async_trait;
use std::time::Duration;
use sync_api::ServiceRegistration;
use sync_core::{CoreError, ServiceRegistrar};
use thiserror::Error;
use tracing::debug;

use crate::agent::AgentServiceRegistration;

pub type Result<T> = std::result::Result<T, ConsulError>;

const TOKEN_HEADER: &str = "X-Consul-Token";

#[derive(Error, Debug)]
pub enum ConsulError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Consul returned {status} for {operation} {service_id}: {body}")]
    Status {
        operation: &'static str,
        service_id: String,
        status: u16,
        body: String,
    },
}

#[derive(Clone, Debug)]
pub struct ConsulConfig {
    /// Agent base URL, e.g. `http://127.0.0.1:8500`
    pub url: String,
    /// ACL token, sent as `X-Consul-Token`
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8500".to_string(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// ConsulClient registers services with the local Consul agent
pub struct ConsulClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ConsulClient {
    pub fn new(config: ConsulConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.filter(|t| !t.is_empty()),
        })
    }

    /// `PUT /v1/agent/service/register`
    pub async fn register_service(&self, registration: &ServiceRegistration) -> Result<()> {
        let url = format!("{}/v1/agent/service/register", self.base_url);
        let body = AgentServiceRegistration::from(registration);

        let response = self.put(&url).json(&body).send().await?;
        self.check_status("register", &registration.id, response).await?;

        debug!("Registered {} with Consul", registration.id);
        Ok(())
    }

    /// `PUT /v1/agent/service/deregister/{id}`
    pub async fn deregister_service(&self, service_id: &str) -> Result<()> {
        let url = format!("{}/v1/agent/service/deregister/{}", self.base_url, service_id);

        let response = self.put(&url).send().await?;
        self.check_status("deregister", service_id, response).await?;

        debug!("Deregistered {} from Consul", service_id);
        Ok(())
    }

    fn put(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.put(url);
        match &self.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn check_status(
        &self,
        operation: &'static str,
        service_id: &str,
        response: reqwest::Response,
    ) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(ConsulError::Status {
            operation,
            service_id: service_id.to_string(),
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl ServiceRegistrar for ConsulClient {
    async fn register(&self, registration: &ServiceRegistration) -> sync_core::Result<()> {
        self.register_service(registration)
            .await
            .map_err(|e| CoreError::Registrar(e.to_string()))
    }

    async fn deregister(&self, service_id: &str) -> sync_core::Result<()> {
        self.deregister_service(service_id)
            .await
            .map_err(|e| CoreError::Registrar(e.to_string()))
    }
}
