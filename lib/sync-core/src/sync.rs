//! One fetch/translate/register cycle against the external collaborators

use async_trait::async_trait;
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use sync_api::{ApplicationDefinition, PortOverrides, ServiceRegistration};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, Result};
use crate::translate::translate;
use crate::warning::SyncWarning;

/// Source of application definitions (the orchestrator)
#[async_trait]
pub trait ApplicationSource: Send + Sync {
    async fn fetch(&self, app_id: &str) -> Result<ApplicationDefinition>;
}

/// Sink for registrations (the registry)
#[async_trait]
pub trait ServiceRegistrar: Send + Sync {
    async fn register(&self, registration: &ServiceRegistration) -> Result<()>;

    async fn deregister(&self, service_id: &str) -> Result<()>;
}

#[derive(Clone, Debug, Default)]
pub struct SyncConfig {
    pub app_id: String,
    pub port_overrides: PortOverrides,
}

/// Outcome of one cycle
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Ids accepted by the registrar
    pub registered: Vec<String>,
    /// Ids rejected by the registrar, with the reason
    pub failures: Vec<(String, String)>,
    pub warnings: Vec<SyncWarning>,
}

/// Synchronizer pushes the registrations of one application to a registrar
pub struct Synchronizer {
    source: Arc<dyn ApplicationSource>,
    registrar: Arc<dyn ServiceRegistrar>,
    config: SyncConfig,
    clock: Arc<dyn Clock>,
    registered: RwLock<BTreeSet<String>>,
}

impl Synchronizer {
    pub fn new(
        source: Arc<dyn ApplicationSource>,
        registrar: Arc<dyn ServiceRegistrar>,
        config: SyncConfig,
    ) -> Self {
        Self::with_clock(source, registrar, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn ApplicationSource>,
        registrar: Arc<dyn ServiceRegistrar>,
        config: SyncConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            registrar,
            config,
            clock,
            registered: RwLock::new(BTreeSet::new()),
        }
    }

    /// Fetch the application, translate it and submit every registration.
    ///
    /// Fetch and translation errors abort before anything is submitted.
    /// Submission failures are reported; the cycle fails only if all of them
    /// failed.
    pub async fn sync_once(&self) -> Result<SyncReport> {
        let app = self.source.fetch(&self.config.app_id).await?;
        let translation = translate(&app, &self.config.port_overrides, self.clock.as_ref())?;

        let results = join_all(translation.registrations.iter().map(|registration| async move {
            let outcome = self.registrar.register(registration).await;
            (registration.id.clone(), outcome)
        }))
        .await;

        let mut report = SyncReport {
            warnings: translation.warnings,
            ..Default::default()
        };
        for (id, outcome) in results {
            match outcome {
                Ok(()) => {
                    debug!("Registered {}", id);
                    report.registered.push(id);
                }
                Err(e) => {
                    warn!("Failed to register {}: {}", id, e);
                    report.failures.push((id, e.to_string()));
                }
            }
        }

        self.registered
            .write()
            .await
            .extend(report.registered.iter().cloned());

        if report.registered.is_empty() && !report.failures.is_empty() {
            let (id, reason) = &report.failures[0];
            return Err(CoreError::Registrar(format!(
                "all {} registrations failed, first was {}: {}",
                report.failures.len(),
                id,
                reason
            )));
        }

        info!(
            "Synchronized {}: {} registered, {} failed, {} warnings",
            self.config.app_id,
            report.registered.len(),
            report.failures.len(),
            report.warnings.len()
        );

        Ok(report)
    }

    /// Ids registered so far
    pub async fn registered_ids(&self) -> Vec<String> {
        self.registered.read().await.iter().cloned().collect()
    }

    /// Deregister everything this synchronizer registered. Ids that fail to
    /// deregister are kept for a later attempt.
    pub async fn deregister_all(&self) -> Result<usize> {
        let ids = self.registered_ids().await;
        let mut removed = 0;
        let mut failed = Vec::new();

        for id in ids {
            match self.registrar.deregister(&id).await {
                Ok(()) => {
                    self.registered.write().await.remove(&id);
                    removed += 1;
                }
                Err(e) => {
                    warn!("Failed to deregister {}: {}", id, e);
                    failed.push(id);
                }
            }
        }

        if !failed.is_empty() {
            return Err(CoreError::Registrar(format!(
                "failed to deregister {}",
                failed.join(", ")
            )));
        }

        info!("Deregistered {} services of {}", removed, self.config.app_id);
        Ok(removed)
    }
}
