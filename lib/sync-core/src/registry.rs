//! In-memory service registrar

use crate::sync::ServiceRegistrar;
use crate::{CoreError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use sync_api::ServiceRegistration;
use tokio::sync::RwLock;
use tracing::debug;

/// ServiceRegistry keeps registrations in memory, keyed by service id.
/// Used for dry runs and as a test double for a real registry.
#[derive(Clone)]
pub struct ServiceRegistry {
    services: Arc<RwLock<HashMap<String, ServiceRegistration>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get a registration by service id
    pub async fn get_service(&self, service_id: &str) -> Result<ServiceRegistration> {
        let services = self.services.read().await;
        services
            .get(service_id)
            .cloned()
            .ok_or_else(|| CoreError::ServiceNotFound(service_id.to_string()))
    }

    /// List all registrations, ordered by service id
    pub async fn list_services(&self) -> Vec<ServiceRegistration> {
        let services = self.services.read().await;
        let mut list: Vec<_> = services.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }

    pub async fn service_count(&self) -> usize {
        let services = self.services.read().await;
        services.len()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceRegistrar for ServiceRegistry {
    async fn register(&self, registration: &ServiceRegistration) -> Result<()> {
        let mut services = self.services.write().await;
        services.insert(registration.id.clone(), registration.clone());
        debug!("Registered service: {}", registration.id);
        Ok(())
    }

    async fn deregister(&self, service_id: &str) -> Result<()> {
        let mut services = self.services.write().await;
        services.remove(service_id);
        debug!("Deregistered service: {}", service_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_api::Weights;

    fn registration(id: &str) -> ServiceRegistration {
        ServiceRegistration {
            id: id.to_string(),
            name: "svc".to_string(),
            port: 80,
            tags: vec![],
            metadata: Default::default(),
            weights: Weights::default(),
            health_checks: vec![],
        }
    }

    #[tokio::test]
    async fn test_register_replaces_by_id() {
        let registry = ServiceRegistry::new();
        registry.register(&registration("b")).await.unwrap();
        registry.register(&registration("a")).await.unwrap();

        let mut updated = registration("a");
        updated.port = 81;
        registry.register(&updated).await.unwrap();

        assert_eq!(registry.service_count().await, 2);
        assert_eq!(registry.get_service("a").await.unwrap().port, 81);
        let ids: Vec<_> = registry.list_services().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_deregister() {
        let registry = ServiceRegistry::new();
        registry.register(&registration("a")).await.unwrap();
        registry.deregister("a").await.unwrap();
        assert!(matches!(
            registry.get_service("a").await,
            Err(CoreError::ServiceNotFound(_))
        ));
    }
}
