//! Consul agent API payloads

use serde::Serialize;
use std::collections::BTreeMap;
use sync_api::{CheckDescriptor, CheckKind, ServiceRegistration};

/// Body of `PUT /v1/agent/service/register`
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentServiceRegistration {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub port: i32,
    pub meta: BTreeMap<String, String>,
    pub weights: AgentWeights,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<AgentServiceCheck>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentWeights {
    pub passing: i32,
    pub warning: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentServiceCheck {
    pub name: String,
    #[serde(rename = "HTTP", skip_serializing_if = "Option::is_none")]
    pub http: Option<String>,
    #[serde(rename = "TCP", skip_serializing_if = "Option::is_none")]
    pub tcp: Option<String>,
    pub notes: String,
    pub timeout: String,
    pub interval: String,
}

impl From<&CheckDescriptor> for AgentServiceCheck {
    fn from(check: &CheckDescriptor) -> Self {
        let (http, tcp) = match check.kind {
            CheckKind::Http => (Some(check.target.clone()), None),
            CheckKind::Tcp => (None, Some(check.target.clone())),
        };
        Self {
            name: check.name.clone(),
            http,
            tcp,
            notes: check.notes.clone(),
            timeout: check.timeout.clone(),
            interval: check.interval.clone(),
        }
    }
}

impl From<&ServiceRegistration> for AgentServiceRegistration {
    fn from(registration: &ServiceRegistration) -> Self {
        Self {
            id: registration.id.clone(),
            name: registration.name.clone(),
            tags: registration.tags.clone(),
            port: registration.port,
            meta: registration.metadata.clone(),
            weights: AgentWeights {
                passing: registration.weights.passing,
                warning: registration.weights.warning,
            },
            checks: registration
                .health_checks
                .iter()
                .map(AgentServiceCheck::from)
                .collect(),
        }
    }
}
