use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Free-form operator labels attached to an application or a port
pub type Labels = BTreeMap<String, String>;

/// Operator supplied replacement ports, keyed by index in the port definition list
pub type PortOverrides = BTreeMap<usize, i32>;

/// ApplicationDefinition is the declarative definition of a running Marathon
/// application. Only the fields the synchronizer reads are modelled.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDefinition {
    /// Dot or slash segmented identifier assigned by Marathon
    pub id: String,

    /// User the tasks run as, empty when unset
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,

    /// Version timestamp of this definition, empty when unset
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_ports: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,

    /// Declared ports. Order matters: the index is the join key for
    /// health checks and port overrides.
    #[serde(
        default,
        rename = "portDefinitions",
        skip_serializing_if = "Option::is_none"
    )]
    pub ports: Option<Vec<PortDefinition>>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub health_checks: Vec<HealthCheckSpec>,
}

impl ApplicationDefinition {
    /// Port definitions, or an empty slice when the list is absent
    pub fn port_definitions(&self) -> &[PortDefinition] {
        self.ports.as_deref().unwrap_or_default()
    }

    /// Application level label lookup
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.as_ref()?.get(key).map(String::as_str)
    }

    pub fn requires_ports(&self) -> bool {
        self.require_ports.unwrap_or(false)
    }
}

/// One declared network port of an application
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortDefinition {
    /// Host port; absent or non-positive means "not assigned"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
}

impl PortDefinition {
    /// The port if it is set and positive
    pub fn assigned_port(&self) -> Option<i32> {
        self.port.filter(|p| *p > 0)
    }

    /// Port level label lookup
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.as_ref()?.get(key).map(String::as_str)
    }
}

/// A Marathon health check entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckSpec {
    #[serde(default)]
    pub protocol: HealthCheckProtocol,

    /// Explicit port, takes precedence over `port_index` when positive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,

    /// Index into the application's port definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_index: Option<i32>,

    /// HTTP path, `/` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u32,

    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u32,
}

impl Default for HealthCheckSpec {
    fn default() -> Self {
        Self {
            protocol: HealthCheckProtocol::default(),
            port: None,
            port_index: None,
            path: None,
            timeout_seconds: default_timeout_seconds(),
            interval_seconds: default_interval_seconds(),
        }
    }
}

/// Health check protocol as spelled by Marathon
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HealthCheckProtocol {
    #[default]
    Http,
    Https,
    MesosHttp,
    MesosHttps,
    Tcp,
    MesosTcp,
    /// Anything else Marathon knows about (COMMAND, ...)
    Other(String),
}

impl HealthCheckProtocol {
    pub fn as_str(&self) -> &str {
        match self {
            HealthCheckProtocol::Http => "HTTP",
            HealthCheckProtocol::Https => "HTTPS",
            HealthCheckProtocol::MesosHttp => "MESOS_HTTP",
            HealthCheckProtocol::MesosHttps => "MESOS_HTTPS",
            HealthCheckProtocol::Tcp => "TCP",
            HealthCheckProtocol::MesosTcp => "MESOS_TCP",
            HealthCheckProtocol::Other(other) => other,
        }
    }
}

impl From<String> for HealthCheckProtocol {
    fn from(value: String) -> Self {
        match value.as_str() {
            "HTTP" => HealthCheckProtocol::Http,
            "HTTPS" => HealthCheckProtocol::Https,
            "MESOS_HTTP" => HealthCheckProtocol::MesosHttp,
            "MESOS_HTTPS" => HealthCheckProtocol::MesosHttps,
            "TCP" => HealthCheckProtocol::Tcp,
            "MESOS_TCP" => HealthCheckProtocol::MesosTcp,
            _ => HealthCheckProtocol::Other(value),
        }
    }
}

impl From<&str> for HealthCheckProtocol {
    fn from(value: &str) -> Self {
        HealthCheckProtocol::from(value.to_string())
    }
}

impl From<HealthCheckProtocol> for String {
    fn from(value: HealthCheckProtocol) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for HealthCheckProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Marathon sends `null` for unset strings and lists
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Marathon defaults
fn default_timeout_seconds() -> u32 {
    20
}

fn default_interval_seconds() -> u32 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_marathon_app() {
        let json = r#"{
            "id": "/prod/web.42",
            "user": null,
            "version": "2024-05-01T10:00:00.000Z",
            "requirePorts": true,
            "labels": {"ctags": "a,b"},
            "portDefinitions": [
                {"port": 10000, "name": "http", "labels": {"weight": "20"}},
                {"port": 0, "protocol": "tcp"}
            ],
            "healthChecks": [
                {"protocol": "MESOS_HTTP", "portIndex": 0, "path": "/health"},
                {"protocol": "COMMAND", "command": {"value": "true"}}
            ]
        }"#;

        let app: ApplicationDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(app.id, "/prod/web.42");
        assert_eq!(app.user, "");
        assert!(app.requires_ports());
        assert_eq!(app.label("ctags"), Some("a,b"));
        assert_eq!(app.port_definitions().len(), 2);
        assert_eq!(app.port_definitions()[0].label("weight"), Some("20"));
        assert_eq!(app.port_definitions()[1].assigned_port(), None);
        assert_eq!(app.health_checks[0].protocol, HealthCheckProtocol::MesosHttp);
        assert_eq!(app.health_checks[0].timeout_seconds, 20);
        assert_eq!(app.health_checks[0].interval_seconds, 60);
        assert_eq!(
            app.health_checks[1].protocol,
            HealthCheckProtocol::Other("COMMAND".to_string())
        );
    }

    #[test]
    fn test_missing_port_definitions() {
        let app: ApplicationDefinition = serde_json::from_str(r#"{"id": "a.b"}"#).unwrap();
        assert!(app.ports.is_none());
        assert!(app.port_definitions().is_empty());
        assert!(app.health_checks.is_empty());
        assert_eq!(app.label("anything"), None);
    }

    #[test]
    fn test_deserialize_yaml_definition() {
        let yaml = r#"
id: svc.7
portDefinitions:
  - port: 8080
    name: ""
healthChecks:
  - protocol: TCP
    port: 8080
    timeoutSeconds: 3
"#;
        let app: ApplicationDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(app.port_definitions()[0].assigned_port(), Some(8080));
        assert_eq!(app.health_checks[0].protocol, HealthCheckProtocol::Tcp);
        assert_eq!(app.health_checks[0].timeout_seconds, 3);
    }

    #[test]
    fn test_protocol_round_trips_unknown_values() {
        let protocol = HealthCheckProtocol::from("COMMAND");
        assert_eq!(protocol.to_string(), "COMMAND");
        let value = serde_json::to_value(HealthCheckProtocol::MesosTcp).unwrap();
        assert_eq!(value, serde_json::json!("MESOS_TCP"));
    }
}
