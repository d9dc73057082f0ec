//! Mapping of Marathon health checks to registry checks

use std::collections::BTreeMap;
use sync_api::{
    ApplicationDefinition, CheckDescriptor, CheckKind, HealthCheckProtocol, HealthCheckSpec,
    PortDefinition,
};
use tracing::debug;

use crate::warning::{SyncWarning, Warnings};

/// Tag contributed to a port by each of its checks. TCP checks contribute it too.
pub const HEALTH_CHECK_TAG: &str = "http";

/// Registry checks keyed by the port they probe
#[derive(Clone, Debug, Default)]
pub struct PortChecks {
    checks: Vec<(i32, CheckDescriptor)>,
    tags: BTreeMap<i32, Vec<String>>,
}

impl PortChecks {
    /// Checks probing `port`, in health check order
    pub fn for_port(&self, port: i32) -> Vec<CheckDescriptor> {
        self.checks
            .iter()
            .filter(|(p, _)| *p == port)
            .map(|(_, check)| check.clone())
            .collect()
    }

    /// Protocol tags contributed to `port`
    pub fn tags_for_port(&self, port: i32) -> &[String] {
        self.tags.get(&port).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

/// Convert the application's health checks. Checks with an unsupported
/// protocol or without a resolvable port are dropped with a warning.
pub fn map_health_checks(app: &ApplicationDefinition, warnings: &mut Warnings) -> PortChecks {
    let ports = app.port_definitions();
    let mut mapped = PortChecks::default();

    for (index, check) in app.health_checks.iter().enumerate() {
        let (kind, scheme) = match &check.protocol {
            HealthCheckProtocol::Http | HealthCheckProtocol::MesosHttp => (CheckKind::Http, "http"),
            HealthCheckProtocol::Https | HealthCheckProtocol::MesosHttps => {
                (CheckKind::Http, "https")
            }
            HealthCheckProtocol::Tcp | HealthCheckProtocol::MesosTcp => (CheckKind::Tcp, "tcp"),
            HealthCheckProtocol::Other(protocol) => {
                warnings.push(SyncWarning::UnsupportedProtocol {
                    index,
                    protocol: protocol.clone(),
                });
                continue;
            }
        };

        let Some(port) = resolve_port(check, ports) else {
            warnings.push(SyncWarning::BadHealthCheckPort {
                index,
                protocol: check.protocol.to_string(),
            });
            continue;
        };

        let (name, target) = match kind {
            CheckKind::Http => {
                let path = check.path.as_deref().unwrap_or("/");
                (
                    format!("marathon_http_check_{}", index),
                    format!("{}://localhost:{}{}", scheme, port, path),
                )
            }
            CheckKind::Tcp => (
                format!("marathon_tcp_check_{}", index),
                format!("localhost:{}", port),
            ),
        };

        debug!("Mapped health check #{} of {} to {}", index, app.id, target);

        mapped.checks.push((
            port,
            CheckDescriptor {
                name,
                kind,
                target,
                notes: format!("{} Marathon HealthCheck: {:?}", scheme, check),
                timeout: duration_string(check.timeout_seconds),
                interval: duration_string(check.interval_seconds),
            },
        ));
        mapped
            .tags
            .entry(port)
            .or_default()
            .push(HEALTH_CHECK_TAG.to_string());
    }

    mapped
}

/// Effective port of a check: its own positive port, else the port of the
/// definition at `port_index`.
pub fn resolve_port(check: &HealthCheckSpec, ports: &[PortDefinition]) -> Option<i32> {
    if let Some(port) = check.port.filter(|p| *p > 0) {
        return Some(port);
    }

    let index = usize::try_from(check.port_index?).ok()?;
    ports.get(index)?.assigned_port()
}

fn duration_string(seconds: u32) -> String {
    format!("{}s", seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(port: Option<i32>) -> PortDefinition {
        PortDefinition {
            port,
            ..Default::default()
        }
    }

    fn check(protocol: &str) -> HealthCheckSpec {
        HealthCheckSpec {
            protocol: HealthCheckProtocol::from(protocol),
            ..Default::default()
        }
    }

    fn app(ports: Vec<PortDefinition>, checks: Vec<HealthCheckSpec>) -> ApplicationDefinition {
        ApplicationDefinition {
            id: "test.1".to_string(),
            ports: Some(ports),
            health_checks: checks,
            ..Default::default()
        }
    }

    #[test]
    fn test_http_check_by_port_index() {
        let hc = HealthCheckSpec {
            port_index: Some(0),
            path: Some("/health".to_string()),
            timeout_seconds: 5,
            interval_seconds: 10,
            ..check("HTTP")
        };
        let mut warnings = Warnings::new();
        let mapped = map_health_checks(&app(vec![port(Some(9000))], vec![hc]), &mut warnings);

        let checks = mapped.for_port(9000);
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].name, "marathon_http_check_0");
        assert_eq!(checks[0].kind, CheckKind::Http);
        assert_eq!(checks[0].target, "http://localhost:9000/health");
        assert_eq!(checks[0].timeout, "5s");
        assert_eq!(checks[0].interval, "10s");
        assert!(checks[0].notes.starts_with("http Marathon HealthCheck:"));
        assert_eq!(mapped.tags_for_port(9000), ["http"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_https_defaults_path() {
        let hc = HealthCheckSpec {
            port: Some(8443),
            ..check("MESOS_HTTPS")
        };
        let mut warnings = Warnings::new();
        let mapped = map_health_checks(&app(vec![], vec![hc]), &mut warnings);
        let checks = mapped.for_port(8443);
        assert_eq!(checks[0].kind, CheckKind::Http);
        assert_eq!(checks[0].target, "https://localhost:8443/");
    }

    #[test]
    fn test_tcp_check_tags_port_with_http() {
        let hc = HealthCheckSpec {
            port_index: Some(1),
            ..check("TCP")
        };
        let mut warnings = Warnings::new();
        let mapped = map_health_checks(
            &app(vec![port(Some(80)), port(Some(5432))], vec![hc]),
            &mut warnings,
        );
        let checks = mapped.for_port(5432);
        assert_eq!(checks[0].name, "marathon_tcp_check_0");
        assert_eq!(checks[0].kind, CheckKind::Tcp);
        assert_eq!(checks[0].target, "localhost:5432");
        assert_eq!(mapped.tags_for_port(5432), ["http"]);
        assert!(mapped.for_port(80).is_empty());
        assert!(mapped.tags_for_port(80).is_empty());
    }

    #[test]
    fn test_explicit_port_wins_over_index() {
        let hc = HealthCheckSpec {
            port: Some(7000),
            port_index: Some(0),
            ..check("HTTP")
        };
        assert_eq!(resolve_port(&hc, &[port(Some(9000))]), Some(7000));

        let hc = HealthCheckSpec {
            port: Some(0),
            port_index: Some(0),
            ..check("HTTP")
        };
        assert_eq!(resolve_port(&hc, &[port(Some(9000))]), Some(9000));
    }

    #[test]
    fn test_unresolvable_ports_are_dropped() {
        let checks = vec![
            HealthCheckSpec {
                port_index: Some(5),
                ..check("HTTP")
            },
            HealthCheckSpec {
                port_index: Some(0),
                ..check("TCP")
            },
            HealthCheckSpec {
                port_index: Some(-1),
                ..check("HTTP")
            },
            check("HTTP"),
        ];
        let mut warnings = Warnings::new();
        let mapped = map_health_checks(&app(vec![port(None)], checks), &mut warnings);
        assert!(mapped.is_empty());

        let warnings = warnings.into_vec();
        assert_eq!(warnings.len(), 4);
        assert_eq!(
            warnings[1],
            SyncWarning::BadHealthCheckPort {
                index: 1,
                protocol: "TCP".to_string()
            }
        );
    }

    #[test]
    fn test_missing_port_definitions_yield_no_checks() {
        let application = ApplicationDefinition {
            id: "test.1".to_string(),
            health_checks: vec![HealthCheckSpec {
                port_index: Some(0),
                ..check("HTTP")
            }],
            ..Default::default()
        };
        let mut warnings = Warnings::new();
        assert!(map_health_checks(&application, &mut warnings).is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unsupported_protocol_is_dropped() {
        let hc = HealthCheckSpec {
            port: Some(8080),
            ..check("COMMAND")
        };
        let mut warnings = Warnings::new();
        let mapped = map_health_checks(&app(vec![], vec![hc]), &mut warnings);
        assert!(mapped.is_empty());
        assert_eq!(
            warnings.into_vec(),
            vec![SyncWarning::UnsupportedProtocol {
                index: 0,
                protocol: "COMMAND".to_string()
            }]
        );
    }

    #[test]
    fn test_multiple_checks_on_one_port() {
        let checks = vec![
            HealthCheckSpec {
                port_index: Some(0),
                ..check("HTTP")
            },
            HealthCheckSpec {
                port_index: Some(0),
                ..check("MESOS_TCP")
            },
        ];
        let mut warnings = Warnings::new();
        let mapped = map_health_checks(&app(vec![port(Some(3000))], checks), &mut warnings);
        assert_eq!(mapped.len(), 2);
        let names: Vec<_> = mapped.for_port(3000).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["marathon_http_check_0", "marathon_tcp_check_1"]);
        assert_eq!(mapped.tags_for_port(3000), ["http", "http"]);
    }
}
