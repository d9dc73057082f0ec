use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Passing weight used when no `weight` label is present
pub const DEFAULT_PASSING_WEIGHT: i32 = 10;

/// ServiceRegistration is one registry service derived from one port of an
/// application
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRegistration {
    /// Stable identity, unique within one application's registrations
    pub id: String,

    pub name: String,

    /// Resolved host port
    pub port: i32,

    /// Sorted ascending, duplicates preserved
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    pub weights: Weights,

    #[serde(default)]
    pub health_checks: Vec<CheckDescriptor>,
}

/// Traffic weights applied by the registry depending on check status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weights {
    pub passing: i32,
    pub warning: i32,
}

impl Weights {
    /// Derive the warning weight from the passing weight
    pub fn from_passing(passing: i32) -> Self {
        Self {
            passing,
            warning: passing / 10 + 1,
        }
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self::from_passing(DEFAULT_PASSING_WEIGHT)
    }
}

/// Registry health check descriptor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDescriptor {
    pub name: String,
    pub kind: CheckKind,
    /// URL for HTTP checks, `host:port` for TCP checks
    pub target: String,
    pub notes: String,
    pub timeout: String,
    pub interval: String,
}

/// Kind of registry check. HTTPS checks are `Http` with an `https://` target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Http,
    Tcp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_weight_uses_integer_division() {
        let cases = [(1, 1), (9, 1), (10, 2), (11, 2), (100, 11)];
        for (passing, warning) in cases {
            assert_eq!(Weights::from_passing(passing).warning, warning, "passing={}", passing);
        }
    }

    #[test]
    fn test_default_weights() {
        let weights = Weights::default();
        assert_eq!(weights.passing, 10);
        assert_eq!(weights.warning, 2);
    }

    #[test]
    fn test_check_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_value(CheckKind::Tcp).unwrap(), serde_json::json!("tcp"));
        assert_eq!(serde_json::to_value(CheckKind::Http).unwrap(), serde_json::json!("http"));
    }
}
