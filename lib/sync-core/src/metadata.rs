//! Registry metadata and traffic weights derived from labels

use std::collections::BTreeMap;
use sync_api::{ApplicationDefinition, Labels, PortDefinition, Weights, DEFAULT_PASSING_WEIGHT};

use crate::warning::{SyncWarning, Warnings};

pub const MAX_META_KEY_LEN: usize = 128;
pub const MAX_META_VALUE_LEN: usize = 512;

/// Raw label key carrying the passing weight
pub const WEIGHT_LABEL: &str = "weight";
/// Metadata key the weight label is published under
pub const ORIGINAL_WEIGHT_KEY: &str = "original_weight";

/// Filter and rename one label for use as registry metadata. Returns `None`
/// for labels the registry would reject or that use a reserved key.
pub fn format_meta(key: &str, value: &str) -> Option<(String, String)> {
    if key.len() > MAX_META_KEY_LEN || value.len() > MAX_META_VALUE_LEN || !key.is_ascii() {
        return None;
    }

    let renamed = key.replace('.', "_");
    if is_reserved_key(&renamed) {
        return None;
    }

    let renamed = if renamed == WEIGHT_LABEL {
        ORIGINAL_WEIGHT_KEY.to_string()
    } else {
        renamed
    };

    Some((renamed, value.to_string()))
}

fn is_reserved_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    lower.starts_with("consul_")
        || lower.starts_with("dns_entry")
        || lower == "deregister_critical_service_after"
}

/// Metadata for one port: version and start marker, then application labels,
/// then port labels. Later entries win on collision.
pub fn service_meta(
    app: &ApplicationDefinition,
    port_def: &PortDefinition,
    start: &str,
) -> BTreeMap<String, String> {
    let mut meta = BTreeMap::from([
        ("marathon_app_version".to_string(), app.version.clone()),
        ("start".to_string(), start.to_string()),
    ]);

    for labels in [app.labels.as_ref(), port_def.labels.as_ref()].into_iter().flatten() {
        meta.extend(
            labels
                .iter()
                .filter_map(|(k, v)| format_meta(k, v)),
        );
    }

    meta
}

/// Passing weight from the `weight` label, port level overriding application
/// level. Unparseable values are reported and skipped.
pub fn service_weights(
    app: &ApplicationDefinition,
    port_def: &PortDefinition,
    warnings: &mut Warnings,
) -> Weights {
    let mut passing = DEFAULT_PASSING_WEIGHT;

    let levels: [(&str, Option<&Labels>); 2] = [
        ("application", app.labels.as_ref()),
        ("port", port_def.labels.as_ref()),
    ];
    for (level, labels) in levels {
        let Some(raw) = labels.and_then(|labels| labels.get(WEIGHT_LABEL)) else {
            continue;
        };
        match raw.parse::<i32>() {
            Ok(value) => passing = value,
            Err(e) => warnings.push(SyncWarning::InvalidWeight {
                level: level.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }

    Weights::from_passing(passing)
}
