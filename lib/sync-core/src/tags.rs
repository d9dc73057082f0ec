//! Tags shared by every registration of an application

use chrono::{DateTime, Utc};
use sync_api::ApplicationDefinition;

use crate::clock::format_timestamp;

/// Label holding comma separated extra tags, on the application or a port
pub const CTAGS_LABEL: &str = "ctags";

pub const REQUIRE_PORT_TAG: &str = "marathon-requirePort";

/// Start marker, owning user and port requirement tags, in that order
pub fn global_tags(app: &ApplicationDefinition, started_at: DateTime<Utc>) -> Vec<String> {
    let mut tags = vec![format!("marathon-start-{}", format_timestamp(started_at))];

    if !app.user.is_empty() {
        tags.push(format!("marathon-user-{}", app.user));
    }
    if app.requires_ports() {
        tags.push(REQUIRE_PORT_TAG.to_string());
    }

    tags
}

/// Split a `ctags` label value. Empty or missing values yield nothing; pieces
/// are kept verbatim.
pub fn split_ctags(value: Option<&str>) -> Vec<String> {
    match value {
        Some(value) if !value.is_empty() => value.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}
