//! Assembly of one registration per eligible port definition

use sync_api::{ApplicationDefinition, PortDefinition, ServiceRegistration};
use tracing::debug;

use crate::clock::{format_timestamp, Clock};
use crate::health_check::map_health_checks;
use crate::metadata::{service_meta, service_weights};
use crate::tags::{global_tags, split_ctags, CTAGS_LABEL};
use crate::warning::{SyncWarning, Warnings};

/// Label overriding the service name, on the application or a port
pub const SERVICE_NAME_LABEL: &str = "consul_service_name";
/// Port label opting a port out of registration
pub const REGISTRATION_LABEL: &str = "consul_registration";

/// Build the registrations of an application whose port overrides have
/// already been applied.
pub fn assemble(
    app: &ApplicationDefinition,
    clock: &dyn Clock,
    warnings: &mut Warnings,
) -> Vec<ServiceRegistration> {
    let default_name = default_app_name(app);
    let global = global_tags(app, clock.now());
    let checks = map_health_checks(app, warnings);
    let suffix = instance_suffix(&app.id);

    let mut has_main_service = false;
    let mut registrations = Vec::new();

    for (index, port_def) in app.port_definitions().iter().enumerate() {
        let Some(port) = port_def.assigned_port() else {
            debug!("Skipping port #{} of {}: no port assigned", index, app.id);
            continue;
        };

        if has_main_service && port_def.name.is_empty() {
            debug!("Skipping port #{} of {}: main service already registered", index, app.id);
            continue;
        }

        if opted_out(port_def) {
            debug!("Skipping port #{} of {}: registration disabled by label", index, app.id);
            continue;
        }

        let mut tags = global.clone();
        tags.extend(split_ctags(port_def.label(CTAGS_LABEL)));
        tags.extend(split_ctags(app.label(CTAGS_LABEL)));
        tags.extend(checks.tags_for_port(port).iter().cloned());
        tags.sort();

        let name = app_name(&default_name, port_def);
        let id = service_id(&name, port, suffix.as_deref().unwrap_or_default());
        let start = format_timestamp(clock.now());

        debug!("Assembled registration {} for port #{} of {}", id, index, app.id);

        registrations.push(ServiceRegistration {
            id,
            name,
            port,
            tags,
            metadata: service_meta(app, port_def, &start),
            weights: service_weights(app, port_def, warnings),
            health_checks: checks.for_port(port),
        });

        if is_main_service(port_def) {
            has_main_service = true;
        }
    }

    if suffix.is_none() && !registrations.is_empty() {
        warnings.push(SyncWarning::MissingInstanceSegment {
            app_id: app.id.clone(),
        });
    }

    registrations
}

/// Unnamed port whose service name falls back to the application name
fn is_main_service(port_def: &PortDefinition) -> bool {
    port_def.name.is_empty() && port_def.label(SERVICE_NAME_LABEL).map_or(true, str::is_empty)
}

fn opted_out(port_def: &PortDefinition) -> bool {
    matches!(port_def.label(REGISTRATION_LABEL), Some("no") | Some("false"))
}

/// Application level service name label, else the raw application id
pub fn default_app_name(app: &ApplicationDefinition) -> String {
    app.label(SERVICE_NAME_LABEL).unwrap_or(&app.id).to_string()
}

/// Service name of one port definition
pub fn app_name(default_name: &str, port_def: &PortDefinition) -> String {
    match port_def.label(SERVICE_NAME_LABEL) {
        Some(name) if !name.is_empty() => sanitize_name(name),
        _ if !port_def.name.is_empty() => {
            sanitize_name(&format!("{}-{}", default_name, port_def.name))
        }
        _ => sanitize_name(default_name),
    }
}

/// Replace `/` and `.` with `-` and drop a single leading `-`
pub fn sanitize_name(name: &str) -> String {
    let clean = name.replace(['/', '.'], "-");
    match clean.strip_prefix('-') {
        Some(rest) => rest.to_string(),
        None => clean,
    }
}

/// `marathon-app-<escaped name>-<port>-<instance suffix>`
pub fn service_id(name: &str, port: i32, suffix: &str) -> String {
    format!(
        "marathon-app-{}-{}-{}",
        replace_non_alphanumeric(name, Some('-')),
        port,
        suffix
    )
}

/// Second dot-separated segment of the application id, reduced to its
/// alphanumeric characters
pub fn instance_suffix(app_id: &str) -> Option<String> {
    app_id
        .split('.')
        .nth(1)
        .map(|segment| replace_non_alphanumeric(segment, None))
}

/// Replace every non ASCII-alphanumeric character, or remove it when `with` is `None`
pub fn replace_non_alphanumeric(s: &str, with: Option<char>) -> String {
    s.chars()
        .filter_map(|c| if c.is_ascii_alphanumeric() { Some(c) } else { with })
        .collect()
}
