//! Operator port overrides

use sync_api::{ApplicationDefinition, PortOverrides};
use tracing::debug;

/// Return a copy of `app` with the overridden ports replaced. Indices that do
/// not exist in this version of the application are ignored.
pub fn apply_port_overrides(
    app: &ApplicationDefinition,
    overrides: &PortOverrides,
) -> ApplicationDefinition {
    let mut app = app.clone();
    let Some(ports) = app.ports.as_mut() else {
        return app;
    };

    for (&index, &port) in overrides {
        match ports.get_mut(index) {
            Some(port_def) => {
                debug!("Overriding port #{} of {} with {}", index, app.id, port);
                port_def.port = Some(port);
            }
            None => debug!("Ignoring override for missing port #{} of {}", index, app.id),
        }
    }

    app
}
