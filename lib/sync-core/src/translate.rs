//! Entry point of the translation engine

use sync_api::{ApplicationDefinition, PortOverrides, ServiceRegistration};
use tracing::debug;

use crate::assembler::assemble;
use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::ports::apply_port_overrides;
use crate::warning::{SyncWarning, Warnings};

/// Registrations derived from one application, with the anomalies met on the way
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Translation {
    pub registrations: Vec<ServiceRegistration>,
    pub warnings: Vec<SyncWarning>,
}

/// Translate an application definition into registry registrations.
///
/// Fails only when the definition as a whole is unusable; malformed entries
/// are dropped and reported in [`Translation::warnings`].
pub fn translate(
    app: &ApplicationDefinition,
    overrides: &PortOverrides,
    clock: &dyn Clock,
) -> Result<Translation> {
    if app.id.trim().is_empty() {
        return Err(CoreError::InvalidDefinition(
            "application id is empty".to_string(),
        ));
    }

    let resolved = apply_port_overrides(app, overrides);
    let mut warnings = Warnings::new();
    let registrations = assemble(&resolved, clock, &mut warnings);

    debug!(
        "Translated {} into {} registrations ({} warnings)",
        app.id,
        registrations.len(),
        warnings.len()
    );

    Ok(Translation {
        registrations,
        warnings: warnings.into_vec(),
    })
}
