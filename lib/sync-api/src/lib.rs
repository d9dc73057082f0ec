//! Data model shared by the Marathon to Consul synchronizer
//!
//! This library defines:
//! - ApplicationDefinition: a Marathon application as returned by `/v2/apps/{id}`
//! - ServiceRegistration: one Consul agent service derived from an application port
//! - CheckDescriptor: a Consul agent check attached to a registration

pub mod marathon;
pub mod registration;

pub use marathon::{
    ApplicationDefinition, HealthCheckProtocol, HealthCheckSpec, Labels, PortDefinition,
    PortOverrides,
};
pub use registration::{
    CheckDescriptor, CheckKind, ServiceRegistration, Weights, DEFAULT_PASSING_WEIGHT,
};
