//! Translation of Marathon applications into Consul service registrations
//!
//! This library provides:
//! - A pure translation engine from an application definition to registrations
//! - Structured warnings for entries dropped along the way
//! - Collaborator traits for the orchestrator and registry clients
//! - A synchronizer running one fetch/translate/register cycle

pub mod assembler;
pub mod clock;
pub mod error;
pub mod health_check;
pub mod metadata;
pub mod ports;
pub mod registry;
pub mod sync;
pub mod tags;
pub mod translate;
pub mod warning;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, Result};
pub use registry::ServiceRegistry;
pub use sync::{ApplicationSource, ServiceRegistrar, SyncConfig, SyncReport, Synchronizer};
pub use translate::{translate, Translation};
pub use warning::{SyncWarning, Warnings};
