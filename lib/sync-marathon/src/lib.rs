//! Marathon integration: fetches application definitions over the REST API
pub mod client;

pub use client::{MarathonClient, MarathonConfig, MarathonError};
