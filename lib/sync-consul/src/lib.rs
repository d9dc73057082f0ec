//! Consul integration: submits registrations to the local agent
//!
//! This library provides:
//! - AgentServiceRegistration: the agent API's JSON shape of a registration
//! - ConsulClient: register/deregister calls against `/v1/agent/service`

pub mod agent;
pub mod client;

pub use agent::{AgentServiceCheck, AgentServiceRegistration, AgentWeights};
pub use client::{ConsulClient, ConsulConfig, ConsulError};
