//! Per-entry anomalies collected during translation
//!
//! None of these abort a translation: the offending entry is dropped and
//! processing continues with the next one.

use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncWarning {
    #[error("health check #{index} ({protocol}) has no usable port, dropping it")]
    BadHealthCheckPort { index: usize, protocol: String },

    #[error("health check #{index} has unsupported protocol {protocol}, dropping it")]
    UnsupportedProtocol { index: usize, protocol: String },

    #[error("{level} label weight={value:?} is not an integer: {reason}")]
    InvalidWeight {
        level: String,
        value: String,
        reason: String,
    },

    #[error("application id {app_id:?} has no second dot-separated segment, service ids carry no instance suffix")]
    MissingInstanceSegment { app_id: String },
}

/// Collector that logs each warning as it is recorded
#[derive(Debug, Default)]
pub struct Warnings {
    entries: Vec<SyncWarning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: SyncWarning) {
        warn!("{}", warning);
        self.entries.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_vec(self) -> Vec<SyncWarning> {
        self.entries
    }
}
