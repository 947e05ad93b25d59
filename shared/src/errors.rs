//! Error types for the Total Evolve application

use crate::health_metrics::HealthMetric;
use crate::units::HealthUnit;
use thiserror::Error;

/// Errors reported by a health-data service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HealthError {
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Data type unavailable on this device: {0}")]
    DataTypeUnavailable(HealthMetric),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

/// Weekly plan edit errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Day index {0} is out of range (expected 0-6)")]
    InvalidDay(usize),

    #[error("Unknown workout: {0}")]
    UnknownWorkout(String),
}

/// Durable settings storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Unit conversion errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitError {
    #[error("Cannot convert {from} to {to}")]
    IncompatibleUnits { from: HealthUnit, to: HealthUnit },
}
