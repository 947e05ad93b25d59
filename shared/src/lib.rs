//! Total Evolve Shared Library
//!
//! This crate contains the domain types shared by the backend and any
//! presentation layer: health metrics, units, the weekly gym plan and the
//! API request/response shapes.

pub mod errors;
pub mod health_metrics;
pub mod models;
pub mod types;
pub mod units;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use health_metrics::*;
pub use models::*;
pub use types::*;
pub use units::*;
