//! Business logic services
//!
//! Services own application state and coordinate between the
//! health-data service and settings storage.

pub mod health_metrics;
pub mod weekly_plan;

pub use health_metrics::{Clock, HealthMetricsStore, SystemClock};
pub use weekly_plan::{current_weekday, WeeklyPlanStore, PLAN_KEY};
