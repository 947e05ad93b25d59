//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Stores are built once**: the health service and settings storage are
//!    opened at startup and shared by every request
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **No cross-store references**: the two stores never see each other

use crate::config::AppConfig;
use crate::health_data::HealthDataService;
use crate::repositories::SettingsStore;
use crate::services::{HealthMetricsStore, WeeklyPlanStore};
use std::sync::Arc;

/// Shared application state
///
/// # Performance
///
/// - `config`: Wrapped in Arc, cloning is O(1)
/// - `metrics`: Internally Arc'd, cloning is O(1)
/// - `plan`: Wrapped in Arc, cloning is O(1)
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Dashboard metrics
    pub metrics: HealthMetricsStore,
    /// Gym plan
    pub plan: Arc<WeeklyPlanStore>,
    /// Durable settings backing the plan, checked by readiness probes
    pub storage: Arc<dyn SettingsStore>,
}

impl AppState {
    /// Create a new application state
    ///
    /// Loads the persisted weekly plan synchronously.
    pub fn new(
        config: AppConfig,
        health: Arc<dyn HealthDataService>,
        storage: Arc<dyn SettingsStore>,
    ) -> Self {
        let metrics = HealthMetricsStore::with_clock(
            health,
            Arc::new(crate::services::SystemClock),
            config.health.cancel_superseded_fetches,
        );
        let plan = Arc::new(WeeklyPlanStore::open(storage.clone()));

        Self {
            config: Arc::new(config),
            metrics,
            plan,
            storage,
        }
    }
}
