//! Health-data service boundary
//!
//! The device health store is an external collaborator. [`HealthDataService`]
//! is the contract the dashboard needs from it: read authorization, the most
//! recent sample of a type, and the cumulative sum of a type over one day.
//!
//! Two implementations ship with the backend:
//! - [`InMemoryHealthService`]: sample-backed, used in development and tests
//! - [`HttpHealthBridge`]: JSON client for a device-side bridge process

pub mod bridge;
pub mod memory;

use crate::config::{HealthConfig, HealthProvider};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use total_evolve_shared::{DayWindow, HealthError, HealthMetric, Quantity, QuantitySample};
use tracing::info;

pub use bridge::HttpHealthBridge;
pub use memory::{AuthorizationBehavior, InMemoryHealthService};

/// Read-only access to a health-data store
#[async_trait]
pub trait HealthDataService: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    /// Whether the data type exists on this device
    fn supports(&self, _metric: HealthMetric) -> bool {
        true
    }

    /// Request read access to `metrics`
    async fn request_authorization(&self, metrics: &[HealthMetric]) -> Result<(), HealthError>;

    /// Most recent sample of `metric` by start date, if any
    async fn latest_sample(&self, metric: HealthMetric)
        -> Result<Option<QuantitySample>, HealthError>;

    /// Sum of samples of `metric` starting inside `window`
    ///
    /// `None` means no samples matched, which is distinct from a zero sum.
    async fn cumulative_sum(
        &self,
        metric: HealthMetric,
        window: &DayWindow,
    ) -> Result<Option<Quantity>, HealthError>;
}

/// Build the configured health-data service
pub fn build_service(config: &HealthConfig) -> Result<Arc<dyn HealthDataService>> {
    match config.provider {
        HealthProvider::Memory => {
            let service = match &config.fixture_path {
                Some(path) => InMemoryHealthService::from_fixture_file(path)
                    .with_context(|| format!("Failed to load health fixture {}", path))?,
                None => InMemoryHealthService::new(),
            };
            info!(fixture = ?config.fixture_path, "Using in-memory health data service");
            Ok(Arc::new(service))
        }
        HealthProvider::Bridge => {
            let url = config
                .bridge_url
                .as_deref()
                .context("health.bridge_url is required for the bridge provider")?;
            let bridge = HttpHealthBridge::new(
                url,
                config.bridge_token.clone(),
                config.request_timeout_secs,
            )?;
            info!(url = %url, "Using HTTP health data bridge");
            Ok(Arc::new(bridge))
        }
    }
}
