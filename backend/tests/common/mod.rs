//! Common test utilities for integration tests
//!
//! Builds the full router over an in-memory health service and in-memory
//! settings, so tests need no device bridge and no files.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Local, TimeZone};
use serde_json::Value;
use std::sync::Arc;
use total_evolve_backend::{
    config::AppConfig,
    health_data::InMemoryHealthService,
    repositories::{MemorySettingsStore, SettingsStore},
    routes,
    state::AppState,
};
use total_evolve_shared::{HealthMetric, HealthUnit, Quantity};
use tower::ServiceExt;

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub health: Arc<InMemoryHealthService>,
    pub storage: Arc<MemorySettingsStore>,
}

impl TestApp {
    /// Create a new test application with empty stores
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemorySettingsStore::new()))
    }

    /// Create a test application over existing settings
    pub fn with_storage(storage: Arc<MemorySettingsStore>) -> Self {
        let health = Arc::new(InMemoryHealthService::new());
        let settings: Arc<dyn SettingsStore> = storage.clone();
        let state = AppState::new(AppConfig::default(), health.clone(), settings);
        let app = routes::create_router(state.clone());

        Self {
            app,
            state,
            health,
            storage,
        }
    }

    /// Record one sample per metric at noon today
    pub fn seed_today(&self) {
        let now = local_noon();
        self.health
            .record(HealthMetric::BodyMass, Quantity::new(70000.0, HealthUnit::Gram), now);
        self.health
            .record(HealthMetric::DietaryProtein, Quantity::new(95.0, HealthUnit::Gram), now);
        self.health
            .record(HealthMetric::DietaryEnergy, Quantity::new(1850.0, HealthUnit::Kilocalorie), now);
        self.health
            .record(HealthMetric::DietaryWater, Quantity::new(2.0, HealthUnit::Liter), now);
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        self.send("GET", path, None).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        self.send("POST", path, Some(body)).await
    }

    /// Make a PUT request with JSON body
    pub async fn put(&self, path: &str, body: &str) -> (StatusCode, String) {
        self.send("PUT", path, Some(body)).await
    }

    async fn send(&self, method: &str, path: &str, body: Option<&str>) -> (StatusCode, String) {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }
}

/// Parse a response body as JSON
pub fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

/// Find a metric row in a dashboard response
pub fn metric<'a>(dashboard: &'a Value, identifier: &str) -> &'a Value {
    dashboard["metrics"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["metric"] == identifier)
        .unwrap()
}

/// Noon today in the local time zone, as UTC
pub fn local_noon() -> chrono::DateTime<chrono::Utc> {
    let today = Local::now().date_naive();
    Local
        .from_local_datetime(&today.and_hms_opt(12, 0, 0).unwrap())
        .earliest()
        .unwrap()
        .with_timezone(&chrono::Utc)
}
