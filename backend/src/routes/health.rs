//! Health check endpoints
//!
//! - /health: process is up
//! - /health/live: liveness, never touches storage
//! - /health/ready: settings storage is reachable and writable, 503 otherwise

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

/// Overall probe result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Healthy,
    Alive,
    Ready,
    NotReady,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ProbeStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageReport>,
}

/// What the readiness probe found about settings storage
#[derive(Debug, Serialize)]
pub struct StorageReport {
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub writable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn respond(status: ProbeStatus, storage: Option<StorageReport>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        storage,
    })
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    respond(ProbeStatus::Healthy, None)
}

/// GET /health/ready
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let storage = state.storage.as_ref();
    let error = storage.health_check().err().map(|e| e.to_string());
    let report = StorageReport {
        backend: storage.backend(),
        location: storage.location(),
        writable: error.is_none(),
        error,
    };

    if report.writable {
        Ok(respond(ProbeStatus::Ready, Some(report)))
    } else {
        warn!(backend = report.backend, error = ?report.error, "Settings storage not ready");
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            respond(ProbeStatus::NotReady, Some(report)),
        ))
    }
}

/// GET /health/live
pub async fn liveness_check() -> Json<HealthResponse> {
    respond(ProbeStatus::Alive, None)
}
