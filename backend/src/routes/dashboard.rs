//! Dashboard API routes
//!
//! Reads never wait for the health-data service: they return whatever the
//! metrics store holds, with per-metric status and a `loading` flag.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use total_evolve_shared::types::DashboardResponse;
use tracing::info;

/// Create dashboard routes
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_dashboard))
        .route("/authorize", post(authorize))
        .route("/refresh", post(refresh))
}

/// GET /api/v1/dashboard - Current metric snapshot
async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    Json(DashboardResponse::from(&state.metrics.snapshot()))
}

/// POST /api/v1/dashboard/authorize - Request health data access
///
/// Resolves the authorization request, then returns while the metric
/// fetches it started are still running.
async fn authorize(State(state): State<AppState>) -> (StatusCode, Json<DashboardResponse>) {
    info!("Dashboard authorization requested");
    state.metrics.request_authorization().await;
    (
        StatusCode::ACCEPTED,
        Json(DashboardResponse::from(&state.metrics.snapshot())),
    )
}

/// POST /api/v1/dashboard/refresh - Start fetching all four metrics
async fn refresh(State(state): State<AppState>) -> (StatusCode, Json<DashboardResponse>) {
    state.metrics.refresh();
    (
        StatusCode::ACCEPTED,
        Json(DashboardResponse::from(&state.metrics.snapshot())),
    )
}
