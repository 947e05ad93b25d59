//! Gym plan API routes

use crate::error::ApiError;
use crate::services::current_weekday;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use total_evolve_shared::types::{PlanResponse, SetWorkoutRequest};
use validator::Validate;

/// Create plan routes
pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_plan))
        .route("/:day_index", put(set_workout))
}

/// GET /api/v1/plan - Seven days with today highlighted
async fn get_plan(State(state): State<AppState>) -> Json<PlanResponse> {
    Json(PlanResponse::new(&state.plan.plan(), current_weekday()))
}

/// PUT /api/v1/plan/:day_index - Assign a workout to one day
///
/// `day_index` runs from 0 (Monday) to 6 (Sunday). The workout must be
/// one of the labels listed by `GET /plan`.
async fn set_workout(
    State(state): State<AppState>,
    Path(day_index): Path<usize>,
    Json(req): Json<SetWorkoutRequest>,
) -> Result<Json<PlanResponse>, ApiError> {
    req.validate()?;
    let plan = state.plan.set_workout(day_index, &req.workout)?;
    Ok(Json(PlanResponse::new(&plan, current_weekday())))
}
