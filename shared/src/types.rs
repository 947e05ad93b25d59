//! API request and response types

use crate::health_metrics::{AuthorizationStatus, HealthMetric, HealthMetricSnapshot, MetricState};
use crate::models::{WeeklyPlan, Weekday, WorkoutLabel};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// Leaderboard
// ============================================================================

/// Leaderboard screen (placeholder, no entries yet)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub title: String,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub name: String,
    pub score: f64,
}

// ============================================================================
// Dashboard
// ============================================================================

/// One metric row on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricResponse {
    pub metric: HealthMetric,
    pub label: String,
    pub unit: String,
    #[serde(flatten)]
    pub state: MetricState,
}

impl MetricResponse {
    pub fn new(metric: HealthMetric, state: MetricState) -> Self {
        Self {
            metric,
            label: metric.label().to_string(),
            unit: metric.display_unit().abbreviation().to_string(),
            state,
        }
    }
}

/// Dashboard screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub authorization: AuthorizationStatus,
    /// True until a body weight has been received
    pub loading: bool,
    pub metrics: Vec<MetricResponse>,
}

impl From<&HealthMetricSnapshot> for DashboardResponse {
    fn from(snapshot: &HealthMetricSnapshot) -> Self {
        Self {
            authorization: snapshot.authorization,
            loading: !snapshot.weight.has_value(),
            metrics: HealthMetric::ALL
                .into_iter()
                .map(|m| MetricResponse::new(m, snapshot.slot(m).clone()))
                .collect(),
        }
    }
}

// ============================================================================
// Gym Plan
// ============================================================================

/// One day of the gym plan screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDayResponse {
    pub index: usize,
    pub day: Weekday,
    pub workout: WorkoutLabel,
    pub is_today: bool,
}

/// Gym plan screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub days: Vec<PlanDayResponse>,
    /// Labels offered by the workout picker
    pub workouts: Vec<WorkoutLabel>,
}

impl PlanResponse {
    pub fn new(plan: &WeeklyPlan, today: Weekday) -> Self {
        Self {
            days: plan
                .iter()
                .map(|(day, workout)| PlanDayResponse {
                    index: day.index(),
                    day,
                    workout,
                    is_today: day == today,
                })
                .collect(),
            workouts: WorkoutLabel::ALL.to_vec(),
        }
    }
}

/// Assign a workout to one day
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetWorkoutRequest {
    #[validate(length(min = 1, max = 64))]
    pub workout: String,
}
