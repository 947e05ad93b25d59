//! Leaderboard API routes

use crate::state::AppState;
use axum::{routing::get, Json, Router};
use total_evolve_shared::types::LeaderboardResponse;

pub fn leaderboard_routes() -> Router<AppState> {
    Router::new().route("/", get(get_leaderboard))
}

/// GET /api/v1/leaderboard - Placeholder screen with no rankings yet
async fn get_leaderboard() -> Json<LeaderboardResponse> {
    Json(LeaderboardResponse {
        title: "Leaderboard".to_string(),
        entries: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_leaderboard_is_empty() {
        let Json(response) = get_leaderboard().await;
        assert_eq!(response.title, "Leaderboard");
        assert!(response.entries.is_empty());
    }
}
