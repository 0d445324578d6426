use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use levelboard_shared::models::user::LeaderboardEntry;

/// Three users with the most points
pub async fn top3(State(state): State<AppState>) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    Ok(Json(state.ranking.top_n(3).await?))
}
