/// Stat contribution endpoints
///
/// - `GET /stats` - All contributions, newest first
/// - `POST /users/:id/stats` - Submit a contribution (self or admin)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use levelboard_shared::{
    auth::{authorization::require_self_or_admin, middleware::AuthContext},
    ledger::{NewStat, StatOutcome},
    models::stat::StatContribution,
    ranking::Standing,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Stat submission request
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitStatRequest {
    /// Classification name
    #[validate(length(min = 1, message = "Classification is required"))]
    pub classification: String,

    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,

    pub value: f64,

    #[validate(length(min = 1, max = 100, message = "Category must be 1 to 100 characters"))]
    pub category: String,
}

/// Submission result with the user's standing afterwards
#[derive(Debug, Serialize)]
pub struct SubmitStatResponse {
    #[serde(flatten)]
    pub outcome: StatOutcome,
    pub standing: Standing,
}

pub async fn list_stats(State(state): State<AppState>) -> ApiResult<Json<Vec<StatContribution>>> {
    Ok(Json(state.store.list_stats().await?))
}

/// Records a stat, awards the `new_stat` points and reports the new standing
///
/// ```text
/// POST /users/:id/stats
/// { "classification": "Running", "title": "5k", "value": 5.2, "category": "distance" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unknown classification
/// - `403 Forbidden`: Caller is neither the user nor an admin
/// - `404 Not Found`: User doesn't exist
/// - `422 Unprocessable Entity`: Validation failed
pub async fn submit_stat(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
    Json(req): Json<SubmitStatRequest>,
) -> ApiResult<(StatusCode, Json<SubmitStatResponse>)> {
    require_self_or_admin(&auth, user_id)?;
    req.validate()?;

    let outcome = state
        .ledger
        .submit_stat(
            user_id,
            NewStat {
                classification: req.classification,
                title: req.title,
                value: req.value,
                category: req.category,
            },
        )
        .await?;

    let standing = state
        .ranking
        .user_standing(user_id, outcome.stat.classification_id)
        .await?;

    Ok((StatusCode::CREATED, Json(SubmitStatResponse { outcome, standing })))
}
