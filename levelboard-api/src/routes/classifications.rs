/// Classification endpoints
///
/// - `GET /classifications/:id` - Most subscribed classifications
/// - `GET /classifications/:id/details` - One classification with its ranking
/// - `POST /classifications` - Create a classification (admin)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use levelboard_shared::{
    auth::middleware::AuthContext,
    models::classification::{Classification, CreateClassification},
    ranking::{ClassificationDetails, PopularClassification, DEFAULT_RANKING_LIMIT},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassificationRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,
}

/// Classifications by subscriber count, each with its top contributor
///
/// The path segment is not used; the route shape is kept for existing clients.
pub async fn most_subscribed(
    State(state): State<AppState>,
    Path(_segment): Path<String>,
) -> ApiResult<Json<Vec<PopularClassification>>> {
    Ok(Json(
        state
            .ranking
            .top_classifications_by_subscribers(DEFAULT_RANKING_LIMIT)
            .await?,
    ))
}

pub async fn details(
    State(state): State<AppState>,
    Path(classification_id): Path<Uuid>,
) -> ApiResult<Json<ClassificationDetails>> {
    Ok(Json(state.ranking.classification_details(classification_id, None).await?))
}

/// Creates a classification (admin only)
///
/// # Errors
///
/// - `409 Conflict`: Name already exists
pub async fn create_classification(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateClassificationRequest>,
) -> ApiResult<(StatusCode, Json<Classification>)> {
    state.require_current_admin(&auth).await?;
    req.validate()?;

    let classification = state
        .store
        .create_classification(CreateClassification {
            name: req.name,
            description: req.description,
        })
        .await?;

    tracing::info!(
        classification_id = %classification.id,
        name = %classification.name,
        created_by = %auth.user_id,
        "Classification created"
    );

    Ok((StatusCode::CREATED, Json(classification)))
}
