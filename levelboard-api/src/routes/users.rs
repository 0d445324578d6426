/// User endpoints: listing, points, actions, subscriptions and administration

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use levelboard_shared::{
    auth::{authorization::require_self_or_admin, middleware::AuthContext},
    ledger::{ActionOutcome, PointsUpdate},
    leveling::LevelProgress,
    models::{
        action::ActionRecord,
        user::{User, UserProfile, UserRole},
    },
    ranking::ClassificationStanding,
    subscriptions::SubscribeOutcome,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AddPointsRequest {
    /// Signed delta
    pub points: i64,
}

#[derive(Debug, Deserialize)]
pub struct AddActionRequest {
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub classification_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub user_id: Uuid,
    pub classification_id: Uuid,
    pub status: SubscribeOutcome,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub points: i64,
    pub progress: LevelProgress,
}

/// Lists all users, password hashes omitted
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.store.list_users().await?))
}

/// Adds a signed point delta to a user (admin only)
///
/// ```text
/// POST /users/:id/addPoints
/// { "points": -5 }
/// ```
pub async fn add_points(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AddPointsRequest>,
) -> ApiResult<Json<PointsUpdate>> {
    state.require_current_admin(&auth).await?;
    Ok(Json(state.ledger.add_points(user_id, req.points).await?))
}

/// Records a named action and awards its points
///
/// # Errors
///
/// - `400 Bad Request`: Unknown action name
/// - `403 Forbidden`: Caller is neither the user nor an admin
/// - `404 Not Found`: User doesn't exist
pub async fn add_action(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AddActionRequest>,
) -> ApiResult<(StatusCode, Json<ActionOutcome>)> {
    require_self_or_admin(&auth, user_id)?;
    let outcome = state.ledger.record_action_named(user_id, &req.action).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Ten most recent actions, newest first
pub async fn recent_actions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ActionRecord>>> {
    Ok(Json(state.ledger.recent_actions(user_id, None).await?))
}

/// Standing of the user in each subscribed classification
pub async fn user_classifications(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ClassificationStanding>>> {
    Ok(Json(state.ranking.classifications_for_user(user_id).await?))
}

/// Profile summary with level progress
pub async fn profile(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> ApiResult<Json<ProfileResponse>> {
    let not_found = || ApiError::NotFound(format!("User {} not found", user_id));

    let user = state.store.find_user(user_id).await?.ok_or_else(not_found)?;
    let profile = state.store.user_profile(user_id).await?.ok_or_else(not_found)?;

    Ok(Json(ProfileResponse {
        profile,
        points: user.points,
        progress: LevelProgress::for_points(user.points),
    }))
}

/// Subscribes a user to a classification
///
/// # Errors
///
/// - `409 Conflict`: Already subscribed
pub async fn subscribe(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
    Json(req): Json<SubscribeRequest>,
) -> ApiResult<(StatusCode, Json<SubscribeResponse>)> {
    require_self_or_admin(&auth, user_id)?;

    match state.subscriptions.subscribe(user_id, req.classification_id).await? {
        SubscribeOutcome::AlreadySubscribed => Err(ApiError::Conflict(
            "User is already subscribed to this classification".to_string(),
        )),
        status @ SubscribeOutcome::Subscribed => Ok((
            StatusCode::CREATED,
            Json(SubscribeResponse {
                user_id,
                classification_id: req.classification_id,
                status,
            }),
        )),
    }
}

/// Changes a user's role (admin only)
///
/// A demoted admin loses admin routes at once; other routes read the role
/// from the token until it is refreshed.
pub async fn change_role(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> ApiResult<StatusCode> {
    state.require_current_admin(&auth).await?;

    let role: UserRole = req.role.parse().map_err(ApiError::BadRequest)?;

    if !state.store.update_user_role(user_id, role).await? {
        return Err(ApiError::NotFound(format!("User {} not found", user_id)));
    }

    tracing::info!(user_id = %user_id, role = role.as_str(), changed_by = %auth.user_id, "Role changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes a user with their actions, stats and subscriptions (admin only)
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.require_current_admin(&auth).await?;

    if !state.store.delete_user(user_id).await? {
        return Err(ApiError::NotFound(format!("User {} not found", user_id)));
    }

    tracing::info!(user_id = %user_id, deleted_by = %auth.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
