use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{CreateGoal, GoalView, PatchGoal};
use crate::{auth::AuthUser, error::ApiError, extract::{ValidJson, ValidPath}, state::AppState};

pub fn goal_routes() -> Router<AppState> {
    Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        .route(
            "/goals/:id",
            get(get_goal).patch(update_goal).delete(delete_goal),
        )
}

#[instrument(skip(state))]
pub async fn list_goals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let goals: Vec<GoalView> = state
        .store
        .list_goals(auth.user_id)
        .await?
        .into_iter()
        .map(GoalView::from)
        .collect();
    Ok(Json(json!({ "goals": goals })))
}

#[instrument(skip(state, payload))]
pub async fn create_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(payload): ValidJson<CreateGoal>,
) -> Result<(StatusCode, Json<GoalView>), ApiError> {
    let goal = state
        .store
        .create_goal(auth.user_id, payload.validate()?)
        .await?;
    info!(user_id = %auth.user_id, goal_id = %goal.id, "goal created");
    Ok((StatusCode::CREATED, Json(goal.into())))
}

#[instrument(skip(state))]
pub async fn get_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<GoalView>, ApiError> {
    let goal = state
        .store
        .get_goal(auth.user_id, id)
        .await?
        .ok_or(ApiError::NotFound("Goal"))?;
    Ok(Json(goal.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<PatchGoal>,
) -> Result<Json<GoalView>, ApiError> {
    let mut goal = state
        .store
        .get_goal(auth.user_id, id)
        .await?
        .ok_or(ApiError::NotFound("Goal"))?;
    payload.apply(&mut goal)?;
    let saved = state
        .store
        .save_goal(&goal)
        .await?
        .ok_or(ApiError::NotFound("Goal"))?;
    Ok(Json(saved.into()))
}

#[instrument(skip(state))]
pub async fn delete_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete_goal(auth.user_id, id).await? {
        return Err(ApiError::NotFound("Goal"));
    }
    info!(user_id = %auth.user_id, goal_id = %id, "goal deleted");
    Ok(StatusCode::NO_CONTENT)
}
