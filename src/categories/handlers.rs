use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateCategory, PatchCategory},
    repo_types::Category,
};
use crate::{auth::AuthUser, error::ApiError, extract::{ValidJson, ValidPath}, state::AppState};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", patch(update_category).delete(delete_category))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let categories = state.store.list_categories(auth.user_id).await?;
    Ok(Json(json!({ "categories": categories })))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(payload): ValidJson<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let new = payload.validate()?;
    let category = state.store.create_category(auth.user_id, new).await?;
    info!(user_id = %auth.user_id, category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// Shared defaults are not the caller's rows, so editing one is a 404.
#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<PatchCategory>,
) -> Result<Json<Category>, ApiError> {
    let mut category = state
        .store
        .get_category(auth.user_id, id)
        .await?
        .filter(|c| c.is_owned_by(auth.user_id))
        .ok_or(ApiError::NotFound("Category"))?;
    payload.apply(&mut category)?;
    let saved = state
        .store
        .save_category(&category)
        .await?
        .ok_or(ApiError::NotFound("Category"))?;
    Ok(Json(saved))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete_category(auth.user_id, id).await? {
        return Err(ApiError::NotFound("Category"));
    }
    info!(user_id = %auth.user_id, category_id = %id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
