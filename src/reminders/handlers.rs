use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateReminder, PatchReminder, UpcomingQuery},
    notify::notify_user,
    repo_types::Reminder,
};
use crate::{
    auth::AuthUser, calendar::today, categories::services::check_visible, error::ApiError,
    extract::{ValidJson, ValidPath, ValidQuery}, state::AppState,
};

pub fn reminder_routes() -> Router<AppState> {
    Router::new()
        .route("/reminders", get(list_reminders).post(create_reminder))
        .route("/reminders/upcoming", get(upcoming_reminders))
        .route("/reminders/notify", post(notify_reminders))
        .route(
            "/reminders/:id",
            get(get_reminder).patch(update_reminder).delete(delete_reminder),
        )
}

#[instrument(skip(state))]
pub async fn list_reminders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let reminders = state.store.list_reminders(auth.user_id).await?;
    Ok(Json(json!({ "reminders": reminders })))
}

#[instrument(skip(state))]
pub async fn upcoming_reminders(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidQuery(q): ValidQuery<UpcomingQuery>,
) -> Result<Json<Value>, ApiError> {
    let from = today();
    let to = from + Duration::days(i64::from(q.days()?));
    let reminders = state
        .store
        .list_due_reminders(auth.user_id, from, to)
        .await?;
    Ok(Json(json!({ "reminders": reminders })))
}

/// Sends the caller's pending bill digest now.
#[instrument(skip(state))]
pub async fn notify_reminders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let notified = notify_user(&state, auth.user_id, today()).await?;
    Ok(Json(json!({ "notified": notified })))
}

#[instrument(skip(state, payload))]
pub async fn create_reminder(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(payload): ValidJson<CreateReminder>,
) -> Result<(StatusCode, Json<Reminder>), ApiError> {
    let new = payload.validate()?;
    check_visible(state.store.as_ref(), auth.user_id, new.category_id).await?;
    let reminder = state.store.create_reminder(auth.user_id, new).await?;
    info!(user_id = %auth.user_id, reminder_id = %reminder.id, "reminder created");
    Ok((StatusCode::CREATED, Json(reminder)))
}

#[instrument(skip(state))]
pub async fn get_reminder(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<Reminder>, ApiError> {
    let reminder = state
        .store
        .get_reminder(auth.user_id, id)
        .await?
        .ok_or(ApiError::NotFound("Reminder"))?;
    Ok(Json(reminder))
}

#[instrument(skip(state, payload))]
pub async fn update_reminder(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<PatchReminder>,
) -> Result<Json<Reminder>, ApiError> {
    let mut reminder = state
        .store
        .get_reminder(auth.user_id, id)
        .await?
        .ok_or(ApiError::NotFound("Reminder"))?;
    payload.apply(&mut reminder)?;
    check_visible(state.store.as_ref(), auth.user_id, reminder.category_id).await?;
    let saved = state
        .store
        .save_reminder(&reminder)
        .await?
        .ok_or(ApiError::NotFound("Reminder"))?;
    Ok(Json(saved))
}

#[instrument(skip(state))]
pub async fn delete_reminder(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete_reminder(auth.user_id, id).await? {
        return Err(ApiError::NotFound("Reminder"));
    }
    info!(user_id = %auth.user_id, reminder_id = %id, "reminder deleted");
    Ok(StatusCode::NO_CONTENT)
}
