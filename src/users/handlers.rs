use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header::LOCATION, HeaderName, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::{
    dto::{ChangePassword, PatchProfile, PatchSettings},
    repo_types::UserSettings,
    services::{replace_profile_picture, MAX_PICTURE_BYTES},
};
use crate::{
    auth::{
        dto::PublicUser,
        password::{check_new_password, hash_password, verify_password},
        repo_types::User,
        services::normalize_email,
        AuthUser,
    },
    error::ApiError,
    extract::{required_text, ValidJson, ValidMultipart},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/settings", get(get_settings).patch(update_settings))
        .route("/user/profile", patch(update_profile))
        .route("/user/change-password", post(change_password))
        .route(
            "/user/profile-picture",
            get(get_profile_picture)
                .post(upload_profile_picture)
                .layer(DefaultBodyLimit::max(MAX_PICTURE_BYTES + 64 * 1024)),
        )
}

async fn current(state: &AppState, auth: &AuthUser) -> Result<User, ApiError> {
    state
        .store
        .find_user(auth.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)
}

async fn settings_or_default(state: &AppState, auth: &AuthUser) -> Result<UserSettings, ApiError> {
    match state.store.get_settings(auth.user_id).await? {
        Some(s) => Ok(s),
        None => Ok(state
            .store
            .upsert_settings(&UserSettings::defaults(auth.user_id))
            .await?),
    }
}

#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserSettings>, ApiError> {
    Ok(Json(settings_or_default(&state, &auth).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(payload): ValidJson<PatchSettings>,
) -> Result<Json<UserSettings>, ApiError> {
    let mut settings = settings_or_default(&state, &auth).await?;
    payload.apply(&mut settings)?;
    Ok(Json(state.store.upsert_settings(&settings).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(payload): ValidJson<PatchProfile>,
) -> Result<Json<PublicUser>, ApiError> {
    let mut user = current(&state, &auth).await?;
    if let Some(first) = payload.first_name {
        user.first_name = required_text("firstName", &first)?;
    }
    if let Some(last) = payload.last_name {
        user.last_name = required_text("lastName", &last)?;
    }
    if let Some(raw) = payload.email {
        let email = normalize_email(&raw)?;
        if email != user.email {
            if let Some(other) = state.store.find_user_by_email(&email).await? {
                if other.id != user.id {
                    warn!(%email, "email already registered");
                    return Err(ApiError::bad_request("Email already registered"));
                }
            }
            user.email = email;
        }
    }
    let saved = state
        .store
        .save_user(&user)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    info!(user_id = %saved.id, "profile updated");
    Ok(Json(PublicUser::from(saved)))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(payload): ValidJson<ChangePassword>,
) -> Result<Json<Value>, ApiError> {
    let mut user = current(&state, &auth).await?;
    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(user_id = %user.id, "change-password with wrong current password");
        return Err(ApiError::bad_request("Current password is incorrect"));
    }
    check_new_password("newPassword", &payload.new_password)?;
    user.password_hash = hash_password(&payload.new_password)?;
    state.store.save_user(&user).await?;
    info!(user_id = %user.id, "password changed");
    Ok(Json(json!({ "success": true })))
}

/// POST /user/profile-picture (multipart field `profilePicture`)
#[instrument(skip(state, mp))]
pub async fn upload_profile_picture(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidMultipart(mut mp): ValidMultipart,
) -> Result<Json<Value>, ApiError> {
    let mut upload = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("profilePicture") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        upload = Some((data, content_type));
    }
    let (data, content_type) = upload.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    let user = current(&state, &auth).await?;
    let user = replace_profile_picture(&state, user, data, &content_type).await?;
    let key = user.profile_picture.unwrap_or_default();
    let image_url = state.objects.url(&key).await?;
    info!(user_id = %auth.user_id, %key, "profile picture uploaded");
    Ok(Json(json!({ "success": true, "imageUrl": image_url })))
}

#[instrument(skip(state))]
pub async fn get_profile_picture(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<(StatusCode, [(HeaderName, String); 1]), ApiError> {
    let key = current(&state, &auth)
        .await?
        .profile_picture
        .ok_or(ApiError::NotFound("Profile picture"))?;
    let url = state.objects.url(&key).await?;
    Ok((StatusCode::FOUND, [(LOCATION, url)]))
}
