use axum::{
    extract::{FromRef, State},
    http::{header::SET_COOKIE, HeaderName, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::{
    dto::{LoginRequest, PublicUser, RegisterRequest},
    extractors::AuthUser,
    password::verify_password,
    services::{duplicate_of, new_user_from, start_session},
    session::SessionKeys,
};
use crate::{
    error::ApiError, extract::ValidJson, state::AppState, users::repo_types::UserSettings,
};

type WithCookie<T> = ([(HeaderName, String); 1], Json<T>);

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/user", get(current_user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, WithCookie<PublicUser>), ApiError> {
    let new_user = new_user_from(&payload)?;

    if let Some(err) = duplicate_of(state.store.as_ref(), &new_user).await? {
        warn!(username = %new_user.username, email = %new_user.email, "registration collides with an account");
        return Err(err);
    }

    // A concurrent registration can still win the unique index.
    let user = match state.store.create_user(new_user.clone()).await {
        Ok(user) => user,
        Err(e) => match duplicate_of(state.store.as_ref(), &new_user).await? {
            Some(err) => {
                warn!(username = %new_user.username, "registration lost a concurrent insert");
                return Err(err);
            }
            None => return Err(e.into()),
        },
    };
    state
        .store
        .upsert_settings(&UserSettings::defaults(user.id))
        .await?;
    let cookie = start_session(&state, user.id).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        ([(SET_COOKIE, cookie)], Json(PublicUser::from(user))),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<WithCookie<PublicUser>, ApiError> {
    let username = payload.username.trim();
    let Some(user) = state.store.find_user_by_username(username).await? else {
        warn!(%username, "login unknown username");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let cookie = start_session(&state, user.id).await?;
    info!(user_id = %user.id, "user logged in");
    Ok(([(SET_COOKIE, cookie)], Json(PublicUser::from(user))))
}

/// Ends the caller's session if there is one; the cookie is cleared either way.
#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
) -> Result<WithCookie<Value>, ApiError> {
    if let Some(auth) = auth {
        state.store.delete_session(auth.session_id).await?;
        info!(user_id = %auth.user_id, "user logged out");
    }
    let keys = SessionKeys::from_ref(&state);
    Ok((
        [(SET_COOKIE, keys.clear_cookie())],
        Json(json!({ "success": true })),
    ))
}

#[instrument(skip(state))]
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .store
        .find_user(auth.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(PublicUser::from(user)))
}
