use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use super::{
    dto::RegisterRequest,
    password::{check_new_password, hash_password},
    repo_types::NewUser,
    session::SessionKeys,
};
use crate::{error::ApiError, extract::required_text, state::AppState, store::Store};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims and lower-cases an address, rejecting anything that is not one.
pub(crate) fn normalize_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email"));
    }
    Ok(email)
}

/// Validates a registration form and hashes its password.
pub fn new_user_from(req: &RegisterRequest) -> Result<NewUser, ApiError> {
    let username = required_text("username", &req.username)?;
    if req.password.is_empty() {
        return Err(ApiError::bad_request("password is required"));
    }
    check_new_password("password", &req.password)?;
    let email = normalize_email(&req.email)?;
    let first_name = required_text("firstName", &req.first_name)?;
    let last_name = required_text("lastName", &req.last_name)?;
    Ok(NewUser {
        username,
        password_hash: hash_password(&req.password)?,
        email,
        first_name,
        last_name,
    })
}

/// The 400 to report when `new` collides with an existing account.
pub async fn duplicate_of(store: &dyn Store, new: &NewUser) -> anyhow::Result<Option<ApiError>> {
    if store.find_user_by_username(&new.username).await?.is_some() {
        return Ok(Some(ApiError::bad_request("Username already exists")));
    }
    if store.find_user_by_email(&new.email).await?.is_some() {
        return Ok(Some(ApiError::bad_request("Email already registered")));
    }
    Ok(None)
}

/// Opens a session row for `user_id` and returns the `Set-Cookie` value for it.
pub async fn start_session(state: &AppState, user_id: Uuid) -> anyhow::Result<String> {
    let keys = SessionKeys::from_ref(state);
    let session = state.store.create_session(user_id, keys.expires_at()).await?;
    let token = keys.sign(&session)?;
    Ok(keys.cookie(&token))
}
