use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use super::session::{token_from_headers, SessionKeys};
use crate::{error::ApiError, state::AppState};

/// The authenticated caller: the session token verified and its session row live.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(ApiError::Unauthorized)?;

        let keys = SessionKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            debug!(error = %e, "invalid or expired session token");
            ApiError::Unauthorized
        })?;

        match state.store.find_session(claims.sid).await? {
            Some(s) if s.user_id == claims.sub && s.is_live(OffsetDateTime::now_utc()) => {
                Ok(AuthUser {
                    user_id: s.user_id,
                    session_id: s.id,
                })
            }
            _ => {
                warn!(user_id = %claims.sub, session_id = %claims.sid, "session revoked or expired");
                Err(ApiError::Unauthorized)
            }
        }
    }
}
