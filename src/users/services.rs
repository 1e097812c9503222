use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::warn;

use crate::{auth::repo_types::User, error::ApiError, state::AppState};

pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Stores a new picture for `user`, drops the old object and returns the updated row.
pub async fn replace_profile_picture(
    state: &AppState,
    mut user: User,
    body: Bytes,
    content_type: &str,
) -> Result<User, ApiError> {
    let ext = ext_from_mime(content_type).ok_or_else(|| {
        ApiError::bad_request("Invalid file type. Only JPEG, PNG, GIF and WebP images are allowed.")
    })?;
    if body.is_empty() {
        return Err(ApiError::bad_request("No file uploaded"));
    }
    if body.len() > MAX_PICTURE_BYTES {
        return Err(ApiError::bad_request("File is larger than 5 MB"));
    }

    let ts = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
    let key = format!("profile-pictures/user-{}-{}.{}", user.id, ts, ext);
    state
        .objects
        .put_object(&key, body, content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;

    let old = user.profile_picture.replace(key);
    let saved = state
        .store
        .save_user(&user)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if let Some(old) = old {
        if let Err(e) = state.objects.delete_object(&old).await {
            warn!(key = %old, error = %e, "old profile picture not deleted");
        }
    }
    Ok(saved)
}
