use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_THEME: &str = "light";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Per-user UI preferences.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub theme: String,
    pub high_contrast: bool,
    pub language: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl UserSettings {
    pub fn defaults(user_id: Uuid) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            user_id,
            theme: DEFAULT_THEME.into(),
            high_contrast: false,
            language: DEFAULT_LANGUAGE.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
