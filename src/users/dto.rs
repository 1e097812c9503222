use serde::Deserialize;
use time::OffsetDateTime;

use super::repo_types::UserSettings;
use crate::{error::ApiError, extract::required_text};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSettings {
    pub theme: Option<String>,
    pub high_contrast: Option<bool>,
    pub language: Option<String>,
}

impl PatchSettings {
    pub fn apply(self, s: &mut UserSettings) -> Result<(), ApiError> {
        if let Some(theme) = self.theme {
            s.theme = required_text("theme", &theme)?.to_lowercase();
        }
        if let Some(hc) = self.high_contrast {
            s.high_contrast = hc;
        }
        if let Some(language) = self.language {
            s.language = required_text("language", &language)?;
        }
        s.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}
