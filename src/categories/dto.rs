use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use super::repo_types::{Category, NewCategory};
use crate::{error::ApiError, extract::required_text};

fn check_color(raw: &str) -> Result<String, ApiError> {
    lazy_static! {
        static ref COLOR_RE: Regex = Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap();
    }
    let color = raw.trim();
    if !COLOR_RE.is_match(color) {
        return Err(ApiError::bad_request("color must look like #RRGGBB"));
    }
    Ok(color.to_uppercase())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(default)]
    pub is_income: bool,
}

impl CreateCategory {
    pub fn validate(self) -> Result<NewCategory, ApiError> {
        Ok(NewCategory {
            name: required_text("name", &self.name)?,
            icon: required_text("icon", &self.icon)?,
            color: check_color(&self.color)?,
            is_income: self.is_income,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchCategory {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_income: Option<bool>,
}

impl PatchCategory {
    pub fn apply(self, c: &mut Category) -> Result<(), ApiError> {
        if let Some(name) = self.name {
            c.name = required_text("name", &name)?;
        }
        if let Some(icon) = self.icon {
            c.icon = required_text("icon", &icon)?;
        }
        if let Some(color) = self.color {
            c.color = check_color(&color)?;
        }
        if let Some(is_income) = self.is_income {
            c.is_income = is_income;
        }
        Ok(())
    }
}
