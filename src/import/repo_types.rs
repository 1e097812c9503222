use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use super::parser::ColumnMap;

/// User-defined keyword rules: category name → keywords.
pub type KeywordRules = BTreeMap<String, Vec<String>>;

/// Saved CSV import preferences (one row per user).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CsvImportSetting {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bank_name: Option<String>,
    pub column_mapping: Option<Json<ColumnMap>>,
    pub skip_header: bool,
    pub auto_categories: Option<Json<KeywordRules>>,
}

impl CsvImportSetting {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            bank_name: None,
            column_mapping: None,
            skip_header: true,
            auto_categories: None,
        }
    }
}
