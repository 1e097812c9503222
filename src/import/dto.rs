use serde::{Deserialize, Serialize};

use super::{parser::ColumnMap, repo_types::KeywordRules};
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub imported: usize,
    pub skipped: usize,
    pub format: &'static str,
    pub message: String,
}

fn yes() -> bool {
    true
}

/// `PUT /csv-settings` body; replaces the stored settings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvSettingsBody {
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub column_mapping: Option<ColumnMap>,
    #[serde(default = "yes")]
    pub skip_header: bool,
    #[serde(default)]
    pub auto_categories: Option<KeywordRules>,
}

impl CsvSettingsBody {
    pub fn validate(mut self) -> Result<Self, ApiError> {
        if let Some(map) = &self.column_mapping {
            for (field, header) in [
                ("date", &map.date),
                ("description", &map.description),
                ("amount", &map.amount),
            ] {
                if header.trim().is_empty() {
                    return Err(ApiError::BadRequest(format!(
                        "columnMapping.{field} is required"
                    )));
                }
            }
        }
        if let Some(rules) = self.auto_categories.take() {
            let cleaned: KeywordRules = rules
                .into_iter()
                .map(|(name, words)| {
                    let words = words
                        .into_iter()
                        .map(|w| w.trim().to_string())
                        .filter(|w| !w.is_empty())
                        .collect();
                    (name.trim().to_string(), words)
                })
                .filter(|(name, _)| !name.is_empty())
                .collect();
            self.auto_categories = Some(cleaned);
        }
        self.bank_name = self
            .bank_name
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_body_defaults_and_cleanup() {
        let body: CsvSettingsBody = serde_json::from_str(
            r#"{"autoCategories":{" Pets ":["chewy"," ",""],"":["x"]}}"#,
        )
        .unwrap();
        assert!(body.skip_header);
        let body = body.validate().unwrap();
        let rules = body.auto_categories.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules["Pets"], vec!["chewy".to_string()]);
    }

    #[test]
    fn settings_body_requires_mapped_amount() {
        let body: CsvSettingsBody = serde_json::from_str(
            r#"{"columnMapping":{"date":"Date","description":"Memo","amount":" "}}"#,
        )
        .unwrap();
        assert!(body.validate().is_err());
    }
}
