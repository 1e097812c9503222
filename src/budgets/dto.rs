use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use super::repo_types::{Budget, NewBudget};
use crate::{
    error::ApiError,
    extract::{nullable, required_text},
    money::validate_amount,
};

pub const DEFAULT_PERIOD: &str = "monthly";

fn default_period() -> String {
    DEFAULT_PERIOD.to_string()
}

/// Free-text period label, stored lower-case.
pub(crate) fn normalize_period(field: &str, raw: &str) -> Result<String, ApiError> {
    Ok(required_text(field, raw)?.to_lowercase())
}

fn check_range(start: Date, end: Option<Date>) -> Result<(), ApiError> {
    match end {
        Some(end) if end < start => Err(ApiError::bad_request("endDate must not be before startDate")),
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudget {
    #[serde(default)]
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    #[serde(default = "default_period")]
    pub period: String,
    pub start_date: Date,
    #[serde(default)]
    pub end_date: Option<Date>,
}

impl CreateBudget {
    pub fn validate(self) -> Result<NewBudget, ApiError> {
        check_range(self.start_date, self.end_date)?;
        Ok(NewBudget {
            category_id: self.category_id,
            amount: validate_amount("amount", self.amount)?,
            period: normalize_period("period", &self.period)?,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchBudget {
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<Uuid>>,
    pub amount: Option<Decimal>,
    pub period: Option<String>,
    pub start_date: Option<Date>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<Date>>,
}

impl PatchBudget {
    pub fn apply(self, b: &mut Budget) -> Result<(), ApiError> {
        if let Some(category_id) = self.category_id {
            b.category_id = category_id;
        }
        if let Some(amount) = self.amount {
            b.amount = validate_amount("amount", amount)?;
        }
        if let Some(period) = self.period {
            b.period = normalize_period("period", &period)?;
        }
        if let Some(start) = self.start_date {
            b.start_date = start;
        }
        if let Some(end) = self.end_date {
            b.end_date = end;
        }
        check_range(b.start_date, b.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn create_defaults_period_and_checks_range() {
        let body: CreateBudget =
            serde_json::from_str(r#"{"amount":"300","startDate":"2024-03-01"}"#).unwrap();
        let new = body.validate().unwrap();
        assert_eq!(new.period, "monthly");
        assert_eq!(new.category_id, None);

        let backwards: CreateBudget = serde_json::from_str(
            r#"{"amount":"300","period":" Weekly ","startDate":"2024-03-10","endDate":"2024-03-01"}"#,
        )
        .unwrap();
        assert!(backwards.validate().is_err());
    }

    #[test]
    fn patch_rechecks_range_after_merge() {
        let mut b = Budget {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category_id: None,
            amount: Decimal::from(100),
            period: "monthly".into(),
            start_date: date!(2024 - 03 - 01),
            end_date: Some(date!(2024 - 03 - 31)),
        };
        let patch: PatchBudget =
            serde_json::from_str(r#"{"startDate":"2024-04-01"}"#).unwrap();
        assert!(patch.apply(&mut b.clone()).is_err());

        let patch: PatchBudget =
            serde_json::from_str(r#"{"endDate":null,"period":"Yearly"}"#).unwrap();
        patch.apply(&mut b).unwrap();
        assert_eq!(b.end_date, None);
        assert_eq!(b.period, "yearly");
    }
}
