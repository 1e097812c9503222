use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use super::repo_types::{NewTransaction, Transaction, TransactionFilter};
use crate::{
    calendar::query_date,
    error::ApiError,
    extract::{nullable, required_text},
    money::validate_amount,
};

/// `GET /transactions` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn into_filter(self) -> Result<TransactionFilter, ApiError> {
        let category_id = match self.category.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(
                raw.parse::<Uuid>()
                    .map_err(|_| ApiError::bad_request("category must be a category id"))?,
            ),
        };
        Ok(TransactionFilter {
            from_date: query_date("fromDate", self.from_date.as_deref())?,
            to_date: query_date("toDate", self.to_date.as_deref())?,
            category_id,
            search: self
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            limit: None,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    pub amount: Decimal,
    pub description: String,
    pub date: Date,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub is_income: bool,
}

impl CreateTransaction {
    pub fn validate(self) -> Result<NewTransaction, ApiError> {
        Ok(NewTransaction {
            category_id: self.category_id,
            amount: validate_amount("amount", self.amount)?,
            description: required_text("description", &self.description)?,
            date: self.date,
            is_income: self.is_income,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTransaction {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub date: Option<Date>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<Uuid>>,
    pub is_income: Option<bool>,
}

impl PatchTransaction {
    pub fn apply(self, tx: &mut Transaction) -> Result<(), ApiError> {
        if let Some(amount) = self.amount {
            tx.amount = validate_amount("amount", amount)?;
        }
        if let Some(description) = self.description {
            tx.description = required_text("description", &description)?;
        }
        if let Some(date) = self.date {
            tx.date = date;
        }
        if let Some(category_id) = self.category_id {
            tx.category_id = category_id;
        }
        if let Some(is_income) = self.is_income {
            tx.is_income = is_income;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use time::macros::date;

    #[test]
    fn create_accepts_string_or_number_amounts() {
        let a: CreateTransaction = serde_json::from_str(
            r#"{"amount":"12.50","description":"Lunch","date":"2024-03-01"}"#,
        )
        .unwrap();
        let b: CreateTransaction = serde_json::from_str(
            r#"{"amount":12.5,"description":"Lunch","date":"2024-03-01","isIncome":false}"#,
        )
        .unwrap();
        let a = a.validate().unwrap();
        assert_eq!(a.amount, b.validate().unwrap().amount);
        assert_eq!(a.date, date!(2024 - 03 - 01));
    }

    #[test]
    fn create_rejects_negative_amount_and_blank_description() {
        let neg: CreateTransaction = serde_json::from_str(
            r#"{"amount":-1,"description":"x","date":"2024-03-01"}"#,
        )
        .unwrap();
        assert!(neg.validate().is_err());
        let blank: CreateTransaction = serde_json::from_str(
            r#"{"amount":1,"description":"  ","date":"2024-03-01"}"#,
        )
        .unwrap();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn patch_can_clear_category() {
        let mut tx = Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category_id: Some(Uuid::new_v4()),
            amount: Decimal::from_str("5").unwrap(),
            description: "Coffee".into(),
            date: date!(2024 - 03 - 01),
            is_income: false,
        };
        let patch: PatchTransaction =
            serde_json::from_str(r#"{"categoryId":null,"amount":"7.25"}"#).unwrap();
        patch.apply(&mut tx).unwrap();
        assert_eq!(tx.category_id, None);
        assert_eq!(tx.amount, Decimal::from_str("7.25").unwrap());
        assert_eq!(tx.description, "Coffee");
    }

    #[test]
    fn list_query_parses_filters() {
        let q = ListQuery {
            from_date: Some("2024-01-01".into()),
            category: Some("all".into()),
            search: Some("  ".into()),
            ..ListQuery::default()
        };
        let f = q.into_filter().unwrap();
        assert_eq!(f.from_date, Some(date!(2024 - 01 - 01)));
        assert_eq!(f.category_id, None);
        assert_eq!(f.search, None);

        let bad = ListQuery {
            category: Some("7".into()),
            ..ListQuery::default()
        };
        assert!(bad.into_filter().is_err());
    }
}
