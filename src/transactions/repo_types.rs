use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

/// A single income or expense. `amount` is always a non-negative magnitude;
/// the direction lives in `is_income`.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    pub description: String,
    pub date: Date,
    pub is_income: bool,
}

/// Transaction joined with its category's display fields.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TransactionWithCategory {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub transaction: Transaction,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub category_icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    pub description: String,
    pub date: Date,
    pub is_income: bool,
}

/// Listing filter; every field is optional and bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub from_date: Option<Date>,
    pub to_date: Option<Date>,
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl TransactionFilter {
    pub fn between(from: Date, to: Date) -> Self {
        Self {
            from_date: Some(from),
            to_date: Some(to),
            ..Self::default()
        }
    }

    /// In-memory equivalent of the SQL `WHERE` clause.
    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.from_date.is_some_and(|from| tx.date < from) {
            return false;
        }
        if self.to_date.is_some_and(|to| tx.date > to) {
            return false;
        }
        if self.category_id.is_some() && tx.category_id != self.category_id {
            return false;
        }
        match &self.search {
            Some(needle) => tx
                .description
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}
