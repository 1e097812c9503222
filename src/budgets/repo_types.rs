use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    pub period: String, // monthly, weekly, ...
    pub start_date: Date,
    pub end_date: Option<Date>,
}

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    pub period: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
}
