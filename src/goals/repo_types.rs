use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

/// Savings goal. Completion percentage is derived on read.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub due_date: Option<Date>,
    pub is_completed: bool,
}

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub due_date: Option<Date>,
    pub is_completed: bool,
}
