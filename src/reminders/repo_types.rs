use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

/// Upcoming bill.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub amount: Option<Decimal>,
    pub due_date: Date,
    pub is_recurring: bool,
    pub frequency: Option<String>,
    pub category_id: Option<Uuid>,
    pub notification_sent: bool,
}

#[derive(Debug, Clone)]
pub struct NewReminder {
    pub title: String,
    pub amount: Option<Decimal>,
    pub due_date: Date,
    pub is_recurring: bool,
    pub frequency: Option<String>,
    pub category_id: Option<Uuid>,
}
