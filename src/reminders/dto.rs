use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use super::repo_types::{NewReminder, Reminder};
use crate::{
    error::ApiError,
    extract::{nullable, required_text},
    money::validate_amount,
};

pub const DEFAULT_UPCOMING_DAYS: u32 = 7;
pub const MAX_UPCOMING_DAYS: u32 = 366;

fn optional_amount(value: Option<Decimal>) -> Result<Option<Decimal>, ApiError> {
    value.map(|v| validate_amount("amount", v)).transpose()
}

/// Blank frequencies are stored as null.
fn clean_frequency(value: Option<String>) -> Option<String> {
    value
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReminder {
    pub title: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
    pub due_date: Date,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

impl CreateReminder {
    pub fn validate(self) -> Result<NewReminder, ApiError> {
        Ok(NewReminder {
            title: required_text("title", &self.title)?,
            amount: optional_amount(self.amount)?,
            due_date: self.due_date,
            is_recurring: self.is_recurring,
            frequency: clean_frequency(self.frequency),
            category_id: self.category_id,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchReminder {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub amount: Option<Option<Decimal>>,
    pub due_date: Option<Date>,
    pub is_recurring: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub frequency: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<Uuid>>,
    pub notification_sent: Option<bool>,
}

impl PatchReminder {
    /// A moved due date re-arms the notification unless the patch sets the flag itself.
    pub fn apply(self, r: &mut Reminder) -> Result<(), ApiError> {
        if let Some(title) = self.title {
            r.title = required_text("title", &title)?;
        }
        if let Some(amount) = self.amount {
            r.amount = optional_amount(amount)?;
        }
        if let Some(due) = self.due_date {
            if due != r.due_date {
                r.notification_sent = false;
            }
            r.due_date = due;
        }
        if let Some(recurring) = self.is_recurring {
            r.is_recurring = recurring;
        }
        if let Some(frequency) = self.frequency {
            r.frequency = clean_frequency(frequency);
        }
        if let Some(category_id) = self.category_id {
            r.category_id = category_id;
        }
        if let Some(sent) = self.notification_sent {
            r.notification_sent = sent;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<String>,
}

impl UpcomingQuery {
    pub fn days(&self) -> Result<u32, ApiError> {
        match self.days.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(DEFAULT_UPCOMING_DAYS),
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|d| *d <= MAX_UPCOMING_DAYS)
                .ok_or_else(|| {
                    ApiError::BadRequest(format!(
                        "days must be a whole number between 0 and {MAX_UPCOMING_DAYS}"
                    ))
                }),
        }
    }
}
