use time::{macros::format_description, Date, Duration, OffsetDateTime};

use crate::error::ApiError;

/// Current calendar date in UTC.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn month_start(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

pub fn month_end(date: Date) -> Date {
    let days = date.month().length(date.year());
    date + Duration::days(i64::from(days - date.day()))
}

/// First day of the month `n` months before the month containing `date`.
pub fn months_back(date: Date, n: u32) -> Date {
    let mut start = month_start(date);
    for _ in 0..n {
        start = month_start(start - Duration::days(1));
    }
    start
}

/// Short English month name, e.g. `Jan`.
pub fn month_label(date: Date) -> String {
    date.month().to_string().chars().take(3).collect()
}

/// Reads an optional `YYYY-MM-DD` query parameter; blank means absent.
pub fn query_date(field: &str, raw: Option<&str>) -> Result<Option<Date>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => Date::parse(s, format_description!("[year]-[month]-[day]"))
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{field} must be a YYYY-MM-DD date"))),
    }
}
