//! Bank statement parsing: format sniffing, column lookup, amount and date
//! normalization.

use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, Month};

use crate::{error::ApiError, money};

pub const DEFAULT_DESCRIPTION: &str = "Imported transaction";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    Chase,
    BankOfAmerica,
    WellsFargo,
    Generic,
}

impl BankFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chase => "chase",
            Self::BankOfAmerica => "bank_of_america",
            Self::WellsFargo => "wells_fargo",
            Self::Generic => "generic",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "chase" => Some(Self::Chase),
            "bank_of_america" => Some(Self::BankOfAmerica),
            "wells_fargo" => Some(Self::WellsFargo),
            "generic" => Some(Self::Generic),
            _ => None,
        }
    }
}

/// Guesses the bank from the first non-blank line of the file.
pub fn detect_format(text: &str) -> BankFormat {
    let first = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default()
        .to_lowercase();
    if first.contains("chase") || first.contains("post date") {
        BankFormat::Chase
    } else if first.contains("bank of america") || first.contains("boa") {
        BankFormat::BankOfAmerica
    } else if first.contains("wells fargo") || first.contains("wells") {
        BankFormat::WellsFargo
    } else {
        BankFormat::Generic
    }
}

/// Header names of the columns an import reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub date: String,
    pub description: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ColumnMap {
    pub fn for_format(format: BankFormat) -> Self {
        let (date, description, amount, category) = match format {
            BankFormat::Chase => ("Post Date", "Description", "Amount", None),
            BankFormat::BankOfAmerica => ("Date", "Payee", "Amount", None),
            BankFormat::WellsFargo => ("Date", "Description", "Amount", None),
            BankFormat::Generic => ("date", "description", "amount", Some("category")),
        };
        Self {
            date: date.into(),
            description: description.into(),
            amount: amount.into(),
            category: category.map(Into::into),
        }
    }
}

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("CSV file is empty")]
    Empty,

    #[error("CSV header has no '{0}' column")]
    MissingColumn(String),

    #[error("malformed CSV: {0}")]
    Malformed(#[from] csv::Error),
}

impl From<CsvError> for ApiError {
    fn from(e: CsvError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

/// One statement line, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub date: Date,
    pub description: String,
    /// Non-negative magnitude.
    pub amount: Decimal,
    pub is_income: bool,
    /// Raw value of the category column, when the map has one.
    pub category: Option<String>,
}

#[derive(Debug, Default)]
pub struct ParsedCsv {
    pub rows: Vec<CsvRow>,
    /// Data lines dropped because their amount could not be read.
    pub skipped: usize,
}

struct Columns {
    date: Option<usize>,
    description: Option<usize>,
    amount: usize,
    category: Option<usize>,
}

impl Columns {
    fn locate(header: &StringRecord, map: &ColumnMap) -> Result<Self, CsvError> {
        let find = |name: &str| {
            let name = name.trim().to_lowercase();
            header.iter().position(|h| h.trim().to_lowercase() == name)
        };
        Ok(Self {
            date: find(&map.date),
            description: find(&map.description),
            amount: find(&map.amount).ok_or_else(|| CsvError::MissingColumn(map.amount.clone()))?,
            category: map.category.as_deref().and_then(find),
        })
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

/// Parses every data line of `text` using `map` to locate columns.
///
/// The first non-blank line always names the columns. With `skip_header`
/// unset it is also fed through as data (and normally skipped, since its
/// amount cell is not a number).
pub fn parse_rows(
    text: &str,
    map: &ColumnMap,
    skip_header: bool,
    today: Date,
) -> Result<ParsedCsv, CsvError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        if !is_blank(&record) {
            records.push(record);
        }
    }
    let header = records.first().ok_or(CsvError::Empty)?;
    let cols = Columns::locate(header, map)?;

    let data = if skip_header { &records[1..] } else { &records[..] };
    let mut parsed = ParsedCsv::default();
    for record in data {
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();

        let Some(signed) = parse_amount(cell(Some(cols.amount))) else {
            parsed.skipped += 1;
            continue;
        };
        let Ok(amount) = money::validate_amount("amount", signed.abs()) else {
            parsed.skipped += 1;
            continue;
        };
        let description = match cell(cols.description) {
            "" => DEFAULT_DESCRIPTION.to_string(),
            d => d.to_string(),
        };
        let category = match cell(cols.category) {
            "" => None,
            c => Some(c.to_string()),
        };
        parsed.rows.push(CsvRow {
            date: parse_date(cell(cols.date), today),
            description,
            amount,
            is_income: signed > Decimal::ZERO,
            category,
        });
    }
    Ok(parsed)
}

/// Reads a signed amount such as `-1,234.50`, `$12`, `+3` or `(45.00)`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    let (negated, body) = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, cleaned.as_str()),
    };
    let body = body.strip_prefix('+').unwrap_or(body);
    if body.is_empty() {
        return None;
    }
    let value = Decimal::from_str(body).ok()?;
    Some(if negated { -value } else { value })
}

/// Reads `YYYY-MM-DD` or `MM/DD/YYYY` (`-`, `/` and `.` separators, two-digit
/// years meaning 20xx). Anything else yields `today`.
pub fn parse_date(raw: &str, today: Date) -> Date {
    let raw = raw.split_whitespace().next().unwrap_or("");
    let parts: Vec<&str> = raw.split(['/', '-', '.']).map(str::trim).collect();
    let [a, b, c] = parts.as_slice() else {
        return today;
    };
    let (year, month, day) = if a.len() == 4 {
        (*a, *b, *c)
    } else {
        (*c, *a, *b)
    };
    let year = match year.parse::<i32>() {
        Ok(y) if year.len() == 2 => 2000 + y,
        Ok(y) if year.len() == 4 => y,
        _ => return today,
    };
    let (Ok(month), Ok(day)) = (month.parse::<u8>(), day.parse::<u8>()) else {
        return today;
    };
    let Ok(month) = Month::try_from(month) else {
        return today;
    };
    Date::from_calendar_date(year, month, day).unwrap_or(today)
}
