use time::Date;
use tracing::debug;

use super::{
    categorize::{categorize, find_by_name},
    parser::{detect_format, parse_rows, BankFormat, ColumnMap},
    repo_types::{CsvImportSetting, KeywordRules},
};
use crate::{
    categories::repo_types::Category, error::ApiError,
    transactions::repo_types::NewTransaction,
};

pub const CUSTOM_FORMAT: &str = "custom";

/// Column layout requested by the import form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatChoice {
    Auto,
    Bank(BankFormat),
    /// The user's saved column mapping.
    Custom,
}

impl FormatChoice {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        match raw.trim() {
            "" | "auto" => Ok(Self::Auto),
            CUSTOM_FORMAT => Ok(Self::Custom),
            other => BankFormat::from_name(other)
                .map(Self::Bank)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown CSV format '{other}'"))),
        }
    }
}

/// Options read from the import form.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub format: FormatChoice,
    pub skip_header: bool,
    pub categorize: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            format: FormatChoice::Auto,
            skip_header: true,
            categorize: true,
        }
    }
}

#[derive(Debug)]
pub struct ImportPlan {
    /// Name of the layout actually used.
    pub format: &'static str,
    pub rows: Vec<NewTransaction>,
    pub skipped: usize,
}

/// Turns statement text into transactions ready to insert.
pub fn plan_import(
    text: &str,
    opts: ImportOptions,
    categories: &[Category],
    saved: Option<&CsvImportSetting>,
    today: Date,
) -> Result<ImportPlan, ApiError> {
    let (format, map) = match opts.format {
        FormatChoice::Bank(f) => (f.as_str(), ColumnMap::for_format(f)),
        FormatChoice::Auto => {
            let f = detect_format(text);
            (f.as_str(), ColumnMap::for_format(f))
        }
        FormatChoice::Custom => match saved.and_then(|s| s.column_mapping.as_ref()) {
            Some(map) => (CUSTOM_FORMAT, map.0.clone()),
            None => {
                debug!("no saved column mapping; using the generic layout");
                let f = BankFormat::Generic;
                (f.as_str(), ColumnMap::for_format(f))
            }
        },
    };

    let empty = KeywordRules::new();
    let rules = saved
        .and_then(|s| s.auto_categories.as_ref())
        .map(|r| &r.0)
        .unwrap_or(&empty);

    let parsed = parse_rows(text, &map, opts.skip_header, today)?;
    let rows = parsed
        .rows
        .into_iter()
        .map(|row| {
            let named = row
                .category
                .as_deref()
                .and_then(|name| find_by_name(categories, name))
                .map(|c| c.id);
            let category_id = named.or_else(|| {
                opts.categorize
                    .then(|| categorize(&row.description, row.is_income, categories, rules))
                    .flatten()
            });
            NewTransaction {
                category_id,
                amount: row.amount,
                description: row.description,
                date: row.date,
                is_income: row.is_income,
            }
        })
        .collect();

    Ok(ImportPlan {
        format,
        rows,
        skipped: parsed.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;
    use std::str::FromStr;
    use rust_decimal::Decimal;
    use time::macros::date;
    use uuid::Uuid;

    const TODAY: Date = date!(2024 - 06 - 15);

    fn categories() -> Vec<Category> {
        [("Income", true), ("Dining", false), ("Pets", false)]
            .into_iter()
            .map(|(name, is_income)| Category {
                id: Uuid::new_v4(),
                user_id: None,
                name: name.into(),
                icon: "label".into(),
                color: "#000000".into(),
                is_income,
            })
            .collect()
    }

    #[test]
    fn format_choice_names() {
        assert_eq!(FormatChoice::parse("").unwrap(), FormatChoice::Auto);
        assert_eq!(FormatChoice::parse("custom").unwrap(), FormatChoice::Custom);
        assert_eq!(
            FormatChoice::parse("wells_fargo").unwrap(),
            FormatChoice::Bank(BankFormat::WellsFargo)
        );
        assert!(FormatChoice::parse("mint").is_err());
    }

    #[test]
    fn auto_detects_and_categorizes() {
        let cats = categories();
        let text = "Post Date,Description,Amount\n\
                    01/02/2024,Blue Bottle Coffee,-4.50\n\
                    01/03/2024,Salary,1000\n\
                    01/04/2024,Transfer,-20\n";
        let plan = plan_import(text, ImportOptions::default(), &cats, None, TODAY).unwrap();
        assert_eq!(plan.format, "chase");
        assert_eq!(plan.rows.len(), 3);
        assert_eq!(plan.rows[0].category_id, Some(cats[1].id));
        assert_eq!(plan.rows[0].amount, Decimal::from_str("4.50").unwrap());
        assert_eq!(plan.rows[1].category_id, Some(cats[0].id));
        assert!(plan.rows[1].is_income);
        assert_eq!(plan.rows[2].category_id, None);
    }

    #[test]
    fn categorize_off_keeps_explicit_category_column() {
        let cats = categories();
        let text = "date,description,amount,category\n\
                    2024-01-02,Coffee,-3,\n\
                    2024-01-03,Vet,-80,pets\n";
        let opts = ImportOptions {
            categorize: false,
            ..ImportOptions::default()
        };
        let plan = plan_import(text, opts, &cats, None, TODAY).unwrap();
        assert_eq!(plan.format, "generic");
        assert_eq!(plan.rows[0].category_id, None);
        assert_eq!(plan.rows[1].category_id, Some(cats[2].id));
    }

    #[test]
    fn custom_uses_saved_mapping_and_rules() {
        let cats = categories();
        let user = Uuid::new_v4();
        let mut rules = KeywordRules::new();
        rules.insert("Pets".into(), vec!["chewy".into()]);
        let saved = CsvImportSetting {
            column_mapping: Some(Json(ColumnMap {
                date: "When".into(),
                description: "What".into(),
                amount: "How Much".into(),
                category: None,
            })),
            auto_categories: Some(Json(rules)),
            ..CsvImportSetting::empty(user)
        };
        let text = "When,What,How Much\n2024-02-01,CHEWY.COM,-35.10\n";
        let opts = ImportOptions {
            format: FormatChoice::Custom,
            ..ImportOptions::default()
        };
        let plan = plan_import(text, opts, &cats, Some(&saved), TODAY).unwrap();
        assert_eq!(plan.format, "custom");
        assert_eq!(plan.rows[0].category_id, Some(cats[2].id));
        assert_eq!(plan.rows[0].date, date!(2024 - 02 - 01));

        // Without a saved mapping, custom falls back to the generic layout.
        let plan = plan_import("date,description,amount\n2024-02-01,x,-1\n", opts, &cats, None, TODAY)
            .unwrap();
        assert_eq!(plan.format, "generic");
        assert_eq!(plan.rows.len(), 1);
    }
}
