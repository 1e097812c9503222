use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;
use uuid::Uuid;

use super::repo_types::Budget;
use crate::{
    calendar::{month_end, month_start},
    categories::repo_types::Category,
    money::percentage,
    transactions::repo_types::Transaction,
};

pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
pub const UNCATEGORIZED_ICON: &str = "more_horiz";

/// Budget with its spending this month.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    #[serde(flatten)]
    pub budget: Budget,
    pub category_name: Option<String>,
    pub category_icon: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub current: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max: Decimal,
    pub percentage: i64,
}

/// Compact row for the dashboard widget.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetOverview {
    pub id: Uuid,
    pub category: String,
    pub icon: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub current: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max: Decimal,
    pub percentage: i64,
}

impl From<BudgetSummary> for BudgetOverview {
    fn from(s: BudgetSummary) -> Self {
        Self {
            id: s.budget.id,
            category: s
                .category_name
                .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
            icon: s
                .category_icon
                .unwrap_or_else(|| UNCATEGORIZED_ICON.to_string()),
            current: s.current,
            max: s.max,
            percentage: s.percentage,
        }
    }
}

/// Current-month expense totals per budget category. Uncategorized budgets track nothing.
pub fn summarize(
    budgets: Vec<Budget>,
    categories: &[Category],
    txs: &[Transaction],
    today: Date,
) -> Vec<BudgetSummary> {
    let (first, last) = (month_start(today), month_end(today));
    budgets
        .into_iter()
        .map(|budget| {
            let category = budget
                .category_id
                .and_then(|id| categories.iter().find(|c| c.id == id));
            let current: Decimal = match budget.category_id {
                Some(id) => txs
                    .iter()
                    .filter(|t| {
                        !t.is_income
                            && t.category_id == Some(id)
                            && t.date >= first
                            && t.date <= last
                    })
                    .map(|t| t.amount)
                    .sum(),
                None => Decimal::ZERO,
            };
            BudgetSummary {
                category_name: category.map(|c| c.name.clone()),
                category_icon: category.map(|c| c.icon.clone()),
                max: budget.amount,
                percentage: percentage(current, budget.amount),
                current,
                budget,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 03 - 20);

    fn budget(category_id: Option<Uuid>, amount: i64) -> Budget {
        Budget {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            category_id,
            amount: Decimal::from(amount),
            period: "monthly".into(),
            start_date: date!(2024 - 01 - 01),
            end_date: None,
        }
    }

    fn spend(category_id: Option<Uuid>, amount: i64, date: Date, is_income: bool) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            category_id,
            amount: Decimal::from(amount),
            description: "t".into(),
            date,
            is_income,
        }
    }

    #[test]
    fn sums_this_months_expenses_in_category() {
        let dining = Category {
            id: Uuid::new_v4(),
            user_id: None,
            name: "Dining".into(),
            icon: "restaurant".into(),
            color: "#AB47BC".into(),
            is_income: false,
        };
        let txs = vec![
            spend(Some(dining.id), 30, date!(2024 - 03 - 02), false),
            spend(Some(dining.id), 45, date!(2024 - 03 - 19), false),
            spend(Some(dining.id), 500, date!(2024 - 02 - 19), false),
            spend(Some(dining.id), 7, date!(2024 - 03 - 19), true),
            spend(None, 60, date!(2024 - 03 - 19), false),
        ];
        let out = summarize(
            vec![budget(Some(dining.id), 200), budget(None, 0)],
            &[dining],
            &txs,
            TODAY,
        );

        assert_eq!(out[0].current, Decimal::from(75));
        assert_eq!(out[0].percentage, 38); // 37.5
        assert_eq!(out[0].category_icon.as_deref(), Some("restaurant"));
        assert_eq!(out[1].current, Decimal::ZERO);
        assert_eq!(out[1].percentage, 0);

        let overview = BudgetOverview::from(out[1].clone());
        assert_eq!(overview.category, UNCATEGORIZED_LABEL);
        assert_eq!(overview.icon, UNCATEGORIZED_ICON);

        let json = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(json["amount"], "200");
        assert_eq!(json["max"], 200.0);
        assert_eq!(json["categoryName"], "Dining");
    }
}
