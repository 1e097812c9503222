//! Dashboard rollups. Everything here is a pure function of the user's
//! transactions and the current date.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;
use uuid::Uuid;

use crate::{
    calendar::{month_end, month_label, month_start, months_back},
    categories::repo_types::{Category, UNCATEGORIZED_COLOR, UNCATEGORIZED_NAME},
    money::percentage,
    transactions::repo_types::Transaction,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(with = "rust_decimal::serde::float")]
    pub current_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTrend {
    pub month: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    pub name: String,
    /// Whole percent of the month's spending.
    pub value: i64,
    pub color: String,
}

/// `timeRange` query value to a number of months.
pub fn months_for_range(range: Option<&str>) -> u32 {
    match range {
        Some("6M") => 6,
        Some("1Y") => 12,
        _ => 3,
    }
}

/// (income, expenses) totals.
fn sums<'a>(txs: impl IntoIterator<Item = &'a Transaction>) -> (Decimal, Decimal) {
    txs.into_iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(inc, exp), t| {
            if t.is_income {
                (inc + t.amount, exp)
            } else {
                (inc, exp + t.amount)
            }
        })
}

pub fn balance(txs: &[Transaction], today: Date) -> Balance {
    let (all_in, all_out) = sums(txs);
    let first = month_start(today);
    let (income, expenses) = sums(txs.iter().filter(|t| t.date >= first));
    Balance {
        current_balance: all_in - all_out,
        income,
        expenses,
    }
}

/// One entry per month for the last `months` months, oldest first.
pub fn spending_trends(txs: &[Transaction], today: Date, months: u32) -> Vec<MonthTrend> {
    (0..months)
        .rev()
        .map(|back| {
            let start = months_back(today, back);
            let end = month_end(start);
            let (income, expenses) = sums(txs.iter().filter(|t| t.date >= start && t.date <= end));
            MonthTrend {
                month: month_label(start),
                income,
                expenses,
            }
        })
        .collect()
}

/// Share of this month's spending per expense category.
pub fn category_spending(
    txs: &[Transaction],
    categories: &[Category],
    today: Date,
) -> Vec<CategorySlice> {
    let (first, last) = (month_start(today), month_end(today));
    let spent: Vec<&Transaction> = txs
        .iter()
        .filter(|t| !t.is_income && t.date >= first && t.date <= last)
        .collect();
    let total: Decimal = spent.iter().map(|t| t.amount).sum();
    let expense_categories = categories.iter().filter(|c| !c.is_income);

    if total.is_zero() {
        return expense_categories
            .map(|c| CategorySlice {
                name: c.name.clone(),
                value: 0,
                color: c.color.clone(),
            })
            .collect();
    }

    let mut by_category: HashMap<Uuid, Decimal> = HashMap::new();
    let mut uncategorized = Decimal::ZERO;
    for t in &spent {
        match t.category_id {
            Some(id) => *by_category.entry(id).or_default() += t.amount,
            None => uncategorized += t.amount,
        }
    }

    let mut slices: Vec<(String, String, Decimal)> = expense_categories
        .filter_map(|c| {
            by_category
                .get(&c.id)
                .filter(|sum| **sum > Decimal::ZERO)
                .map(|sum| (c.name.clone(), c.color.clone(), *sum))
        })
        .collect();

    // Spending under income or unknown categories gets no slice.
    if uncategorized > Decimal::ZERO {
        match slices.iter_mut().find(|(name, _, _)| name == UNCATEGORIZED_NAME) {
            Some((_, _, sum)) => *sum += uncategorized,
            None => slices.push((
                UNCATEGORIZED_NAME.to_string(),
                UNCATEGORIZED_COLOR.to_string(),
                uncategorized,
            )),
        }
    }

    slices
        .into_iter()
        .map(|(name, color, sum)| CategorySlice {
            name,
            value: percentage(sum, total),
            color,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 03 - 20);

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tx(amount: &str, date: Date, is_income: bool, category_id: Option<Uuid>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            category_id,
            amount: d(amount),
            description: "t".into(),
            date,
            is_income,
        }
    }

    fn category(name: &str, color: &str, is_income: bool) -> Category {
        Category {
            id: Uuid::new_v4(),
            user_id: None,
            name: name.into(),
            icon: "label".into(),
            color: color.into(),
            is_income,
        }
    }

    #[test]
    fn time_ranges() {
        assert_eq!(months_for_range(None), 3);
        assert_eq!(months_for_range(Some("6M")), 6);
        assert_eq!(months_for_range(Some("1Y")), 12);
        assert_eq!(months_for_range(Some("5Y")), 3);
    }

    #[test]
    fn balance_splits_all_time_and_this_month() {
        let txs = vec![
            tx("1000", date!(2024 - 02 - 01), true, None),
            tx("200.50", date!(2024 - 02 - 10), false, None),
            tx("500", date!(2024 - 03 - 01), true, None),
            tx("99.50", date!(2024 - 03 - 19), false, None),
        ];
        let b = balance(&txs, TODAY);
        assert_eq!(b.current_balance, d("1200"));
        assert_eq!(b.income, d("500"));
        assert_eq!(b.expenses, d("99.50"));

        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["currentBalance"], 1200.0);
        assert_eq!(json["expenses"], 99.5);
    }

    #[test]
    fn trends_are_oldest_first_and_bounded_by_month() {
        let txs = vec![
            tx("10", date!(2024 - 01 - 31), false, None),
            tx("20", date!(2024 - 02 - 01), false, None),
            tx("30", date!(2024 - 02 - 29), true, None),
            tx("40", date!(2023 - 12 - 31), false, None),
        ];
        let trends = spending_trends(&txs, TODAY, 3);
        let months: Vec<_> = trends.iter().map(|t| t.month.as_str()).collect();
        assert_eq!(months, ["Jan", "Feb", "Mar"]);
        assert_eq!(trends[0].expenses, d("10"));
        assert_eq!((trends[1].income, trends[1].expenses), (d("30"), d("20")));
        assert_eq!((trends[2].income, trends[2].expenses), (Decimal::ZERO, Decimal::ZERO));
    }

    #[test]
    fn single_category_month_is_one_hundred_percent() {
        let dining = category("Dining", "#AB47BC", false);
        let txs = vec![
            tx("12", date!(2024 - 03 - 02), false, Some(dining.id)),
            tx("8", date!(2024 - 03 - 05), false, Some(dining.id)),
            tx("500", date!(2024 - 02 - 05), false, None),
        ];
        let slices = category_spending(&txs, &[dining.clone()], TODAY);
        assert_eq!(
            slices,
            vec![CategorySlice {
                name: "Dining".into(),
                value: 100,
                color: "#AB47BC".into()
            }]
        );
    }

    #[test]
    fn uncategorized_spending_is_reported_as_other() {
        let income = category("Income", "#66BB6A", true);
        let dining = category("Dining", "#AB47BC", false);
        let housing = category("Housing", "#1976D2", false);
        let txs = vec![
            tx("25", date!(2024 - 03 - 02), false, Some(dining.id)),
            tx("50", date!(2024 - 03 - 03), false, None),
            tx("25", date!(2024 - 03 - 04), false, Some(Uuid::new_v4())),
            tx("900", date!(2024 - 03 - 04), true, Some(income.id)),
        ];
        let slices = category_spending(&txs, &[income, dining, housing], TODAY);
        let view: Vec<_> = slices.iter().map(|s| (s.name.as_str(), s.value)).collect();
        assert_eq!(view, [("Dining", 25), ("Other", 50)]);
        assert_eq!(slices[1].color, UNCATEGORIZED_COLOR);
    }

    #[test]
    fn expense_under_income_category_is_not_other() {
        let income = category("Income", "#66BB6A", true);
        let dining = category("Dining", "#AB47BC", false);
        let txs = vec![
            tx("50", date!(2024 - 03 - 02), false, Some(dining.id)),
            tx("50", date!(2024 - 03 - 03), false, Some(income.id)),
        ];
        let slices = category_spending(&txs, &[income, dining], TODAY);
        let view: Vec<_> = slices.iter().map(|s| (s.name.as_str(), s.value)).collect();
        assert_eq!(view, [("Dining", 50)]);
    }

    #[test]
    fn uncategorized_folds_into_existing_other_category() {
        let other = category("Other", "#78909C", false);
        let txs = vec![
            tx("10", date!(2024 - 03 - 02), false, Some(other.id)),
            tx("30", date!(2024 - 03 - 03), false, None),
        ];
        let slices = category_spending(&txs, &[other], TODAY);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].value, 100);
    }

    #[test]
    fn empty_month_lists_every_expense_category_at_zero() {
        let cats = [
            category("Income", "#66BB6A", true),
            category("Dining", "#AB47BC", false),
            category("Housing", "#1976D2", false),
        ];
        let slices = category_spending(&[], &cats, TODAY);
        let view: Vec<_> = slices.iter().map(|s| (s.name.as_str(), s.value)).collect();
        assert_eq!(view, [("Dining", 0), ("Housing", 0)]);
    }
}
