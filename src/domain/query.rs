//! Expense history queries
//!
//! Filtering, ordering and aggregation over one user's expenses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::expense::{Expense, ExpenseType};
use super::money::MonetaryAmount;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Value,
    #[default]
    CreatedAt,
    Type,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filters and ordering for a history listing. Defaults to everything, newest first.
#[derive(Debug, Clone, Default)]
pub struct ExpenseQuery {
    pub expense_type: Option<ExpenseType>,
    /// Calendar day (UTC) of `created_at`
    pub date: Option<NaiveDate>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub sort: SortField,
    pub order: SortOrder,
}

impl ExpenseQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, expense_type: ExpenseType) -> Self {
        self.expense_type = Some(expense_type);
        self
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Inclusive on both ends
    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn sorted_by(mut self, sort: SortField, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        if self.expense_type.is_some_and(|t| t != expense.expense_type) {
            return false;
        }
        if self
            .date
            .is_some_and(|d| d != expense.created_at.date_naive())
        {
            return false;
        }
        if self.from.is_some_and(|from| expense.created_at < from) {
            return false;
        }
        if self.to.is_some_and(|to| expense.created_at > to) {
            return false;
        }
        true
    }

    /// Filter then sort. The sort is stable, so ties keep their input order.
    pub fn apply(&self, expenses: Vec<Expense>) -> Vec<Expense> {
        let mut selected: Vec<Expense> = expenses.into_iter().filter(|e| self.matches(e)).collect();
        selected.sort_by(|a, b| {
            let ordering = compare(self.sort, a, b);
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        selected
    }
}

fn compare(field: SortField, a: &Expense, b: &Expense) -> Ordering {
    match field {
        SortField::Value => a.value.cmp(&b.value),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Type => a.expense_type.as_str().cmp(b.expense_type.as_str()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTotal {
    pub expense_type: ExpenseType,
    pub count: usize,
    pub total: MonetaryAmount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: MonetaryAmount,
}

/// Totals over a set of expenses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseSummary {
    pub count: usize,
    pub total: MonetaryAmount,
    /// One entry per expense type, zero totals included
    pub by_type: Vec<TypeTotal>,
    /// Days with at least one expense, oldest first
    pub daily: Vec<DailyTotal>,
}

pub fn total(expenses: &[Expense]) -> MonetaryAmount {
    expenses.iter().map(|e| e.value.amount()).sum()
}

pub fn summarize(expenses: &[Expense]) -> ExpenseSummary {
    let by_type = ExpenseType::ALL
        .into_iter()
        .map(|expense_type| {
            let matching: Vec<&Expense> = expenses
                .iter()
                .filter(|e| e.expense_type == expense_type)
                .collect();
            TypeTotal {
                expense_type,
                count: matching.len(),
                total: matching.iter().map(|e| e.value.amount()).sum(),
            }
        })
        .collect();

    let mut days: BTreeMap<NaiveDate, MonetaryAmount> = BTreeMap::new();
    for expense in expenses {
        let entry = days.entry(expense.created_at.date_naive()).or_default();
        *entry = entry.saturating_add(expense.value.amount());
    }
    let daily = days
        .into_iter()
        .map(|(date, total)| DailyTotal { date, total })
        .collect();

    ExpenseSummary {
        count: expenses.len(),
        total: total(expenses),
        by_type,
        daily,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::expense::{ExpenseValue, NewExpense};
    use chrono::TimeZone;

    fn expense(description: &str, cents: u64, expense_type: ExpenseType, at: DateTime<Utc>) -> Expense {
        let value = ExpenseValue::new(MonetaryAmount::from_cents(cents)).unwrap();
        NewExpense::new(description, value, expense_type)
            .unwrap()
            .into_expense("ana@example.com", "api-request", at)
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn fixture() -> Vec<Expense> {
        vec![
            expense("Lunch", 3_500, ExpenseType::Food, at(1, 12)),
            expense("Bus", 450, ExpenseType::Transport, at(1, 18)),
            expense("Book", 8_990, ExpenseType::Study, at(2, 9)),
            expense("Cinema", 3_000, ExpenseType::Fun, at(3, 20)),
            expense("Dinner", 6_000, ExpenseType::Food, at(3, 21)),
        ]
    }

    fn descriptions(expenses: &[Expense]) -> Vec<&str> {
        expenses.iter().map(|e| e.description.as_str()).collect()
    }

    #[test]
    fn test_default_is_newest_first() {
        let result = ExpenseQuery::new().apply(fixture());
        assert_eq!(
            descriptions(&result),
            ["Dinner", "Cinema", "Book", "Bus", "Lunch"]
        );
    }

    #[test]
    fn test_filter_by_type() {
        let result = ExpenseQuery::new()
            .with_type(ExpenseType::Food)
            .apply(fixture());
        assert_eq!(descriptions(&result), ["Dinner", "Lunch"]);
    }

    #[test]
    fn test_filter_by_date() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let result = ExpenseQuery::new().on_date(day).apply(fixture());
        assert_eq!(descriptions(&result), ["Bus", "Lunch"]);
    }

    #[test]
    fn test_filter_by_range_is_inclusive() {
        let result = ExpenseQuery::new()
            .between(at(1, 18), at(3, 20))
            .sorted_by(SortField::CreatedAt, SortOrder::Asc)
            .apply(fixture());
        assert_eq!(descriptions(&result), ["Bus", "Book", "Cinema"]);
    }

    #[test]
    fn test_sort_by_value() {
        let asc = ExpenseQuery::new()
            .sorted_by(SortField::Value, SortOrder::Asc)
            .apply(fixture());
        assert_eq!(
            descriptions(&asc),
            ["Bus", "Cinema", "Lunch", "Dinner", "Book"]
        );

        let desc = ExpenseQuery::new()
            .sorted_by(SortField::Value, SortOrder::Desc)
            .apply(fixture());
        assert_eq!(desc.first().unwrap().description, "Book");
    }

    #[test]
    fn test_sort_by_type_is_alphabetical_and_stable() {
        let result = ExpenseQuery::new()
            .sorted_by(SortField::Type, SortOrder::Asc)
            .apply(fixture());
        assert_eq!(
            descriptions(&result),
            ["Lunch", "Dinner", "Cinema", "Book", "Bus"]
        );
    }

    #[test]
    fn test_summary() {
        let summary = summarize(&fixture());

        assert_eq!(summary.count, 5);
        assert_eq!(summary.total, MonetaryAmount::from_cents(21_940));

        let food = summary
            .by_type
            .iter()
            .find(|t| t.expense_type == ExpenseType::Food)
            .unwrap();
        assert_eq!(food.count, 2);
        assert_eq!(food.total, MonetaryAmount::from_cents(9_500));

        let other = summary
            .by_type
            .iter()
            .find(|t| t.expense_type == ExpenseType::Other)
            .unwrap();
        assert_eq!(other.count, 0);
        assert!(other.total.is_zero());

        assert_eq!(
            summary.daily,
            vec![
                DailyTotal {
                    date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                    total: MonetaryAmount::from_cents(3_950),
                },
                DailyTotal {
                    date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
                    total: MonetaryAmount::from_cents(8_990),
                },
                DailyTotal {
                    date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
                    total: MonetaryAmount::from_cents(9_000),
                },
            ]
        );
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = summarize(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.total.is_zero());
        assert_eq!(summary.by_type.len(), ExpenseType::ALL.len());
        assert!(summary.daily.is_empty());
    }
}
