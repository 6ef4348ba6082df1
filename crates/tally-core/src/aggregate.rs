//! Expense aggregation engine
//!
//! Pure functions over slices of expenses. Nothing here knows about budgets:
//! every expense inside the window counts, whatever budgets exist.
//! Amounts in different currencies are summed as-is. Sums saturate at
//! `i64::MAX` instead of overflowing.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{BudgetPeriod, CategoryTag, Expense, PeriodWindow};

/// Totals over a set of expenses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub total_minor: i64,
    /// Per-category sums; categories without expenses are absent
    pub by_category: BTreeMap<CategoryTag, i64>,
    pub count: usize,
}

impl Aggregate {
    /// Category with the largest sum; ties go to the earlier category
    pub fn top_category(&self) -> Option<CategoryTag> {
        self.by_category
            .iter()
            .fold(None, |best: Option<(CategoryTag, i64)>, (&category, &sum)| match best {
                Some((_, best_sum)) if best_sum >= sum => best,
                _ => Some((category, sum)),
            })
            .map(|(category, _)| category)
    }

    /// Mean amount per expense, 0 when there are none
    pub fn average_per_expense(&self) -> i64 {
        if self.count == 0 {
            0
        } else {
            self.total_minor / self.count as i64
        }
    }

    /// Sum for one category (0 when absent)
    pub fn category_total(&self, category: CategoryTag) -> i64 {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    fn add(&mut self, expense: &Expense) {
        self.total_minor = self.total_minor.saturating_add(expense.amount_minor);
        let sum = self.by_category.entry(expense.category).or_insert(0);
        *sum = sum.saturating_add(expense.amount_minor);
        self.count += 1;
    }
}

impl<'a> FromIterator<&'a Expense> for Aggregate {
    fn from_iter<I: IntoIterator<Item = &'a Expense>>(iter: I) -> Self {
        let mut aggregate = Aggregate::default();
        for expense in iter {
            aggregate.add(expense);
        }
        aggregate
    }
}

/// Aggregate the expenses that fall inside `window`
pub fn aggregate(expenses: &[Expense], window: &PeriodWindow) -> Aggregate {
    expenses
        .iter()
        .filter(|e| window.contains(e.occurred_at))
        .collect()
}

/// Aggregate one category inside `window`
pub fn aggregate_category(
    expenses: &[Expense],
    window: &PeriodWindow,
    category: CategoryTag,
) -> Aggregate {
    expenses
        .iter()
        .filter(|e| e.category == category && window.contains(e.occurred_at))
        .collect()
}

/// Monthly, yearly and all-time spending overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpendingStatistics {
    pub monthly_total_minor: i64,
    pub yearly_total_minor: i64,
    pub all_time_total_minor: i64,
    pub monthly_count: usize,
    pub yearly_count: usize,
    pub all_time_count: usize,
    pub monthly_by_category: BTreeMap<CategoryTag, i64>,
    /// Top category of the current month
    pub top_category: Option<CategoryTag>,
}

/// Statistics for the month and year containing `now`, plus all time
pub fn spending_statistics(expenses: &[Expense], now: NaiveDateTime) -> SpendingStatistics {
    let month = aggregate(expenses, &BudgetPeriod::Monthly.window(now));
    let year = aggregate(expenses, &BudgetPeriod::Yearly.window(now));
    let all_time: Aggregate = expenses.iter().collect();

    SpendingStatistics {
        monthly_total_minor: month.total_minor,
        yearly_total_minor: year.total_minor,
        all_time_total_minor: all_time.total_minor,
        monthly_count: month.count,
        yearly_count: year.count,
        all_time_count: all_time.count,
        top_category: month.top_category(),
        monthly_by_category: month.by_category,
    }
}

/// Expenses whose description or category name contains `query`
/// (case-insensitive)
pub fn search<'a>(expenses: &'a [Expense], query: &str) -> Vec<&'a Expense> {
    let needle = query.trim().to_lowercase();
    expenses
        .iter()
        .filter(|e| {
            e.description.to_lowercase().contains(&needle)
                || e.category.as_str().to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;
    use chrono::{NaiveDate, Utc};

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn expense(id: i64, amount_minor: i64, category: CategoryTag, when: NaiveDateTime) -> Expense {
        Expense {
            id,
            user_id: "u1".into(),
            amount_minor,
            currency: Currency::Inr,
            category,
            description: format!("{} expense {}", category, id),
            occurred_at: when,
            source_text: None,
            created_at: Utc::now(),
        }
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense(1, 50_000, CategoryTag::Food, at(2024, 3, 2)),
            expense(2, 20_000, CategoryTag::Travel, at(2024, 3, 10)),
            expense(3, 30_000, CategoryTag::Food, at(2024, 3, 14)),
            expense(4, 90_000, CategoryTag::Utilities, at(2024, 2, 28)),
            expense(5, 10_000, CategoryTag::Food, at(2023, 12, 31)),
        ]
    }

    #[test]
    fn test_aggregate_month() {
        let expenses = sample();
        let march = PeriodWindow::month_of(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let agg = aggregate(&expenses, &march);

        assert_eq!(agg.total_minor, 100_000);
        assert_eq!(agg.count, 3);
        assert_eq!(agg.category_total(CategoryTag::Food), 80_000);
        assert_eq!(agg.category_total(CategoryTag::Travel), 20_000);
        assert!(!agg.by_category.contains_key(&CategoryTag::Utilities));
        assert_eq!(agg.top_category(), Some(CategoryTag::Food));
        assert_eq!(agg.average_per_expense(), 33_333);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let expenses = sample();
        let window = BudgetPeriod::Yearly.window(at(2024, 6, 1));
        assert_eq!(aggregate(&expenses, &window), aggregate(&expenses, &window));
    }

    #[test]
    fn test_single_category_sum_matches_total() {
        let expenses = sample();
        let window = BudgetPeriod::Yearly.window(at(2024, 6, 1));
        let agg = aggregate_category(&expenses, &window, CategoryTag::Food);
        assert_eq!(agg.by_category.len(), 1);
        assert_eq!(agg.by_category[&CategoryTag::Food], agg.total_minor);
        assert_eq!(agg.count, 2);
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let first = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let expenses = vec![
            expense(1, 100, CategoryTag::Food, first),
            expense(2, 100, CategoryTag::Food, last),
        ];
        let agg = aggregate(&expenses, &BudgetPeriod::Monthly.window(first));
        assert_eq!(agg.count, 2);
    }

    #[test]
    fn test_empty() {
        let agg = aggregate(&[], &BudgetPeriod::Monthly.window(at(2024, 3, 1)));
        assert_eq!(agg, Aggregate::default());
        assert_eq!(agg.top_category(), None);
        assert_eq!(agg.average_per_expense(), 0);
    }

    #[test]
    fn test_top_category_tie_goes_to_earlier() {
        let expenses = vec![
            expense(1, 500, CategoryTag::Travel, at(2024, 3, 1)),
            expense(2, 500, CategoryTag::Entertainment, at(2024, 3, 2)),
        ];
        let agg = aggregate(&expenses, &BudgetPeriod::Monthly.window(at(2024, 3, 1)));
        assert_eq!(agg.top_category(), Some(CategoryTag::Entertainment));
    }

    #[test]
    fn test_spending_statistics() {
        let stats = spending_statistics(&sample(), at(2024, 3, 15));
        assert_eq!(stats.monthly_total_minor, 100_000);
        assert_eq!(stats.monthly_count, 3);
        assert_eq!(stats.yearly_total_minor, 190_000);
        assert_eq!(stats.yearly_count, 4);
        assert_eq!(stats.all_time_total_minor, 200_000);
        assert_eq!(stats.all_time_count, 5);
        assert_eq!(stats.top_category, Some(CategoryTag::Food));
        assert_eq!(stats.monthly_by_category[&CategoryTag::Travel], 20_000);
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let expenses = vec![
            expense(1, i64::MAX, CategoryTag::Food, at(2024, 3, 1)),
            expense(2, i64::MAX, CategoryTag::Food, at(2024, 3, 2)),
        ];
        let agg = aggregate(&expenses, &BudgetPeriod::Monthly.window(at(2024, 3, 1)));
        assert_eq!(agg.total_minor, i64::MAX);
        assert_eq!(agg.category_total(CategoryTag::Food), i64::MAX);
        assert_eq!(agg.count, 2);
    }

    #[test]
    fn test_search() {
        let mut expenses = sample();
        expenses[1].description = "Uber to Airport".into();

        let hits = search(&expenses, "airport");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);

        // Category names match too
        assert_eq!(search(&expenses, "UTILITIES").len(), 1);
        assert!(search(&expenses, "yacht").is_empty());
    }
}
