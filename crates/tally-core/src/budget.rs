//! Budget tracker
//!
//! Budget rules (creation, update, soft delete), live status against the
//! aggregation engine, the warning/exceeded decision and recommendations.
//!
//! Status is never cached: every call recomputes from the expenses the
//! store returns, so a status cannot go stale between inserts.

use chrono::{NaiveDateTime, Utc};
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, Aggregate};
use crate::error::{Error, Result};
use crate::models::{
    Budget, BudgetPeriod, BudgetRecommendation, BudgetSignal, BudgetStatus, BudgetUpdate,
    CategoryTag, Currency, Expense, NewBudget, RecommendationKind, SignalKind, MAX_AMOUNT_MINOR,
};
use crate::notify::Notifier;
use crate::store::{BudgetStore, ExpenseStore};

/// Threshold used when a budget is created without one
pub const DEFAULT_THRESHOLD_PCT: u8 = 80;

/// Headroom over current spend for a suggested new budget (percent)
const CREATE_HEADROOM_PCT: i64 = 120;
/// Headroom over current spend for a suggested increase (percent)
const INCREASE_HEADROOM_PCT: i64 = 110;

/// Spend-vs-limit status of one budget at `now`
///
/// Only expenses of the budget's user, category and currency inside the
/// budget's current period window count. Expenses in other currencies are
/// skipped with a debug log; there is no conversion.
pub fn compute_status(budget: &Budget, expenses: &[Expense], now: NaiveDateTime) -> BudgetStatus {
    let window = budget.period.window(now);
    let spent: Aggregate = expenses
        .iter()
        .filter(|e| {
            e.user_id == budget.user_id
                && e.category == budget.category
                && window.contains(e.occurred_at)
        })
        .filter(|e| {
            let same_currency = e.currency == budget.currency;
            if !same_currency {
                debug!(
                    expense_id = e.id,
                    budget_id = budget.id,
                    currency = %e.currency,
                    "Skipping expense in another currency"
                );
            }
            same_currency
        })
        .collect();

    let spent_minor = spent.total_minor;
    let percentage = spent_minor as f64 / budget.limit_minor as f64 * 100.0;

    BudgetStatus {
        budget: budget.clone(),
        spent_minor,
        remaining_minor: budget.limit_minor.saturating_sub(spent_minor),
        percentage,
        is_over_budget: spent_minor > budget.limit_minor,
        should_notify: percentage >= f64::from(budget.notification_threshold_pct),
        expense_count: spent.count,
    }
}

/// Exceeded when over the limit, else Warning at the threshold, else nothing
pub fn decide_signal(status: &BudgetStatus) -> Option<BudgetSignal> {
    let kind = if status.is_over_budget {
        SignalKind::Exceeded
    } else if status.should_notify {
        SignalKind::Warning
    } else {
        return None;
    };

    let budget = &status.budget;
    Some(BudgetSignal {
        kind,
        budget_id: budget.id,
        user_id: budget.user_id.clone(),
        category: budget.category,
        percentage: status.percentage,
        overage_minor: status.remaining_minor.saturating_neg().max(0),
        currency: budget.currency,
    })
}

/// Check a creation request against the user's existing budgets
pub fn validate_new_budget(existing: &[Budget], new: &NewBudget) -> Result<()> {
    check_limit(new.limit_minor)?;
    if let Some(pct) = new.notification_threshold_pct {
        check_threshold(pct)?;
    }

    let duplicate = existing.iter().any(|b| {
        b.active && b.user_id == new.user_id && b.category == new.category && b.period == new.period
    });
    if duplicate {
        return Err(Error::InvalidBudget(format!(
            "Budget already exists for {} ({})",
            new.category, new.period
        )));
    }

    Ok(())
}

fn check_limit(limit_minor: i64) -> Result<()> {
    if limit_minor <= 0 {
        return Err(Error::InvalidBudget(
            "Limit amount must be greater than 0".into(),
        ));
    }
    Ok(())
}

fn check_threshold(pct: u8) -> Result<()> {
    if !(1..=100).contains(&pct) {
        return Err(Error::InvalidBudget(format!(
            "Notification threshold must be between 1 and 100, got {}",
            pct
        )));
    }
    Ok(())
}

/// Round `amount_minor * pct / 100` up to a whole major unit
///
/// Computed in `i128` and capped at [`MAX_AMOUNT_MINOR`].
fn suggested_limit(amount_minor: i64, pct: i64, currency: Currency) -> i64 {
    let factor = i128::from(currency.minor_unit_factor());
    let scaled = (i128::from(amount_minor) * i128::from(pct) + 99) / 100;
    let rounded = (scaled + factor - 1) / factor * factor;
    i64::try_from(rounded.min(i128::from(MAX_AMOUNT_MINOR))).unwrap_or(MAX_AMOUNT_MINOR)
}

/// This month's spend for `category` in `currency`
fn category_spend(expenses: &[Expense], category: CategoryTag, currency: Currency) -> i64 {
    expenses
        .iter()
        .filter(|e| e.category == category && e.currency == currency)
        .fold(0i64, |sum, e| sum.saturating_add(e.amount_minor))
}

/// Budget service over a repository
pub struct BudgetTracker<S> {
    store: S,
    default_threshold_pct: u8,
}

impl<S: BudgetStore + ExpenseStore> BudgetTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            default_threshold_pct: DEFAULT_THRESHOLD_PCT,
        }
    }

    pub fn with_default_threshold(mut self, pct: u8) -> Self {
        self.default_threshold_pct = pct;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a budget after checking limit, threshold and duplicates
    pub fn create_budget(&self, new: NewBudget, now: NaiveDateTime) -> Result<Budget> {
        let existing = self.store.list_budgets(&new.user_id, false)?;
        validate_new_budget(&existing, &new)?;

        let timestamp = Utc::now();
        let budget = self.store.insert_budget(Budget {
            id: 0,
            user_id: new.user_id,
            category: new.category,
            limit_minor: new.limit_minor,
            currency: new.currency,
            period: new.period,
            notification_threshold_pct: new
                .notification_threshold_pct
                .unwrap_or(self.default_threshold_pct),
            active: true,
            start_date: now.date(),
            created_at: timestamp,
            updated_at: timestamp,
        })?;

        info!(
            budget_id = budget.id,
            category = %budget.category,
            period = %budget.period,
            "Budget created"
        );
        Ok(budget)
    }

    /// Apply a partial update
    ///
    /// Reactivating a budget fails when another active budget already holds
    /// its (category, period) slot.
    pub fn update_budget(&self, id: i64, update: BudgetUpdate) -> Result<Budget> {
        let mut budget = self.store.get_budget(id)?;

        if let Some(limit) = update.limit_minor {
            check_limit(limit)?;
            budget.limit_minor = limit;
        }
        if let Some(pct) = update.notification_threshold_pct {
            check_threshold(pct)?;
            budget.notification_threshold_pct = pct;
        }
        if let Some(active) = update.active {
            if active && !budget.active {
                let taken = self
                    .store
                    .list_budgets(&budget.user_id, false)?
                    .iter()
                    .any(|b| b.id != id && b.category == budget.category && b.period == budget.period);
                if taken {
                    return Err(Error::InvalidBudget(format!(
                        "Budget already exists for {} ({})",
                        budget.category, budget.period
                    )));
                }
            }
            budget.active = active;
        }

        budget.updated_at = Utc::now();
        self.store.save_budget(&budget)?;
        Ok(budget)
    }

    /// Soft delete: the budget is kept but marked inactive
    pub fn deactivate_budget(&self, id: i64) -> Result<Budget> {
        let budget = self.update_budget(
            id,
            BudgetUpdate {
                active: Some(false),
                ..Default::default()
            },
        )?;
        info!(budget_id = id, "Budget deactivated");
        Ok(budget)
    }

    pub fn active_budgets(&self, user_id: &str) -> Result<Vec<Budget>> {
        self.store.list_budgets(user_id, false)
    }

    /// Status of one budget, active or not
    pub fn budget_status(&self, id: i64, now: NaiveDateTime) -> Result<BudgetStatus> {
        let budget = self.store.get_budget(id)?;
        self.status_of(&budget, now)
    }

    /// Statuses of every active budget of the user
    pub fn all_statuses(&self, user_id: &str, now: NaiveDateTime) -> Result<Vec<BudgetStatus>> {
        self.active_budgets(user_id)?
            .iter()
            .map(|b| self.status_of(b, now))
            .collect()
    }

    /// Recompute every active budget and hand signals to `notifier`
    ///
    /// Delivery failures are logged and do not stop the remaining budgets.
    /// Returns every signal that was decided.
    pub fn check_and_notify(
        &self,
        user_id: &str,
        now: NaiveDateTime,
        notifier: &dyn Notifier,
    ) -> Result<Vec<BudgetSignal>> {
        let signals: Vec<BudgetSignal> = self
            .all_statuses(user_id, now)?
            .iter()
            .filter_map(decide_signal)
            .collect();

        for signal in &signals {
            info!(
                kind = signal.kind.as_str(),
                budget_id = signal.budget_id,
                percentage = signal.percentage,
                "Budget signal"
            );
            if let Err(e) = notifier.notify(signal) {
                warn!(error = %e, budget_id = signal.budget_id, "Failed to deliver budget signal");
            }
        }

        Ok(signals)
    }

    /// Suggestions from this month's spending
    ///
    /// Categories with spending but no active monthly budget get a create
    /// suggestion at 120% of the spend; categories already over their
    /// monthly budget get an increase suggestion at 110%.
    pub fn recommendations(
        &self,
        user_id: &str,
        now: NaiveDateTime,
    ) -> Result<Vec<BudgetRecommendation>> {
        let window = BudgetPeriod::Monthly.window(now);
        let expenses = self.store.list_expenses(user_id, Some(&window))?;
        let month = aggregate(&expenses, &window);
        let budgets = self.active_budgets(user_id)?;

        let mut recommendations = Vec::new();
        for &category in month.by_category.keys() {
            let monthly = budgets
                .iter()
                .find(|b| b.category == category && b.period == BudgetPeriod::Monthly);

            match monthly {
                None => {
                    let currency = spending_currency(&expenses, category);
                    let spent = category_spend(&expenses, category, currency);
                    if spent <= 0 {
                        continue;
                    }
                    let limit = suggested_limit(spent, CREATE_HEADROOM_PCT, currency);
                    recommendations.push(BudgetRecommendation {
                        category,
                        kind: RecommendationKind::Create,
                        suggested_limit_minor: limit,
                        currency,
                        message: format!(
                            "Consider setting a monthly budget of {} for {}",
                            currency.format_minor(limit),
                            category
                        ),
                    });
                }
                Some(budget) => {
                    let status = compute_status(budget, &expenses, now);
                    if status.is_over_budget {
                        let limit = suggested_limit(
                            status.spent_minor,
                            INCREASE_HEADROOM_PCT,
                            budget.currency,
                        );
                        recommendations.push(BudgetRecommendation {
                            category,
                            kind: RecommendationKind::Increase,
                            suggested_limit_minor: limit,
                            currency: budget.currency,
                            message: format!(
                                "Your {} budget might be too low. Consider increasing to {}",
                                category,
                                budget.currency.format_minor(limit)
                            ),
                        });
                    }
                }
            }
        }

        Ok(recommendations)
    }

    fn status_of(&self, budget: &Budget, now: NaiveDateTime) -> Result<BudgetStatus> {
        let window = budget.period.window(now);
        let expenses = self.store.list_expenses(&budget.user_id, Some(&window))?;
        Ok(compute_status(budget, &expenses, now))
    }
}

/// Currency the user spends in for a category (first match)
fn spending_currency(expenses: &[Expense], category: CategoryTag) -> Currency {
    expenses
        .iter()
        .find(|e| e.category == category)
        .map(|e| e.currency)
        .unwrap_or(Currency::Inr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewExpense;
    use crate::notify::MemoryNotifier;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn new_budget(category: CategoryTag, period: BudgetPeriod) -> NewBudget {
        NewBudget {
            user_id: "u1".into(),
            category,
            limit_minor: 10_000,
            currency: Currency::Inr,
            period,
            notification_threshold_pct: Some(80),
        }
    }

    fn spend(store: &MemoryStore, category: CategoryTag, amount_minor: i64, when: NaiveDateTime) {
        spend_in(store, category, amount_minor, Currency::Inr, when);
    }

    fn spend_in(
        store: &MemoryStore,
        category: CategoryTag,
        amount_minor: i64,
        currency: Currency,
        when: NaiveDateTime,
    ) {
        store
            .insert_expense(NewExpense {
                user_id: "u1".into(),
                amount_minor,
                currency,
                category,
                description: "spend".into(),
                occurred_at: when,
                source_text: None,
            })
            .unwrap();
    }

    fn tracker() -> BudgetTracker<MemoryStore> {
        BudgetTracker::new(MemoryStore::new())
    }

    fn status_for(spent: i64) -> BudgetStatus {
        let t = tracker();
        let budget = t
            .create_budget(new_budget(CategoryTag::Food, BudgetPeriod::Monthly), now())
            .unwrap();
        spend(t.store(), CategoryTag::Food, spent, now());
        t.budget_status(budget.id, now()).unwrap()
    }

    #[test]
    fn test_status_thresholds() {
        let s = status_for(7_500);
        assert_eq!(s.percentage, 75.0);
        assert!(!s.should_notify);
        assert!(!s.is_over_budget);
        assert!(decide_signal(&s).is_none());

        let s = status_for(8_500);
        assert!(s.should_notify);
        assert!(!s.is_over_budget);
        assert_eq!(decide_signal(&s).unwrap().kind, SignalKind::Warning);

        let s = status_for(12_000);
        assert!(s.is_over_budget);
        assert_eq!(s.remaining_minor, -2_000);
        let signal = decide_signal(&s).unwrap();
        assert_eq!(signal.kind, SignalKind::Exceeded);
        assert_eq!(signal.overage_minor, 2_000);
    }

    #[test]
    fn test_status_counts_only_window_category_and_user() {
        let t = tracker();
        let budget = t
            .create_budget(new_budget(CategoryTag::Food, BudgetPeriod::Monthly), now())
            .unwrap();
        spend(t.store(), CategoryTag::Food, 1_000, now());
        spend(t.store(), CategoryTag::Travel, 5_000, now());
        spend(
            t.store(),
            CategoryTag::Food,
            5_000,
            NaiveDate::from_ymd_opt(2024, 2, 29)
                .unwrap()
                .and_hms_opt(23, 0, 0)
                .unwrap(),
        );
        let mut other_user = t.store().list_expenses("u1", None).unwrap()[0].clone();
        other_user.user_id = "u2".into();

        let mut expenses = t.store().list_expenses("u1", None).unwrap();
        expenses.push(other_user);
        let s = compute_status(&budget, &expenses, now());
        assert_eq!(s.spent_minor, 1_000);
        assert_eq!(s.expense_count, 1);
    }

    #[test]
    fn test_status_ignores_other_currencies() {
        let t = tracker();
        let budget = t
            .create_budget(new_budget(CategoryTag::Food, BudgetPeriod::Monthly), now())
            .unwrap();
        spend(t.store(), CategoryTag::Food, 6_000, now());
        // $50 dinner must not count as ₹50
        spend_in(t.store(), CategoryTag::Food, 5_000, Currency::Usd, now());

        let s = t.budget_status(budget.id, now()).unwrap();
        assert_eq!(s.spent_minor, 6_000);
        assert_eq!(s.expense_count, 1);
        assert!(!s.is_over_budget);
        assert!(decide_signal(&s).is_none());
    }

    #[test]
    fn test_status_with_huge_spend_does_not_overflow() {
        let t = tracker();
        let budget = t
            .create_budget(new_budget(CategoryTag::Food, BudgetPeriod::Monthly), now())
            .unwrap();
        spend(t.store(), CategoryTag::Food, i64::MAX, now());
        spend(t.store(), CategoryTag::Food, i64::MAX, now());

        let s = t.budget_status(budget.id, now()).unwrap();
        assert_eq!(s.spent_minor, i64::MAX);
        assert!(s.is_over_budget);
        assert!(decide_signal(&s).unwrap().overage_minor > 0);

        let recs = t.recommendations("u1", now()).unwrap();
        assert_eq!(recs[0].suggested_limit_minor, MAX_AMOUNT_MINOR);
    }

    #[test]
    fn test_duplicate_active_budget_rejected() {
        let t = tracker();
        t.create_budget(new_budget(CategoryTag::Food, BudgetPeriod::Monthly), now())
            .unwrap();

        let err = t
            .create_budget(new_budget(CategoryTag::Food, BudgetPeriod::Monthly), now())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBudget(_)));

        assert!(t
            .create_budget(new_budget(CategoryTag::Travel, BudgetPeriod::Monthly), now())
            .is_ok());
        assert!(t
            .create_budget(new_budget(CategoryTag::Food, BudgetPeriod::Yearly), now())
            .is_ok());
    }

    #[test]
    fn test_invalid_definitions() {
        let mut bad = new_budget(CategoryTag::Food, BudgetPeriod::Monthly);
        bad.limit_minor = 0;
        assert!(matches!(
            validate_new_budget(&[], &bad),
            Err(Error::InvalidBudget(_))
        ));

        let mut bad = new_budget(CategoryTag::Food, BudgetPeriod::Monthly);
        bad.notification_threshold_pct = Some(101);
        assert!(matches!(
            validate_new_budget(&[], &bad),
            Err(Error::InvalidBudget(_))
        ));
    }

    #[test]
    fn test_default_threshold() {
        let t = tracker().with_default_threshold(90);
        let mut request = new_budget(CategoryTag::Food, BudgetPeriod::Monthly);
        request.notification_threshold_pct = None;
        let budget = t.create_budget(request, now()).unwrap();
        assert_eq!(budget.notification_threshold_pct, 90);
        assert_eq!(budget.start_date, now().date());
        assert!(budget.active);
    }

    #[test]
    fn test_deactivate_frees_slot_and_reactivation_conflicts() {
        let t = tracker();
        let first = t
            .create_budget(new_budget(CategoryTag::Food, BudgetPeriod::Monthly), now())
            .unwrap();
        t.deactivate_budget(first.id).unwrap();
        assert!(t.active_budgets("u1").unwrap().is_empty());
        // Kept for history
        assert!(!t.store().get_budget(first.id).unwrap().active);

        t.create_budget(new_budget(CategoryTag::Food, BudgetPeriod::Monthly), now())
            .unwrap();

        let err = t
            .update_budget(
                first.id,
                BudgetUpdate {
                    active: Some(true),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBudget(_)));
    }

    #[test]
    fn test_update_budget() {
        let t = tracker();
        let budget = t
            .create_budget(new_budget(CategoryTag::Food, BudgetPeriod::Monthly), now())
            .unwrap();

        let updated = t
            .update_budget(
                budget.id,
                BudgetUpdate {
                    limit_minor: Some(20_000),
                    notification_threshold_pct: Some(50),
                    active: None,
                },
            )
            .unwrap();
        assert_eq!(updated.limit_minor, 20_000);
        assert_eq!(updated.notification_threshold_pct, 50);

        let err = t
            .update_budget(
                budget.id,
                BudgetUpdate {
                    limit_minor: Some(-1),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBudget(_)));
        assert!(matches!(
            t.update_budget(99, BudgetUpdate::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_check_and_notify() {
        let t = tracker();
        t.create_budget(new_budget(CategoryTag::Food, BudgetPeriod::Monthly), now())
            .unwrap();
        t.create_budget(new_budget(CategoryTag::Travel, BudgetPeriod::Monthly), now())
            .unwrap();
        let idle = t
            .create_budget(new_budget(CategoryTag::Loans, BudgetPeriod::Monthly), now())
            .unwrap();
        spend(t.store(), CategoryTag::Food, 9_000, now());
        spend(t.store(), CategoryTag::Travel, 15_000, now());
        spend(t.store(), CategoryTag::Loans, 50_000, now());
        t.deactivate_budget(idle.id).unwrap();

        let notifier = MemoryNotifier::new();
        let signals = t.check_and_notify("u1", now(), &notifier).unwrap();

        assert_eq!(signals.len(), 2);
        assert_eq!(notifier.signals(), signals);
        let food = signals.iter().find(|s| s.category == CategoryTag::Food).unwrap();
        assert_eq!(food.kind, SignalKind::Warning);
        assert_eq!(food.message(), "You've used 90% of your Food budget");
        let travel = signals.iter().find(|s| s.category == CategoryTag::Travel).unwrap();
        assert_eq!(travel.kind, SignalKind::Exceeded);
        assert_eq!(travel.message(), "You've exceeded your Travel budget by ₹50.00");
    }

    #[test]
    fn test_recommendations() {
        let t = tracker();
        t.create_budget(new_budget(CategoryTag::Travel, BudgetPeriod::Monthly), now())
            .unwrap();
        t.create_budget(new_budget(CategoryTag::Healthcare, BudgetPeriod::Monthly), now())
            .unwrap();
        spend(t.store(), CategoryTag::Food, 50_050, now());
        spend(t.store(), CategoryTag::Travel, 15_000, now());
        spend(t.store(), CategoryTag::Healthcare, 2_000, now());

        let recs = t.recommendations("u1", now()).unwrap();
        assert_eq!(recs.len(), 2);

        let food = &recs[0];
        assert_eq!(food.category, CategoryTag::Food);
        assert_eq!(food.kind, RecommendationKind::Create);
        // 500.50 * 1.2 = 600.60, rounded up to 601
        assert_eq!(food.suggested_limit_minor, 60_100);
        assert_eq!(
            food.message,
            "Consider setting a monthly budget of ₹601.00 for Food"
        );

        let travel = &recs[1];
        assert_eq!(travel.kind, RecommendationKind::Increase);
        assert_eq!(travel.suggested_limit_minor, 16_500);
    }

    #[test]
    fn test_suggested_limit_rounding() {
        assert_eq!(suggested_limit(10_000, 120, Currency::Inr), 12_000);
        assert_eq!(suggested_limit(10_001, 110, Currency::Usd), 11_100);
        assert_eq!(suggested_limit(999, 120, Currency::Jpy), 1_199);
        assert_eq!(suggested_limit(i64::MAX, 120, Currency::Inr), MAX_AMOUNT_MINOR);
    }
}
