//! Budget command implementations (add, list, status, update, remove, suggest)

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tally_core::{
    Budget, BudgetPeriod, BudgetStatus, BudgetStore, BudgetTracker, BudgetUpdate, CategoryTag,
    Currency, Error, ExpenseStore, NewBudget, RecommendationKind,
};

/// Fetch a budget and make sure it belongs to `user`
fn owned_budget<S: BudgetStore + ExpenseStore>(
    tracker: &BudgetTracker<S>,
    user: &str,
    id: i64,
) -> Result<Budget> {
    match tracker.store().get_budget(id) {
        Ok(budget) if budget.user_id == user => Ok(budget),
        Ok(_) | Err(Error::NotFound(_)) => anyhow::bail!("Budget {} not found", id),
        Err(e) => Err(e.into()),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_budget_add<S: BudgetStore + ExpenseStore>(
    tracker: &BudgetTracker<S>,
    user: &str,
    category: &str,
    amount: f64,
    period: &str,
    currency: Currency,
    threshold: Option<u8>,
    now: NaiveDateTime,
) -> Result<()> {
    let category: CategoryTag = category.parse()?;
    let period: BudgetPeriod = period.parse()?;
    let limit_minor = currency.to_minor(amount)?;

    let budget = tracker.create_budget(
        NewBudget {
            user_id: user.to_string(),
            category,
            limit_minor,
            currency,
            period,
            notification_threshold_pct: threshold,
        },
        now,
    )?;

    println!(
        "✅ Created {} budget {} for {}: {} (warn at {}%)",
        budget.period,
        budget.id,
        budget.category,
        budget.currency.format_minor(budget.limit_minor),
        budget.notification_threshold_pct
    );

    Ok(())
}

pub fn cmd_budget_list<S: BudgetStore + ExpenseStore>(
    tracker: &BudgetTracker<S>,
    user: &str,
    include_removed: bool,
) -> Result<()> {
    let budgets = tracker.store().list_budgets(user, include_removed)?;

    if budgets.is_empty() {
        println!("No budgets yet. Create one with:");
        println!("  tally budget add Food 5000");
        return Ok(());
    }

    println!();
    println!("💼 Budgets");
    println!("   ─────────────────────────────────────────────────────────────");

    for budget in budgets {
        let removed = if budget.active { "" } else { " (removed)" };
        println!(
            "   [{}] {:<13} {:<8} {:>12}  warn at {}%{}",
            budget.id,
            budget.category.as_str(),
            budget.period.as_str(),
            budget.currency.format_minor(budget.limit_minor),
            budget.notification_threshold_pct,
            removed
        );
    }

    Ok(())
}

pub fn cmd_budget_status<S: BudgetStore + ExpenseStore>(
    tracker: &BudgetTracker<S>,
    user: &str,
    id: Option<i64>,
    now: NaiveDateTime,
) -> Result<()> {
    let statuses = match id {
        Some(id) => {
            owned_budget(tracker, user, id)?;
            vec![tracker.budget_status(id, now)?]
        }
        None => tracker.all_statuses(user, now)?,
    };

    if statuses.is_empty() {
        println!("No active budgets. Create one with:");
        println!("  tally budget add Food 5000");
        return Ok(());
    }

    println!();
    println!("📈 Budget Status");
    println!("   ─────────────────────────────────────────────────────────────");

    for status in &statuses {
        print_status(status);
    }

    Ok(())
}

fn print_status(status: &BudgetStatus) {
    let budget = &status.budget;
    let icon = if status.is_over_budget {
        "🚨"
    } else if status.should_notify {
        "⚠️ "
    } else {
        "✅"
    };
    let filled = ((status.percentage / 5.0).round() as usize).min(20);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled));

    println!(
        "   {} [{}] {} ({})",
        icon, budget.id, budget.category, budget.period
    );
    println!(
        "      {} {:>5.1}%  {} of {}",
        bar,
        status.percentage,
        budget.currency.format_minor(status.spent_minor),
        budget.currency.format_minor(budget.limit_minor)
    );
    if status.is_over_budget {
        println!(
            "      Over by {} across {} expense(s)",
            budget.currency.format_minor(-status.remaining_minor),
            status.expense_count
        );
    } else {
        println!(
            "      {} left across {} expense(s)",
            budget.currency.format_minor(status.remaining_minor),
            status.expense_count
        );
    }
    println!();
}

pub fn cmd_budget_update<S: BudgetStore + ExpenseStore>(
    tracker: &BudgetTracker<S>,
    user: &str,
    id: i64,
    amount: Option<f64>,
    threshold: Option<u8>,
    activate: bool,
) -> Result<()> {
    let budget = owned_budget(tracker, user, id)?;

    if amount.is_none() && threshold.is_none() && !activate {
        println!("Nothing to update. Use --amount, --threshold or --activate.");
        return Ok(());
    }

    let update = BudgetUpdate {
        limit_minor: amount.map(|a| budget.currency.to_minor(a)).transpose()?,
        notification_threshold_pct: threshold,
        active: activate.then_some(true),
    };
    let updated = tracker
        .update_budget(id, update)
        .with_context(|| format!("Failed to update budget {}", id))?;

    println!(
        "✅ Updated budget {}: {} {} (warn at {}%)",
        updated.id,
        updated.category,
        updated.currency.format_minor(updated.limit_minor),
        updated.notification_threshold_pct
    );

    Ok(())
}

pub fn cmd_budget_remove<S: BudgetStore + ExpenseStore>(
    tracker: &BudgetTracker<S>,
    user: &str,
    id: i64,
) -> Result<()> {
    let budget = owned_budget(tracker, user, id)?;
    if !budget.active {
        println!("Budget {} is already removed.", id);
        return Ok(());
    }

    tracker.deactivate_budget(id)?;

    println!("✅ Removed {} budget {} for {}", budget.period, id, budget.category);
    println!("   Use 'tally budget update {} --activate' to restore it.", id);

    Ok(())
}

pub fn cmd_budget_suggest<S: BudgetStore + ExpenseStore>(
    tracker: &BudgetTracker<S>,
    user: &str,
    now: NaiveDateTime,
) -> Result<()> {
    let recommendations = tracker.recommendations(user, now)?;

    if recommendations.is_empty() {
        println!("✅ No suggestions. Your budgets fit this month's spending.");
        return Ok(());
    }

    println!();
    println!("💡 Budget Suggestions");
    println!("   ─────────────────────────────────────────────────────────────");

    for rec in &recommendations {
        let icon = match rec.kind {
            RecommendationKind::Create => "➕",
            RecommendationKind::Increase => "⬆️ ",
        };
        println!("   {} {}", icon, rec.message);
    }

    Ok(())
}
