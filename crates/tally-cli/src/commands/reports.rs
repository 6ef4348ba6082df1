//! Report command implementations

use anyhow::Result;
use chrono::NaiveDateTime;
use tally_core::{aggregate, spending_statistics, Currency, Expense, ExpenseStore, PeriodWindow};

/// Spending by category for one window
pub fn cmd_report<S: ExpenseStore>(
    store: &S,
    user: &str,
    window: &PeriodWindow,
    json: bool,
) -> Result<()> {
    let expenses = store.list_expenses(user, Some(window))?;
    let report = aggregate(&expenses, window);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!(
        "📊 Spending Report ({} to {})",
        window.start.format("%Y-%m-%d"),
        window.end.format("%Y-%m-%d")
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if report.count == 0 {
        println!("   No expenses in this period.");
        return Ok(());
    }

    let currency = display_currency(&expenses);
    let mut rows: Vec<_> = report.by_category.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1));

    for (category, &amount) in rows {
        let share = if report.total_minor > 0 {
            amount as f64 / report.total_minor as f64 * 100.0
        } else {
            0.0
        };
        let bar = "█".repeat((share / 5.0).round() as usize);
        println!(
            "   {:<13} {:>12} {:>5.1}% {}",
            category.as_str(),
            currency.format_minor(amount),
            share,
            bar
        );
    }

    println!();
    println!(
        "   Total: {} across {} expense(s)",
        currency.format_minor(report.total_minor),
        report.count
    );
    println!(
        "   Average: {}",
        currency.format_minor(report.average_per_expense())
    );
    if let Some(top) = report.top_category() {
        println!("   Top category: {}", top);
    }

    Ok(())
}

/// Monthly, yearly and all-time overview
pub fn cmd_stats<S: ExpenseStore>(
    store: &S,
    user: &str,
    now: NaiveDateTime,
    json: bool,
) -> Result<()> {
    let expenses = store.list_expenses(user, None)?;
    let stats = spending_statistics(&expenses, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let currency = display_currency(&expenses);

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│           💰 Tally Statistics           │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  This month:  {:>14}  ({} expenses)",
        currency.format_minor(stats.monthly_total_minor),
        stats.monthly_count
    );
    println!(
        "  This year:   {:>14}  ({} expenses)",
        currency.format_minor(stats.yearly_total_minor),
        stats.yearly_count
    );
    println!(
        "  All time:    {:>14}  ({} expenses)",
        currency.format_minor(stats.all_time_total_minor),
        stats.all_time_count
    );

    if let Some(top) = stats.top_category {
        println!();
        println!("  🏆 Top category this month: {}", top);
    }

    Ok(())
}

/// Currency used for display: that of the most recent expense
///
/// Totals are plain sums of minor units, so mixed-currency data is shown in
/// a single currency without conversion.
fn display_currency(expenses: &[Expense]) -> Currency {
    expenses
        .first()
        .map(|e| e.currency)
        .unwrap_or(Currency::Inr)
}
