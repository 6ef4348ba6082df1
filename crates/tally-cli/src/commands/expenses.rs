//! Expense command implementations (add, edit, list, delete, search)

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use tally_core::{
    search, BudgetSignal, BudgetStore, BudgetTracker, CategoryTag, Expense, ExpenseParser,
    ExpenseStore, ExpenseUpdate, NewExpense, Notifier, PeriodWindow, SignalKind,
};

use super::truncate;

/// Prints budget signals to the terminal
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, signal: &BudgetSignal) -> tally_core::Result<()> {
        let icon = match signal.kind {
            SignalKind::Warning => "⚠️ ",
            SignalKind::Exceeded => "🚨",
        };
        println!("{} {} {}", icon, signal.title(), signal.message());
        Ok(())
    }
}

pub async fn cmd_add<S: BudgetStore + ExpenseStore>(
    tracker: &BudgetTracker<S>,
    parser: &ExpenseParser,
    user: &str,
    text: &str,
    now: NaiveDateTime,
) -> Result<()> {
    let candidate = parser
        .parse_validated(text, now)
        .await
        .context("Expense not saved")?;
    let new = NewExpense::from_candidate(user, &candidate, now).context("Expense not saved")?;
    let expense = tracker
        .store()
        .insert_expense(new)
        .context("Failed to save expense")?;

    println!("✅ Saved expense {}:", expense.id);
    print_expense(&expense);

    let signals = tracker.check_and_notify(user, now, &ConsoleNotifier)?;
    if !signals.is_empty() {
        println!();
        println!("   Run 'tally budget status' for details.");
    }

    Ok(())
}

/// Field changes requested by `tally edit`, still in user units
#[derive(Debug, Default)]
pub struct EditArgs {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

pub fn cmd_edit<S: BudgetStore + ExpenseStore>(
    tracker: &BudgetTracker<S>,
    user: &str,
    id: i64,
    args: EditArgs,
    now: NaiveDateTime,
) -> Result<()> {
    let store = tracker.store();
    let current = store
        .get_expense(user, id)
        .with_context(|| format!("Expense {} not found", id))?;

    let update = ExpenseUpdate {
        amount_minor: args
            .amount
            .map(|a| current.currency.to_minor(a))
            .transpose()?,
        category: args
            .category
            .as_deref()
            .map(str::parse::<CategoryTag>)
            .transpose()?,
        description: args.description,
        occurred_at: args
            .date
            .as_deref()
            .map(|d| {
                NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                    .map(|day| day.and_time(current.occurred_at.time()))
                    .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", d))
            })
            .transpose()?,
    };

    if update.is_empty() {
        println!("Nothing to change. Pass --amount, --category, --description or --date.");
        return Ok(());
    }

    let expense = store
        .update_expense(user, id, &update, now)
        .context("Expense not updated")?;

    println!("✅ Updated expense {}:", expense.id);
    print_expense(&expense);

    tracker.check_and_notify(user, now, &ConsoleNotifier)?;
    Ok(())
}

pub fn cmd_list<S: ExpenseStore>(
    store: &S,
    user: &str,
    window: Option<&PeriodWindow>,
    limit: usize,
) -> Result<()> {
    let expenses = store.list_expenses(user, window)?;

    if expenses.is_empty() {
        println!("No expenses found. Add one with:");
        println!("  tally add 500 rupees for lunch");
        return Ok(());
    }

    println!();
    println!("📝 Recent Expenses");
    println!("   ─────────────────────────────────────────────────────────────");

    for expense in expenses.iter().take(limit) {
        print_expense(expense);
    }

    if expenses.len() > limit {
        println!();
        println!("   ... and {} more (use --limit)", expenses.len() - limit);
    }

    Ok(())
}

pub fn cmd_delete<S: ExpenseStore>(store: &S, user: &str, id: i64) -> Result<()> {
    store
        .delete_expense(user, id)
        .with_context(|| format!("Failed to delete expense {}", id))?;
    println!("✅ Deleted expense {}", id);
    Ok(())
}

pub fn cmd_search<S: ExpenseStore>(store: &S, user: &str, query: &str) -> Result<()> {
    let expenses = store.list_expenses(user, None)?;
    let matches = search(&expenses, query);

    if matches.is_empty() {
        println!("No expenses match '{}'.", query);
        return Ok(());
    }

    println!();
    println!("🔍 {} expense(s) matching '{}'", matches.len(), query);
    println!("   ─────────────────────────────────────────────────────────────");

    for expense in matches {
        print_expense(expense);
    }

    Ok(())
}

fn print_expense(expense: &Expense) {
    println!(
        "   [{}] {} │ {:>12} │ {:<13} │ {}",
        expense.id,
        expense.occurred_at.format("%Y-%m-%d"),
        expense.currency.format_minor(expense.amount_minor),
        expense.category.as_str(),
        truncate(&expense.description, 40)
    );
}
