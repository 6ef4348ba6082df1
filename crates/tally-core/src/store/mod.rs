//! Expense and budget repositories
//!
//! The tracker and CLI only see the `ExpenseStore` and `BudgetStore` traits.
//! Two implementations ship: `MemoryStore` for tests and embedding, and
//! `FileStore`, which keeps a JSON snapshot on disk.

mod file;
mod memory;

pub use file::{default_data_path, FileStore};
pub use memory::MemoryStore;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Budget, Expense, ExpenseUpdate, NewExpense, PeriodWindow};
use crate::parser::validate_expense;

/// Expense persistence
pub trait ExpenseStore: Send + Sync {
    /// Store a new expense and return it with its id
    fn insert_expense(&self, expense: NewExpense) -> Result<Expense>;

    /// A user's expenses, newest first, optionally limited to a window
    fn list_expenses(&self, user_id: &str, range: Option<&PeriodWindow>) -> Result<Vec<Expense>>;

    /// One of the user's expenses
    fn get_expense(&self, user_id: &str, id: i64) -> Result<Expense>;

    /// Edit one of the user's expenses
    ///
    /// The edited expense must pass the same amount, description and date
    /// checks as a new one; otherwise nothing changes.
    fn update_expense(
        &self,
        user_id: &str,
        id: i64,
        update: &ExpenseUpdate,
        now: NaiveDateTime,
    ) -> Result<Expense>;

    /// Delete one of the user's expenses
    fn delete_expense(&self, user_id: &str, id: i64) -> Result<()>;
}

/// Budget persistence
pub trait BudgetStore: Send + Sync {
    /// Store a new budget; the id on the argument is ignored
    fn insert_budget(&self, budget: Budget) -> Result<Budget>;

    fn get_budget(&self, id: i64) -> Result<Budget>;

    /// A user's budgets, optionally including deactivated ones
    fn list_budgets(&self, user_id: &str, include_inactive: bool) -> Result<Vec<Budget>>;

    /// Replace an existing budget
    fn save_budget(&self, budget: &Budget) -> Result<()>;
}

/// Everything a store holds; also the on-disk format of `FileStore`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    #[serde(default)]
    next_expense_id: i64,
    #[serde(default)]
    next_budget_id: i64,
    #[serde(default)]
    expenses: Vec<Expense>,
    #[serde(default)]
    budgets: Vec<Budget>,
}

impl Snapshot {
    fn insert_expense(&mut self, new: NewExpense) -> Expense {
        self.next_expense_id += 1;
        let expense = Expense {
            id: self.next_expense_id,
            user_id: new.user_id,
            amount_minor: new.amount_minor,
            currency: new.currency,
            category: new.category,
            description: new.description,
            occurred_at: new.occurred_at,
            source_text: new.source_text,
            created_at: Utc::now(),
        };
        self.expenses.push(expense.clone());
        expense
    }

    fn list_expenses(&self, user_id: &str, range: Option<&PeriodWindow>) -> Vec<Expense> {
        let mut expenses: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter(|e| range.map_or(true, |w| w.contains(e.occurred_at)))
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at).then(b.id.cmp(&a.id)));
        expenses
    }

    fn get_expense(&self, user_id: &str, id: i64) -> Result<Expense> {
        self.expenses
            .iter()
            .find(|e| e.id == id && e.user_id == user_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))
    }

    fn update_expense(
        &mut self,
        user_id: &str,
        id: i64,
        update: &ExpenseUpdate,
        now: NaiveDateTime,
    ) -> Result<Expense> {
        let slot = self
            .expenses
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
            .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))?;

        let mut edited = slot.clone();
        update.apply_to(&mut edited);
        validate_expense(&edited, now).into_result()?;

        *slot = edited.clone();
        Ok(edited)
    }

    fn delete_expense(&mut self, user_id: &str, id: i64) -> Result<()> {
        let before = self.expenses.len();
        self.expenses
            .retain(|e| !(e.id == id && e.user_id == user_id));
        if self.expenses.len() == before {
            return Err(Error::NotFound(format!("Expense {}", id)));
        }
        Ok(())
    }

    fn insert_budget(&mut self, mut budget: Budget) -> Budget {
        self.next_budget_id += 1;
        budget.id = self.next_budget_id;
        self.budgets.push(budget.clone());
        budget
    }

    fn get_budget(&self, id: i64) -> Result<Budget> {
        self.budgets
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Budget {}", id)))
    }

    fn list_budgets(&self, user_id: &str, include_inactive: bool) -> Vec<Budget> {
        self.budgets
            .iter()
            .filter(|b| b.user_id == user_id && (include_inactive || b.active))
            .cloned()
            .collect()
    }

    fn save_budget(&mut self, budget: &Budget) -> Result<()> {
        let slot = self
            .budgets
            .iter_mut()
            .find(|b| b.id == budget.id)
            .ok_or_else(|| Error::NotFound(format!("Budget {}", budget.id)))?;
        *slot = budget.clone();
        Ok(())
    }
}

fn lock_poisoned() -> Error {
    Error::InvalidData("Failed to acquire store lock".into())
}
