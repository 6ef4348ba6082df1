//! In-memory store

use std::sync::RwLock;

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::{Budget, Expense, ExpenseUpdate, NewExpense, PeriodWindow};

use super::{lock_poisoned, BudgetStore, ExpenseStore, Snapshot};

/// Store that lives for the life of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> Result<T> {
        let data = self.data.read().map_err(|_| lock_poisoned())?;
        Ok(f(&data))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Snapshot) -> Result<T>) -> Result<T> {
        let mut data = self.data.write().map_err(|_| lock_poisoned())?;
        f(&mut data)
    }
}

impl ExpenseStore for MemoryStore {
    fn insert_expense(&self, expense: NewExpense) -> Result<Expense> {
        self.write(|data| Ok(data.insert_expense(expense)))
    }

    fn list_expenses(&self, user_id: &str, range: Option<&PeriodWindow>) -> Result<Vec<Expense>> {
        self.read(|data| data.list_expenses(user_id, range))
    }

    fn get_expense(&self, user_id: &str, id: i64) -> Result<Expense> {
        self.read(|data| data.get_expense(user_id, id))?
    }

    fn update_expense(
        &self,
        user_id: &str,
        id: i64,
        update: &ExpenseUpdate,
        now: NaiveDateTime,
    ) -> Result<Expense> {
        self.write(|data| data.update_expense(user_id, id, update, now))
    }

    fn delete_expense(&self, user_id: &str, id: i64) -> Result<()> {
        self.write(|data| data.delete_expense(user_id, id))
    }
}

impl BudgetStore for MemoryStore {
    fn insert_budget(&self, budget: Budget) -> Result<Budget> {
        self.write(|data| Ok(data.insert_budget(budget)))
    }

    fn get_budget(&self, id: i64) -> Result<Budget> {
        self.read(|data| data.get_budget(id))?
    }

    fn list_budgets(&self, user_id: &str, include_inactive: bool) -> Result<Vec<Budget>> {
        self.read(|data| data.list_budgets(user_id, include_inactive))
    }

    fn save_budget(&self, budget: &Budget) -> Result<()> {
        self.write(|data| data.save_budget(budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        super::super::tests::exercise_store(&MemoryStore::new());
    }
}
