//! JSON snapshot store
//!
//! Loads the whole file on open and rewrites it after every change. Writes
//! go to a temporary file in the same directory which is then renamed over
//! the old snapshot, so a crash never leaves a half-written file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::NaiveDateTime;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::models::{Budget, Expense, ExpenseUpdate, NewExpense, PeriodWindow};

use super::{lock_poisoned, BudgetStore, ExpenseStore, Snapshot};

/// Default snapshot location (`~/.local/share/tally/tally.json`)
pub fn default_data_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("tally.json"))
}

/// Store backed by a JSON file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: RwLock<Snapshot>,
}

impl FileStore {
    /// Open a snapshot file, starting empty if it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Snapshot::default()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    Error::InvalidData(format!(
                        "Corrupt data file {}: {}",
                        path.display(),
                        e
                    ))
                })?
            }
        } else {
            Snapshot::default()
        };

        tracing::debug!(path = %path.display(), "Opened data file");
        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> Result<T> {
        let data = self.data.read().map_err(|_| lock_poisoned())?;
        Ok(f(&data))
    }

    /// Apply a change to a copy, persist it, then publish it
    fn write<T>(&self, f: impl FnOnce(&mut Snapshot) -> Result<T>) -> Result<T> {
        let mut data = self.data.write().map_err(|_| lock_poisoned())?;
        let mut next = data.clone();
        let out = f(&mut next)?;
        self.persist(&next)?;
        *data = next;
        Ok(out)
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, snapshot)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl ExpenseStore for FileStore {
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

impl BudgetStore for FileStore {
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
