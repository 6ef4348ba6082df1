//! Tally Core Library
//!
//! Shared functionality for the Tally expense tracker:
//! - Natural-language expense parser (remote backends plus a multilingual
//!   rule-based fallback)
//! - Keyword category classifier, amount/currency and date extractors
//! - Period-based expense aggregation and spending statistics
//! - Budget tracking, threshold notifications and recommendations
//! - Repository traits with in-memory and JSON file stores
//! - Layered TOML configuration

pub mod aggregate;
pub mod ai;
pub mod budget;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod notify;
pub mod parser;
pub mod store;

/// Test utilities including a mock remote parse server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{
    aggregate, aggregate_category, search, spending_statistics, Aggregate, SpendingStatistics,
};
pub use ai::{BackendKind, MockBackend, ParseBackend, ParseClient, RemoteExpense};
pub use budget::{compute_status, decide_signal, validate_new_budget, BudgetTracker};
pub use classify::{classify, matched_keyword};
pub use config::AppConfig;
pub use error::{Error, RemoteParseError, Result};
pub use extract::{extract_amount, extract_date, DateOrder, ExtractedAmount};
pub use models::{
    Budget, BudgetPeriod, BudgetRecommendation, BudgetSignal, BudgetStatus, BudgetUpdate,
    CategoryTag, Currency, Expense, ExpenseCandidate, ExpenseUpdate, NewBudget, NewExpense,
    ParseSource, PeriodWindow, RecommendationKind, SignalKind, ValidationReport, MAX_AMOUNT_MINOR,
};
pub use notify::{LogNotifier, MemoryNotifier, Notifier};
pub use parser::{validate, validate_expense, ExpenseParser};
pub use store::{BudgetStore, ExpenseStore, FileStore, MemoryStore};
