//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config, data file, time windows)
//! - `parse` - Parse preview command
//! - `expenses` - Expense commands (add, edit, list, delete, search)
//! - `reports` - Report and statistics commands
//! - `budgets` - Budget management commands

pub mod budgets;
pub mod core;
pub mod expenses;
pub mod parse;
pub mod reports;

// Re-export command functions for main.rs
pub use budgets::*;
pub use core::*;
pub use expenses::*;
pub use parse::*;
pub use reports::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
