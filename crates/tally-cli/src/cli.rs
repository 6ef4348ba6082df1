//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track expenses from plain sentences
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Natural-language expense tracker with budgets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data file (defaults to ~/.local/share/tally/tally.json)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// User the expenses and budgets belong to
    #[arg(long, default_value = "default", global = true)]
    pub user: String,

    /// Config file layered over the built-in defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a sentence and show the result without saving it
    Parse {
        /// Expense text, e.g. "500 rupees for lunch yesterday"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Print the parsed candidate as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a sentence, save it and check budgets
    Add {
        /// Expense text, e.g. "500 rupees for lunch yesterday"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List recorded expenses
    List {
        /// Only this period: month or year
        #[arg(short, long)]
        period: Option<String>,

        /// Maximum number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Change fields of a recorded expense
    Edit {
        /// Expense ID
        id: i64,

        /// New amount in major units of the expense's currency
        #[arg(long)]
        amount: Option<f64>,

        /// New category (Food, Travel, ...)
        #[arg(long)]
        category: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: i64,
    },

    /// Search expenses by description or category
    Search {
        /// Text to look for (case-insensitive)
        query: String,
    },

    /// Spending breakdown by category
    Report {
        /// Period: month or year
        #[arg(short, long, default_value = "month")]
        period: String,

        /// Print the aggregate as JSON
        #[arg(long)]
        json: bool,
    },

    /// Monthly, yearly and all-time totals
    Stats {
        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage budgets (add, list, status, update, remove, suggest)
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },
}

#[derive(Subcommand)]
pub enum BudgetAction {
    /// Create a budget for a category
    Add {
        /// Category (Food, Entertainment, Travel, Necessities, Healthcare,
        /// Education, Utilities, Loans, Other)
        category: String,

        /// Spending limit in major units (e.g. 5000 or 49.99)
        amount: f64,

        /// Period: monthly or yearly
        #[arg(short, long, default_value = "monthly")]
        period: String,

        /// Currency code (defaults to the configured home currency)
        #[arg(short, long)]
        currency: Option<String>,

        /// Percentage of the limit that triggers a warning (1-100)
        #[arg(short, long)]
        threshold: Option<u8>,
    },

    /// List budgets
    List {
        /// Include removed budgets
        #[arg(long)]
        all: bool,
    },

    /// Show spending against budgets
    Status {
        /// Budget ID (all active budgets if omitted)
        id: Option<i64>,
    },

    /// Change a budget's limit or threshold, or restore a removed one
    Update {
        /// Budget ID
        id: i64,

        /// New limit in major units
        #[arg(short, long)]
        amount: Option<f64>,

        /// New warning threshold (1-100)
        #[arg(short, long)]
        threshold: Option<u8>,

        /// Reactivate a removed budget
        #[arg(long)]
        activate: bool,
    },

    /// Remove a budget (kept in history as inactive)
    Remove {
        /// Budget ID
        id: i64,
    },

    /// Suggest budgets from this month's spending
    Suggest,
}
