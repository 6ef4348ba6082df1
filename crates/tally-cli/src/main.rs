//! Tally CLI - Natural-language expense tracker
//!
//! Usage:
//!   tally add 500 rupees for lunch yesterday   Parse and save an expense
//!   tally edit 3 --amount 450                  Change a saved expense
//!   tally report --period month                Spending by category
//!   tally budget add Food 5000                 Create a monthly budget
//!   tally budget status                        Spending against budgets

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tally_core::{Currency, ExpenseParser};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let now = commands::now();
    let user = cli.user.as_str();

    match cli.command {
        Commands::Parse { text, json } => {
            let parser = ExpenseParser::from_config(&config);
            commands::cmd_parse(&parser, &text.join(" "), now, json).await
        }
        Commands::Add { text } => {
            let parser = ExpenseParser::from_config(&config);
            let tracker = commands::open_tracker(cli.data.as_deref(), &config)?;
            commands::cmd_add(&tracker, &parser, user, &text.join(" "), now).await
        }
        Commands::List { period, limit } => {
            let store = commands::open_store(cli.data.as_deref())?;
            let window = period
                .as_deref()
                .map(|p| commands::resolve_window(p, now))
                .transpose()?;
            commands::cmd_list(&store, user, window.as_ref(), limit)
        }
        Commands::Edit {
            id,
            amount,
            category,
            description,
            date,
        } => {
            let tracker = commands::open_tracker(cli.data.as_deref(), &config)?;
            let args = commands::EditArgs {
                amount,
                category,
                description,
                date,
            };
            commands::cmd_edit(&tracker, user, id, args, now)
        }
        Commands::Delete { id } => {
            let store = commands::open_store(cli.data.as_deref())?;
            commands::cmd_delete(&store, user, id)
        }
        Commands::Search { query } => {
            let store = commands::open_store(cli.data.as_deref())?;
            commands::cmd_search(&store, user, &query)
        }
        Commands::Report { period, json } => {
            let store = commands::open_store(cli.data.as_deref())?;
            let window = commands::resolve_window(&period, now)?;
            commands::cmd_report(&store, user, &window, json)
        }
        Commands::Stats { json } => {
            let store = commands::open_store(cli.data.as_deref())?;
            commands::cmd_stats(&store, user, now, json)
        }
        Commands::Budget { action } => {
            let tracker = commands::open_tracker(cli.data.as_deref(), &config)?;
            match action {
                BudgetAction::Add {
                    category,
                    amount,
                    period,
                    currency,
                    threshold,
                } => {
                    let currency = match currency {
                        Some(code) => code.parse::<Currency>()?,
                        None => config.locale.home_currency,
                    };
                    commands::cmd_budget_add(
                        &tracker, user, &category, amount, &period, currency, threshold, now,
                    )
                }
                BudgetAction::List { all } => commands::cmd_budget_list(&tracker, user, all),
                BudgetAction::Status { id } => commands::cmd_budget_status(&tracker, user, id, now),
                BudgetAction::Update {
                    id,
                    amount,
                    threshold,
                    activate,
                } => commands::cmd_budget_update(&tracker, user, id, amount, threshold, activate),
                BudgetAction::Remove { id } => commands::cmd_budget_remove(&tracker, user, id),
                BudgetAction::Suggest => commands::cmd_budget_suggest(&tracker, user, now),
            }
        }
    }
}
