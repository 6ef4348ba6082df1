//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Layered configuration with environment overrides
//! - `open_store` / `open_tracker` - Open the JSON data file
//! - `resolve_window` - Turn a `--period` argument into a time window

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tally_core::store::default_data_path;
use tally_core::{AppConfig, BudgetPeriod, BudgetTracker, FileStore, PeriodWindow};

/// Current local wall-clock time
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Load config from the built-in defaults, the override file and the environment
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load_from(path).context("Failed to load configuration")
}

/// Open the data file, creating its directory when needed
pub fn open_store(path: Option<&Path>) -> Result<FileStore> {
    let path: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => default_data_path().context("Could not determine a data directory")?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    FileStore::open(&path).with_context(|| format!("Failed to open data file {}", path.display()))
}

/// Open the data file behind a budget tracker using the configured default threshold
pub fn open_tracker(path: Option<&Path>, config: &AppConfig) -> Result<BudgetTracker<FileStore>> {
    let store = open_store(path)?;
    Ok(BudgetTracker::new(store).with_default_threshold(config.budgets.default_threshold_pct))
}

/// Window for `month` or `year` containing `now`
pub fn resolve_window(period: &str, now: NaiveDateTime) -> Result<PeriodWindow> {
    let period: BudgetPeriod = period.parse()?;
    Ok(period.window(now))
}
