//! Natural-language expense parser
//!
//! Turns free text into an [`ExpenseCandidate`]. When a remote backend is
//! configured it is tried first, bounded by a timeout; any failure falls
//! back to the local rule-based path at once (no retry). The local path
//! always produces a candidate, possibly with amount 0, so callers must run
//! [`validate`] before storing anything.

use std::time::Duration;

use chrono::{Datelike, Days, NaiveDateTime};
use tracing::{debug, warn};

use crate::ai::parsing::parse_remote_date;
use crate::ai::{ParseBackend, ParseClient, RemoteExpense};
use crate::classify::classify;
use crate::config::AppConfig;
use crate::error::{Error, RemoteParseError, Result};
use crate::extract::amount::detect_currency;
use crate::extract::{extract_amount, extract_date, DateOrder};
use crate::models::{
    CategoryTag, Currency, Expense, ExpenseCandidate, ParseSource, ValidationReport,
    MAX_AMOUNT_MINOR,
};

/// Confidence of every locally parsed candidate
pub const LOCAL_CONFIDENCE: f64 = 0.6;

/// Default bound on a remote parse call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Earliest year accepted by [`validate`]
const MIN_YEAR: i32 = 1970;
/// Latest year accepted by [`validate`]
const MAX_YEAR: i32 = 9999;

/// Expense parser with an optional remote backend
#[derive(Clone)]
pub struct ExpenseParser {
    client: Option<ParseClient>,
    timeout: Duration,
    home_currency: Currency,
    date_order: DateOrder,
}

impl ExpenseParser {
    /// Create a parser; `None` means local parsing only
    pub fn new(client: Option<ParseClient>) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
            home_currency: Currency::Inr,
            date_order: DateOrder::DayFirst,
        }
    }

    /// Create a local-only parser
    pub fn local_only() -> Self {
        Self::new(None)
    }

    /// Create from application config
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ParseClient::from_config(&config.parser))
            .with_timeout(config.parser.timeout())
            .with_home_currency(config.locale.home_currency)
            .with_date_order(config.locale.date_order)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_home_currency(mut self, currency: Currency) -> Self {
        self.home_currency = currency;
        self
    }

    pub fn with_date_order(mut self, order: DateOrder) -> Self {
        self.date_order = order;
        self
    }

    pub fn client(&self) -> Option<&ParseClient> {
        self.client.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn home_currency(&self) -> Currency {
        self.home_currency
    }

    /// Parse text relative to the current local time
    pub async fn parse(&self, text: &str) -> ExpenseCandidate {
        self.parse_at(text, chrono::Local::now().naive_local()).await
    }

    /// Parse text relative to `now`; never fails
    pub async fn parse_at(&self, text: &str, now: NaiveDateTime) -> ExpenseCandidate {
        match self.parse_remote(text, now).await {
            Ok(candidate) => candidate,
            Err(RemoteParseError::NotConfigured) => self.parse_local(text, now),
            Err(e) => {
                warn!(error = %e, "Remote parse failed, falling back to local parser");
                self.parse_local(text, now)
            }
        }
    }

    /// Remote path only, bounded by the configured timeout
    ///
    /// On timeout the in-flight request is dropped.
    pub async fn parse_remote(
        &self,
        text: &str,
        now: NaiveDateTime,
    ) -> std::result::Result<ExpenseCandidate, RemoteParseError> {
        let client = self.client.as_ref().ok_or(RemoteParseError::NotConfigured)?;
        let categories = CategoryTag::names();

        let remote = tokio::time::timeout(
            self.timeout,
            client.parse_expense(text, &categories, now.date()),
        )
        .await
        .map_err(|_| RemoteParseError::Timeout(self.timeout))??;

        debug!(model = client.model(), host = client.host(), "Remote parse succeeded");
        candidate_from_remote(remote, text, now, self.home_currency)
    }

    /// Local rule-based path with this parser's locale settings
    pub fn parse_local(&self, text: &str, now: NaiveDateTime) -> ExpenseCandidate {
        parse_local(text, now, self.home_currency, self.date_order)
    }

    /// Parse and reject candidates that would not be storable
    ///
    /// A candidate without a positive amount fails with
    /// [`Error::InvalidAmount`]; other problems with [`Error::Validation`].
    pub async fn parse_validated(&self, text: &str, now: NaiveDateTime) -> Result<ExpenseCandidate> {
        let candidate = self.parse_at(text, now).await;
        if candidate.amount_minor <= 0 {
            return Err(Error::InvalidAmount(format!(
                "Amount must be greater than 0 (no usable amount in '{}')",
                text.trim()
            )));
        }
        validate(&candidate, now).into_result()?;
        Ok(candidate)
    }

    /// Suggested category for a description
    pub fn suggest_category(&self, description: &str) -> CategoryTag {
        suggest_category(description)
    }
}

impl Default for ExpenseParser {
    fn default() -> Self {
        Self::local_only()
    }
}

/// Parse with the local extractors only
///
/// Always returns a candidate with [`LOCAL_CONFIDENCE`]; the amount is 0 when
/// the text carries no numeral.
pub fn parse_local(
    text: &str,
    now: NaiveDateTime,
    home_currency: Currency,
    date_order: DateOrder,
) -> ExpenseCandidate {
    let amount = extract_amount(text, home_currency);

    ExpenseCandidate {
        amount_minor: amount.amount_minor,
        currency: amount.currency,
        category: classify(text),
        description: text.trim().to_string(),
        occurred_at: extract_date(text, now, date_order),
        confidence: LOCAL_CONFIDENCE,
        source: ParseSource::Local,
        source_text: text.to_string(),
    }
}

/// Check a candidate before it is stored
pub fn validate(candidate: &ExpenseCandidate, now: NaiveDateTime) -> ValidationReport {
    let mut errors = field_errors(
        candidate.amount_minor,
        &candidate.description,
        candidate.occurred_at,
        now,
    );

    if !(0.0..=1.0).contains(&candidate.confidence) {
        errors.push("Confidence must be between 0 and 1".to_string());
    }

    ValidationReport::from_errors(errors)
}

/// Check a stored expense after an edit
pub fn validate_expense(expense: &Expense, now: NaiveDateTime) -> ValidationReport {
    ValidationReport::from_errors(field_errors(
        expense.amount_minor,
        &expense.description,
        expense.occurred_at,
        now,
    ))
}

/// Amount, description and date rules shared by new and edited expenses
fn field_errors(
    amount_minor: i64,
    description: &str,
    occurred_at: NaiveDateTime,
    now: NaiveDateTime,
) -> Vec<String> {
    let mut errors = Vec::new();

    if amount_minor <= 0 {
        errors.push("Amount must be greater than 0".to_string());
    } else if amount_minor > MAX_AMOUNT_MINOR {
        errors.push("Amount is too large".to_string());
    }

    if description.trim().is_empty() {
        errors.push("Description is required".to_string());
    }

    let year = occurred_at.year();
    // One day of slack for clock and time zone differences
    let latest = now.checked_add_days(Days::new(1)).unwrap_or(now);
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        errors.push("Invalid date".to_string());
    } else if occurred_at > latest {
        errors.push("Date cannot be in the future".to_string());
    }

    errors
}

/// Suggested category for a description
pub fn suggest_category(description: &str) -> CategoryTag {
    classify(description)
}

/// Check a remote answer and turn it into a candidate
///
/// Every field of the contract must be present. Unknown categories are
/// coerced to `Other`; anything else off-contract is a remote failure.
fn candidate_from_remote(
    remote: RemoteExpense,
    text: &str,
    now: NaiveDateTime,
    home_currency: Currency,
) -> std::result::Result<ExpenseCandidate, RemoteParseError> {
    let RemoteExpense {
        amount,
        category,
        description,
        date,
        confidence,
        currency,
        ..
    } = remote;

    let amount = amount
        .filter(|a| a.is_finite() && *a > 0.0)
        .ok_or_else(|| {
            RemoteParseError::Rejected(format!(
                "amount must be a positive number, got {:?}",
                amount
            ))
        })?;
    let category = category.ok_or_else(|| missing("category"))?;
    let description = description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .ok_or_else(|| missing("description"))?;
    let date = date.ok_or_else(|| missing("date"))?;
    let confidence = confidence
        .filter(|c| c.is_finite())
        .ok_or_else(|| missing("confidence"))?
        .clamp(0.0, 1.0);

    if confidence < LOCAL_CONFIDENCE {
        return Err(RemoteParseError::Rejected(format!(
            "confidence {:.2} is below {:.2}",
            confidence, LOCAL_CONFIDENCE
        )));
    }

    let local_currency = || detect_currency(text).unwrap_or(home_currency);
    let currency = match currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("null"))
    {
        Some(code) => code.parse().unwrap_or_else(|_| {
            warn!(currency = code, "Unknown currency from remote parse, detecting locally");
            local_currency()
        }),
        None => local_currency(),
    };

    let amount_minor = currency
        .to_minor(amount)
        .map_err(|e| RemoteParseError::Rejected(e.to_string()))?;
    if amount_minor <= 0 {
        return Err(RemoteParseError::Rejected(format!(
            "amount {} rounds to zero in {}",
            amount, currency
        )));
    }

    let occurred_at = parse_remote_date(&date)
        .map(|day| day.and_time(now.time()))
        .ok_or_else(|| RemoteParseError::Malformed(format!("unreadable date '{}'", date)))?;

    Ok(ExpenseCandidate {
        amount_minor,
        currency,
        category: CategoryTag::coerce(&category),
        description,
        occurred_at,
        confidence,
        source: ParseSource::Remote,
        source_text: text.to_string(),
    })
}

fn missing(field: &str) -> RemoteParseError {
    RemoteParseError::Malformed(format!("missing field '{}'", field))
}
