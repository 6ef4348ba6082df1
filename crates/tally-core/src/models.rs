//! Domain models for Tally

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest amount accepted anywhere, in minor units (10^15)
///
/// Keeps sums of many expenses far away from `i64` overflow.
pub const MAX_AMOUNT_MINOR: i64 = 1_000_000_000_000_000;

/// Expense category
///
/// Closed set. Declaration order matters: the keyword classifier checks
/// categories in this order and aggregation ties go to the earlier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryTag {
    Food,
    Entertainment,
    Travel,
    Necessities,
    Loans,
    Healthcare,
    Education,
    Utilities,
    Other,
}

impl CategoryTag {
    /// Every category in declaration order
    pub const ALL: [CategoryTag; 9] = [
        Self::Food,
        Self::Entertainment,
        Self::Travel,
        Self::Necessities,
        Self::Loans,
        Self::Healthcare,
        Self::Education,
        Self::Utilities,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Entertainment => "Entertainment",
            Self::Travel => "Travel",
            Self::Necessities => "Necessities",
            Self::Loans => "Loans",
            Self::Healthcare => "Healthcare",
            Self::Education => "Education",
            Self::Utilities => "Utilities",
            Self::Other => "Other",
        }
    }

    /// Category names, as sent to remote parse backends
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.as_str()).collect()
    }

    /// Parse a category name, falling back to `Other` for anything unknown
    pub fn coerce(s: &str) -> Self {
        s.parse().unwrap_or_else(|e: Error| {
            tracing::warn!(error = %e, "Coercing category to Other");
            Self::Other
        })
    }
}

impl std::str::FromStr for CategoryTag {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .copied()
            .ok_or_else(|| Error::UnrecognizedCategory(s.to_string()))
    }
}

impl std::fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supported currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Inr,
    Usd,
    Eur,
    Gbp,
    Jpy,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Inr => "INR",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Jpy => "JPY",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Inr => "₹",
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
            Self::Jpy => "¥",
        }
    }

    /// Number of minor units in one major unit
    pub fn minor_unit_factor(&self) -> i64 {
        match self {
            Self::Jpy => 1,
            _ => 100,
        }
    }

    /// Convert a major-unit amount to minor units, rounding to nearest
    ///
    /// Fails for non-finite, negative or out-of-range amounts instead of
    /// saturating.
    pub fn to_minor(&self, major: f64) -> Result<i64> {
        let minor = (major * self.minor_unit_factor() as f64).round();
        if !minor.is_finite() || minor < 0.0 || minor > MAX_AMOUNT_MINOR as f64 {
            return Err(Error::InvalidAmount(format!(
                "{} {} is out of range",
                major,
                self.code()
            )));
        }
        Ok(minor as i64)
    }

    /// Render a minor-unit amount, e.g. `₹500.00`
    pub fn format_minor(&self, amount_minor: i64) -> String {
        let factor = self.minor_unit_factor();
        let sign = if amount_minor < 0 { "-" } else { "" };
        let abs = amount_minor.unsigned_abs();
        if factor == 1 {
            return format!("{}{}{}", sign, self.symbol(), abs);
        }
        let factor = factor as u64;
        format!(
            "{}{}{}.{:02}",
            sign,
            self.symbol(),
            abs / factor,
            abs % factor
        )
    }
}

impl std::str::FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INR" => Ok(Self::Inr),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "JPY" => Ok(Self::Jpy),
            _ => Err(Error::InvalidData(format!("Unknown currency: {}", s))),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Which parse path produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseSource {
    Remote,
    Local,
}

impl ParseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

/// Structured result of parsing free text, not yet persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCandidate {
    /// Amount in the currency's smallest unit
    pub amount_minor: i64,
    pub currency: Currency,
    pub category: CategoryTag,
    pub description: String,
    pub occurred_at: NaiveDateTime,
    /// Parse certainty in 0..=1
    pub confidence: f64,
    pub source: ParseSource,
    pub source_text: String,
}

/// Outcome of validating a candidate before persistence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Convert into a `Result`, carrying the report on failure
    pub fn into_result(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: String,
    pub amount_minor: i64,
    pub currency: Currency,
    pub category: CategoryTag,
    pub description: String,
    pub occurred_at: NaiveDateTime,
    /// Raw transcript the expense was parsed from
    pub source_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert form of an expense
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub user_id: String,
    pub amount_minor: i64,
    pub currency: Currency,
    pub category: CategoryTag,
    pub description: String,
    pub occurred_at: NaiveDateTime,
    pub source_text: Option<String>,
}

impl NewExpense {
    /// Build an insertable expense from a parsed candidate
    ///
    /// Runs the same checks as [`crate::parser::validate`]; zero-amount
    /// local parses are rejected here rather than stored.
    pub fn from_candidate(
        user_id: &str,
        candidate: &ExpenseCandidate,
        now: NaiveDateTime,
    ) -> Result<Self> {
        crate::parser::validate(candidate, now).into_result()?;
        Ok(Self {
            user_id: user_id.to_string(),
            amount_minor: candidate.amount_minor,
            currency: candidate.currency,
            category: candidate.category,
            description: candidate.description.trim().to_string(),
            occurred_at: candidate.occurred_at,
            source_text: Some(candidate.source_text.clone()),
        })
    }
}

/// Partial edit of a stored expense; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseUpdate {
    pub amount_minor: Option<i64>,
    pub category: Option<CategoryTag>,
    pub description: Option<String>,
    pub occurred_at: Option<NaiveDateTime>,
}

impl ExpenseUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Copy the set fields onto `expense`
    pub fn apply_to(&self, expense: &mut Expense) {
        if let Some(amount) = self.amount_minor {
            expense.amount_minor = amount;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(description) = &self.description {
            expense.description = description.trim().to_string();
        }
        if let Some(occurred_at) = self.occurred_at {
            expense.occurred_at = occurred_at;
        }
    }
}

/// Budget period kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// The calendar window of this kind that contains `now`
    pub fn window(&self, now: NaiveDateTime) -> PeriodWindow {
        match self {
            Self::Monthly => PeriodWindow::month_of(now.date()),
            Self::Yearly => PeriodWindow::year_of(now.date()),
        }
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" | "annual" => Ok(Self::Yearly),
            _ => Err(Error::InvalidBudget(format!(
                "Period must be either monthly or yearly, got '{}'",
                s
            ))),
        }
    }
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A concrete time window; both bounds are inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl PeriodWindow {
    /// Window spanning whole days from `first` through `last`
    pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: first.and_time(NaiveTime::MIN),
            end: last.and_time(end_of_day()),
        }
    }

    /// Calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let next_month = if first.month() == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
        };
        let last = next_month
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self::days(first, last)
    }

    /// Calendar year containing `date`
    pub fn year_of(date: NaiveDate) -> Self {
        let first = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
        let last = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
        Self::days(first, last)
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Last representable instant of a day
fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN)
}

/// A spending budget for one category and period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: String,
    pub category: CategoryTag,
    /// Spending limit in minor units, always > 0
    pub limit_minor: i64,
    pub currency: Currency,
    pub period: BudgetPeriod,
    /// Percentage of the limit at which a warning is raised (1..=100)
    pub notification_threshold_pct: u8,
    /// False once the user removes the budget (soft delete)
    pub active: bool,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Budget creation request
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub user_id: String,
    pub category: CategoryTag,
    pub limit_minor: i64,
    pub currency: Currency,
    pub period: BudgetPeriod,
    /// Defaults to the configured threshold (80) when absent
    pub notification_threshold_pct: Option<u8>,
}

/// Partial update to an existing budget
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetUpdate {
    pub limit_minor: Option<i64>,
    pub notification_threshold_pct: Option<u8>,
    pub active: Option<bool>,
}

/// Live spend-vs-limit view of one budget; recomputed on every request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub spent_minor: i64,
    /// Negative when over budget
    pub remaining_minor: i64,
    pub percentage: f64,
    pub is_over_budget: bool,
    pub should_notify: bool,
    pub expense_count: usize,
}

/// Kind of budget notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Spending reached the notification threshold
    Warning,
    /// Spending went past the limit
    Exceeded,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Exceeded => "exceeded",
        }
    }
}

/// Notification payload handed to the delivery collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSignal {
    pub kind: SignalKind,
    pub budget_id: i64,
    pub user_id: String,
    pub category: CategoryTag,
    pub percentage: f64,
    /// Amount spent past the limit, 0 for warnings
    pub overage_minor: i64,
    pub currency: Currency,
}

impl BudgetSignal {
    pub fn title(&self) -> &'static str {
        match self.kind {
            SignalKind::Warning => "Budget Warning",
            SignalKind::Exceeded => "Budget Exceeded!",
        }
    }

    pub fn message(&self) -> String {
        match self.kind {
            SignalKind::Warning => format!(
                "You've used {:.0}% of your {} budget",
                self.percentage, self.category
            ),
            SignalKind::Exceeded => format!(
                "You've exceeded your {} budget by {}",
                self.category,
                self.currency.format_minor(self.overage_minor)
            ),
        }
    }
}

/// Kind of budget recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// No monthly budget exists for a category with spending
    Create,
    /// The monthly budget is already exceeded
    Increase,
}

/// Suggested budget change derived from the current month's spending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetRecommendation {
    pub category: CategoryTag,
    pub kind: RecommendationKind,
    pub suggested_limit_minor: i64,
    pub currency: Currency,
    pub message: String,
}
