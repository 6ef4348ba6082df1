//! Date extraction
//!
//! Resolves the date an expense happened from the text, relative to an
//! explicit `now`. Explicit dates win over relative markers; when several
//! patterns of the same kind appear, the first valid one is used.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::ascii_digits;

/// How to read ambiguous numeric dates such as `03/04`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// 03/04 is the 3rd of April
    #[default]
    DayFirst,
    /// 03/04 is March 4th
    MonthFirst,
}

impl DateOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DayFirst => "day_first",
            Self::MonthFirst => "month_first",
        }
    }
}

const MONTH_NAMES: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})\b").expect("valid regex")
});

static SLASH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{1,2})/([0-9]{1,2})(?:/([0-9]{4}|[0-9]{2}))?\b").expect("valid regex")
});

static DASH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{1,2})-([0-9]{1,2})-([0-9]{4})\b").expect("valid regex")
});

static MONTH_NAME_DATE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"\b(?:([0-9]{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({m})|({m})\.?\s+([0-9]{{1,2}})(?:st|nd|rd|th)?)\b(?:,?\s+([0-9]{{4}})\b)?",
        m = MONTH_NAMES
    );
    Regex::new(&pattern).expect("valid regex")
});

static DAYS_AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([0-9]+)\s+days?\s+ago\b").expect("valid regex"));

/// Fixed relative markers with their day offset, checked in order
static RELATIVE_MARKERS: Lazy<Vec<(Regex, u64)>> = Lazy::new(|| {
    [
        (r"\bday before yesterday\b|\bपरसों\b", 2),
        (
            r"\byesterday\b|\bकल\b|\bநேற்று\b|\bనిన్న\b|\bನಿನ್ನೆ\b|\bগতকাল\b",
            1,
        ),
        (r"\blast week\b", 7),
        (r"\btoday\b|\bआज\b|\bஇன்று\b|\bఈరోజు\b|\bಇಂದು\b|\bআজ\b", 0),
    ]
    .into_iter()
    .map(|(pattern, days)| (Regex::new(pattern).expect("valid regex"), days))
    .collect()
});

static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"\b(last\s+)?({})\b", WEEKDAYS.join("|"));
    Regex::new(&pattern).expect("valid regex")
});

/// Resolve the date referenced by `text`, keeping the time of day of `now`
///
/// Falls back to `now` when the text carries no usable date.
pub fn extract_date(text: &str, now: NaiveDateTime, order: DateOrder) -> NaiveDateTime {
    let text = ascii_digits(&text.to_lowercase());
    resolve_date(&text, now.date(), order)
        .map(|date| date.and_time(now.time()))
        .unwrap_or(now)
}

fn resolve_date(text: &str, today: NaiveDate, order: DateOrder) -> Option<NaiveDate> {
    iso_date(text)
        .or_else(|| numeric_date(text, today, order))
        .or_else(|| month_name_date(text, today))
        .or_else(|| relative_date(text, today))
        .or_else(|| weekday_date(text, today))
}

fn iso_date(text: &str) -> Option<NaiveDate> {
    ISO_DATE.captures_iter(text).find_map(|caps| {
        NaiveDate::from_ymd_opt(
            number(&caps, 1)? as i32,
            number(&caps, 2)?,
            number(&caps, 3)?,
        )
    })
}

fn numeric_date(text: &str, today: NaiveDate, order: DateOrder) -> Option<NaiveDate> {
    SLASH_DATE
        .captures_iter(text)
        .chain(DASH_DATE.captures_iter(text))
        .find_map(|caps| {
            let (first, second) = (number(&caps, 1)?, number(&caps, 2)?);
            let year = caps.get(3).and_then(|m| m.as_str().parse::<i32>().ok()).map(
                |y| if y < 100 { 2000 + y } else { y },
            );
            let (day, month) = match order {
                DateOrder::DayFirst => (first, second),
                DateOrder::MonthFirst => (second, first),
            };
            // Swap when the configured order cannot be a date (13/04 month-first)
            build_date(year, month, day, today).or_else(|| build_date(year, day, month, today))
        })
}

fn month_name_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    MONTH_NAME_DATE.captures_iter(text).find_map(|caps| {
        let (day, name) = match (caps.get(1), caps.get(2)) {
            (Some(day), Some(name)) => (day.as_str(), name.as_str()),
            _ => (caps.get(4)?.as_str(), caps.get(3)?.as_str()),
        };
        let day = day.parse().ok()?;
        let month = month_number(name)?;
        let year = caps.get(5).and_then(|m| m.as_str().parse::<i32>().ok());
        build_date(year, month, day, today)
    })
}

fn relative_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    // "day before yesterday" has to win over plain "yesterday"
    let (before_yesterday, rest) = RELATIVE_MARKERS.split_first()?;
    let days = if before_yesterday.0.is_match(text) {
        before_yesterday.1
    } else if let Some(caps) = DAYS_AGO.captures(text) {
        caps[1].parse::<u64>().ok()?
    } else {
        rest.iter().find(|(re, _)| re.is_match(text))?.1
    };
    today.checked_sub_days(Days::new(days))
}

fn weekday_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = WEEKDAY.captures(text)?;
    let target = WEEKDAYS.iter().position(|d| *d == &caps[2])? as i64;
    let current = today.weekday().num_days_from_monday() as i64;
    let mut diff = (current - target + 7) % 7;
    if diff == 0 && caps.get(1).is_some() {
        diff = 7;
    }
    today.checked_sub_days(Days::new(diff as u64))
}

/// A calendar date; without a year, the most recent one on or before today
fn build_date(year: Option<i32>, month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day),
        // Look back far enough to find the previous Feb 29
        None => (0..=8)
            .filter_map(|back| NaiveDate::from_ymd_opt(today.year() - back, month, day))
            .find(|date| *date <= today),
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn number(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}
