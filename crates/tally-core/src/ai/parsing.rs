//! JSON extraction from remote parse responses
//!
//! Models wrap their JSON in markdown fences or surround it with prose, so we
//! parse the text from the first `{` to the last `}`.

use chrono::NaiveDate;

use crate::error::RemoteParseError;

use super::types::RemoteExpense;

/// Longest raw excerpt kept in error messages
const RAW_EXCERPT_LEN: usize = 200;

/// Parse a remote expense out of a model or service response body
pub fn parse_remote_expense(response: &str) -> Result<RemoteExpense, RemoteParseError> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    let expense: RemoteExpense = match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &response[s..=e];
            serde_json::from_str(json_str).map_err(|e| {
                RemoteParseError::Malformed(format!(
                    "Invalid JSON from parse backend: {} | Raw: {}",
                    e,
                    excerpt(json_str)
                ))
            })?
        }
        _ => {
            return Err(RemoteParseError::Malformed(format!(
                "No JSON found in parse response | Raw: {}",
                excerpt(response)
            )))
        }
    };

    if expense.success == Some(false) {
        return Err(RemoteParseError::Rejected(
            expense
                .error
                .unwrap_or_else(|| "parse service reported failure".to_string()),
        ));
    }

    Ok(expense)
}

/// Parse a `YYYY-MM-DD` date, tolerating a trailing time part
pub fn parse_remote_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    let day_part = date.get(..10).unwrap_or(date);
    NaiveDate::parse_from_str(day_part, "%Y-%m-%d").ok()
}

/// Cut a raw response down for logs and errors
pub fn excerpt(raw: &str) -> String {
    if raw.chars().count() > RAW_EXCERPT_LEN {
        let cut: String = raw.chars().take(RAW_EXCERPT_LEN).collect();
        format!("{}...", cut)
    } else {
        raw.to_string()
    }
}
