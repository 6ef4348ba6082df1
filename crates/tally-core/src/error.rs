//! Error types for Tally

use thiserror::Error;

use crate::models::ValidationReport;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unrecognized category: {0}")]
    UnrecognizedCategory(String),

    #[error("Invalid budget definition: {0}")]
    InvalidBudget(String),

    #[error("Validation failed: {}", .0.errors.join("; "))]
    Validation(ValidationReport),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a remote parse attempt did not produce a candidate.
///
/// Never surfaced to end users: the parser logs it and falls back to the
/// local rule-based path.
#[derive(Error, Debug)]
pub enum RemoteParseError {
    #[error("no remote parse backend configured")]
    NotConfigured,

    #[error("remote parse timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response rejected: {0}")]
    Rejected(String),
}
