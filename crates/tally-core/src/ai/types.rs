//! Remote parse response types
//!
//! Shared by every backend. Fields are optional so that an incomplete answer
//! still deserializes; the parser then rejects it and parses locally.

use serde::{Deserialize, Serialize};

/// Expense fields as returned by a remote backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteExpense {
    /// Major-unit amount
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// ISO 4217 code
    #[serde(default)]
    pub currency: Option<String>,
    /// Parse-service envelope flag; `false` means the service gave up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Parse-service error message when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Which remote backend a client talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Remote parsing disabled
    #[default]
    None,
    /// The `/parseExpense` HTTP service
    Service,
    /// Google Gemini `generateContent`
    Gemini,
    /// Ollama `/api/generate`
    Ollama,
    /// In-process mock
    Mock,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Service => "service",
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" | "" => Ok(Self::None),
            "service" | "function" => Ok(Self::Service),
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            other => Err(crate::error::Error::Config(format!(
                "Unknown parse backend: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
