//! Pluggable remote parse backends
//!
//! # Architecture
//!
//! - `ParseBackend` trait: turns free text into a [`RemoteExpense`]
//! - `ParseClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `ServiceBackend`, `GeminiBackend`,
//!   `OllamaBackend`, `MockBackend`
//!
//! Backends only fetch and decode. Bounding the call with a timeout and
//! turning the response into an expense candidate is the parser's job.
//!
//! # Configuration
//!
//! Built from the `[parser]` config section (see [`crate::config`]):
//! - `backend`: none, service, gemini, ollama or mock
//! - `host`: service URL, Gemini API root (empty for the public API) or Ollama host
//! - `model`: model name for gemini and ollama
//! - `GEMINI_API_KEY`: required for the gemini backend

mod gemini;
mod mock;
mod ollama;
pub mod parsing;
pub mod prompt;
mod service;
pub mod types;

pub use gemini::{GeminiBackend, DEFAULT_GEMINI_HOST};
pub use mock::{MockBackend, MockBehavior};
pub use ollama::OllamaBackend;
pub use service::ServiceBackend;
pub use types::*;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::warn;

use crate::config::ParserConfig;
use crate::error::RemoteParseError;

/// Trait defining the interface for all remote parse backends
#[async_trait]
pub trait ParseBackend: Send + Sync {
    /// Extract expense fields from free text
    ///
    /// `categories` is the closed category list the answer must use and
    /// `today` anchors relative dates.
    async fn parse_expense(
        &self,
        text: &str,
        categories: &[&str],
        today: NaiveDate,
    ) -> Result<RemoteExpense, RemoteParseError>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete parse client enum
#[derive(Clone)]
pub enum ParseClient {
    /// Hosted `/parseExpense` service
    Service(ServiceBackend),
    /// Gemini `generateContent`
    Gemini(GeminiBackend),
    /// Local Ollama server
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl ParseClient {
    /// Create a client from the `[parser]` config section
    ///
    /// Returns None when remote parsing is disabled or the selected backend
    /// is missing a required setting.
    pub fn from_config(config: &ParserConfig) -> Option<Self> {
        match config.backend {
            BackendKind::None => None,
            BackendKind::Service => {
                if config.host.trim().is_empty() {
                    warn!("Parse backend 'service' needs a host, remote parsing disabled");
                    return None;
                }
                Some(ParseClient::Service(ServiceBackend::new(&config.host)))
            }
            BackendKind::Gemini => match config.api_key.as_deref() {
                Some(key) if !key.trim().is_empty() => Some(ParseClient::Gemini(
                    GeminiBackend::new(&config.host, &config.model, key),
                )),
                _ => {
                    warn!("Parse backend 'gemini' needs GEMINI_API_KEY, remote parsing disabled");
                    None
                }
            },
            BackendKind::Ollama => {
                if config.host.trim().is_empty() {
                    warn!("Parse backend 'ollama' needs a host, remote parsing disabled");
                    return None;
                }
                Some(ParseClient::Ollama(OllamaBackend::new(
                    &config.host,
                    &config.model,
                )))
            }
            BackendKind::Mock => Some(ParseClient::Mock(MockBackend::new())),
        }
    }

    /// Create a parse service client directly
    pub fn service(host: &str) -> Self {
        ParseClient::Service(ServiceBackend::new(host))
    }

    /// Create a Gemini client directly
    pub fn gemini(host: &str, model: &str, api_key: &str) -> Self {
        ParseClient::Gemini(GeminiBackend::new(host, model, api_key))
    }

    /// Create an Ollama client directly
    pub fn ollama(host: &str, model: &str) -> Self {
        ParseClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock client for testing
    pub fn mock() -> Self {
        ParseClient::Mock(MockBackend::new())
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            ParseClient::Service(_) => BackendKind::Service,
            ParseClient::Gemini(_) => BackendKind::Gemini,
            ParseClient::Ollama(_) => BackendKind::Ollama,
            ParseClient::Mock(_) => BackendKind::Mock,
        }
    }
}

// Implement ParseBackend for ParseClient by delegating to the inner backend
#[async_trait]
impl ParseBackend for ParseClient {
    async fn parse_expense(
        &self,
        text: &str,
        categories: &[&str],
        today: NaiveDate,
    ) -> Result<RemoteExpense, RemoteParseError> {
        match self {
            ParseClient::Service(b) => b.parse_expense(text, categories, today).await,
            ParseClient::Gemini(b) => b.parse_expense(text, categories, today).await,
            ParseClient::Ollama(b) => b.parse_expense(text, categories, today).await,
            ParseClient::Mock(b) => b.parse_expense(text, categories, today).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ParseClient::Service(b) => b.health_check().await,
            ParseClient::Gemini(b) => b.health_check().await,
            ParseClient::Ollama(b) => b.health_check().await,
            ParseClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            ParseClient::Service(b) => b.model(),
            ParseClient::Gemini(b) => b.model(),
            ParseClient::Ollama(b) => b.model(),
            ParseClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            ParseClient::Service(b) => b.host(),
            ParseClient::Gemini(b) => b.host(),
            ParseClient::Ollama(b) => b.host(),
            ParseClient::Mock(b) => b.host(),
        }
    }
}

/// Turn a non-2xx response into `RemoteParseError::Status`
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, RemoteParseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RemoteParseError::Status {
        status: status.as_u16(),
        body: parsing::excerpt(&body),
    })
}

/// Health check: true when the request succeeds with a 2xx status
pub(crate) async fn is_reachable(request: reqwest::RequestBuilder) -> bool {
    matches!(request.send().await, Ok(r) if r.status().is_success())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser_config(backend: BackendKind, host: &str, api_key: Option<&str>) -> ParserConfig {
        ParserConfig {
            backend,
            host: host.to_string(),
            model: "gemini-2.0-flash".to_string(),
            timeout_secs: 10,
            api_key: api_key.map(String::from),
        }
    }

    #[test]
    fn test_from_config_disabled() {
        assert!(ParseClient::from_config(&parser_config(BackendKind::None, "", None)).is_none());
    }

    #[test]
    fn test_from_config_requires_settings() {
        assert!(ParseClient::from_config(&parser_config(BackendKind::Service, " ", None)).is_none());
        assert!(ParseClient::from_config(&parser_config(BackendKind::Ollama, "", None)).is_none());
        assert!(ParseClient::from_config(&parser_config(BackendKind::Gemini, "", None)).is_none());
    }

    #[test]
    fn test_from_config_builds_backends() {
        let client =
            ParseClient::from_config(&parser_config(BackendKind::Service, "http://svc/", None))
                .unwrap();
        assert_eq!(client.kind(), BackendKind::Service);
        assert_eq!(client.host(), "http://svc");

        let client =
            ParseClient::from_config(&parser_config(BackendKind::Gemini, "", Some("key"))).unwrap();
        assert_eq!(client.kind(), BackendKind::Gemini);
        assert_eq!(client.model(), "gemini-2.0-flash");

        let client =
            ParseClient::from_config(&parser_config(BackendKind::Mock, "", None)).unwrap();
        assert_eq!(client.model(), "mock");
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("Gemini".parse::<BackendKind>().unwrap(), BackendKind::Gemini);
        assert_eq!("".parse::<BackendKind>().unwrap(), BackendKind::None);
        assert!("openai".parse::<BackendKind>().is_err());
    }

    #[tokio::test]
    async fn test_mock_client_delegates() {
        let client = ParseClient::mock();
        assert_eq!(client.kind(), BackendKind::Mock);
        assert!(client.health_check().await);

        let expense = client
            .parse_expense(
                "taxi 300",
                &[],
                NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(expense.amount, Some(300.0));
        assert_eq!(expense.category.as_deref(), Some("Travel"));
    }
}
