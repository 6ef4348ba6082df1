//! Gemini backend
//!
//! Calls `generateContent` directly with the extraction prompt and reads the
//! model text from `candidates[0].content.parts[0].text`.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RemoteParseError;

use super::parsing::parse_remote_expense;
use super::prompt::expense_prompt;
use super::types::RemoteExpense;
use super::{ensure_success, is_reachable, ParseBackend};

/// Public Gemini API root
pub const DEFAULT_GEMINI_HOST: &str = "https://generativelanguage.googleapis.com";

/// Gemini `generateContent` backend
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    host: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    /// Create a backend; an empty `host` means the public API
    pub fn new(host: &str, model: &str, api_key: &str) -> Self {
        let host = match host.trim() {
            "" => DEFAULT_GEMINI_HOST,
            h => h,
        };
        Self {
            client: Client::new(),
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1beta/models/{}{}", self.host, self.model, method)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[async_trait]
impl ParseBackend for GeminiBackend {
    async fn parse_expense(
        &self,
        text: &str,
        categories: &[&str],
        today: NaiveDate,
    ) -> Result<RemoteExpense, RemoteParseError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(expense_prompt(text, categories, today)),
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint(":generateContent"))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;
        let body: GenerateResponse = ensure_success(response).await?.json().await?;
        let model_text = body.first_text().ok_or_else(|| {
            RemoteParseError::Malformed("Gemini response has no candidate text".into())
        })?;
        debug!(model = %self.model, "Gemini answered: {}", model_text);

        parse_remote_expense(model_text)
    }

    async fn health_check(&self) -> bool {
        if self.api_key.is_empty() {
            return false;
        }
        is_reachable(
            self.client
                .get(self.endpoint(""))
                .query(&[("key", self.api_key.as_str())]),
        )
        .await
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let backend = GeminiBackend::new("http://localhost:9000/", "gemini-2.0-flash", "k");
        assert_eq!(
            backend.endpoint(":generateContent"),
            "http://localhost:9000/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_empty_host_uses_public_api() {
        let backend = GeminiBackend::new("", "gemini-2.0-flash", "k");
        assert_eq!(backend.host(), DEFAULT_GEMINI_HOST);
    }

    #[test]
    fn test_first_text() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"amount\": 5}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(body.first_text(), Some("{\"amount\": 5}"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.first_text(), None);
    }
}
