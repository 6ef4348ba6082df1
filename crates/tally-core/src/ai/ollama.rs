//! Ollama backend
//!
//! Sends the extraction prompt to a local Ollama server (`/api/generate`,
//! no streaming) and reads the model text from `response`.

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

/// Local Ollama server backend
#[derive(Clone)]
pub struct OllamaBackend {
    client: Client,
    host: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(host: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[async_trait]
impl ParseBackend for OllamaBackend {
    async fn parse_expense(
        &self,
        text: &str,
        categories: &[&str],
        today: NaiveDate,
    ) -> Result<RemoteExpense, RemoteParseError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: expense_prompt(text, categories, today),
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.host))
            .json(&request)
            .send()
            .await?;
        let body: GenerateResponse = ensure_success(response).await?.json().await?;
        debug!(model = %self.model, "Ollama answered: {}", body.response);

        parse_remote_expense(&body.response)
    }

    async fn health_check(&self) -> bool {
        is_reachable(self.client.get(format!("{}/api/tags", self.host))).await
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.host
    }
}
