//! Parse service backend
//!
//! Talks to a hosted `/parseExpense` endpoint that owns its own model and
//! prompt. Request: `{ "text", "categories" }`. Response: the expense JSON,
//! optionally inside a `{ "success": ... }` envelope.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::RemoteParseError;

use super::parsing::parse_remote_expense;
use super::types::RemoteExpense;
use super::{ensure_success, is_reachable, ParseBackend};

const SERVICE_MODEL: &str = "parse-service";

/// Client for the hosted parse service
#[derive(Clone)]
pub struct ServiceBackend {
    client: Client,
    host: String,
}

impl ServiceBackend {
    pub fn new(host: &str) -> Self {
        Self {
            client: Client::new(),
            host: host.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ServiceRequest<'a> {
    text: &'a str,
    categories: &'a [&'a str],
}

#[async_trait]
impl ParseBackend for ServiceBackend {
    async fn parse_expense(
        &self,
        text: &str,
        categories: &[&str],
        _today: NaiveDate,
    ) -> Result<RemoteExpense, RemoteParseError> {
        let request = ServiceRequest { text, categories };

        let response = self
            .client
            .post(format!("{}/parseExpense", self.host))
            .json(&request)
            .send()
            .await?;
        let body = ensure_success(response).await?.text().await?;
        debug!("Parse service answered: {}", body);

        parse_remote_expense(&body)
    }

    async fn health_check(&self) -> bool {
        is_reachable(self.client.get(format!("{}/health", self.host))).await
    }

    fn model(&self) -> &str {
        SERVICE_MODEL
    }

    fn host(&self) -> &str {
        &self.host
    }
}
