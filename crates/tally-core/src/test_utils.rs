//! Test utilities for tally-core
//!
//! A mock remote parse server speaking all three HTTP contracts: the
//! `/parseExpense` service, Gemini `generateContent` and Ollama
//! `/api/generate`. Answers are derived from the request text with the local
//! extractors, wrapped according to the server's [`ServerMode`].

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::classify::classify;
use crate::extract::amount::{detect_currency, first_numeral};

/// How the mock server answers parse requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
    /// Plain JSON answer
    Ok,
    /// JSON inside a markdown code fence
    Fenced,
    /// Prose with no JSON in it
    Malformed,
    /// `{"success": false}` envelope
    Rejected,
    /// JSON carrying only the amount
    Incomplete,
    /// HTTP 500
    Error,
    /// Valid answer after a delay
    Slow(Duration),
}

struct ServerState {
    mode: ServerMode,
    hits: AtomicUsize,
}

/// Mock remote parse server for testing and development
pub struct MockParseServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockParseServer {
    /// Start a server that answers with plain JSON
    pub async fn start() -> Self {
        Self::start_with(ServerMode::Ok).await
    }

    /// Start the mock server on an available port
    pub async fn start_with(mode: ServerMode) -> Self {
        let state = Arc::new(ServerState {
            mode,
            hits: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/health", get(handle_health))
            .route("/parseExpense", post(handle_parse_expense))
            .route("/api/tags", get(handle_health))
            .route("/api/generate", post(handle_generate))
            .route("/v1beta/models/*rest", post(handle_gemini))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of parse requests received
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockParseServer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl ServerState {
    /// Model text for `text`, or a ready-made error response
    async fn answer(&self, text: &str, today: NaiveDate) -> Result<String, Response> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let json = expense_json(text, today);
        match self.mode {
            ServerMode::Ok => Ok(json),
            ServerMode::Fenced => Ok(format!("```json\n{}\n```", json)),
            ServerMode::Malformed => Ok("Sorry, I could not find an expense in that.".into()),
            ServerMode::Rejected => {
                Ok(r#"{"success": false, "error": "Invalid amount"}"#.to_string())
            }
            ServerMode::Incomplete => Ok(serde_json::json!({
                "amount": first_numeral(text).unwrap_or(0.0)
            })
            .to_string()),
            ServerMode::Error => {
                Err((StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response())
            }
            ServerMode::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(json)
            }
        }
    }
}

/// Expense JSON the way a model would answer
fn expense_json(text: &str, today: NaiveDate) -> String {
    let body = MockExpense {
        amount: first_numeral(text).unwrap_or(0.0),
        category: classify(text).as_str().to_string(),
        description: text.trim().to_string(),
        date: today.format("%Y-%m-%d").to_string(),
        confidence: 0.95,
        currency: detect_currency(text).map(|c| c.code().to_string()),
    };
    serde_json::to_string(&body).unwrap()
}

/// Reference date stated in a backend prompt, else the local date
fn today_from_prompt(prompt: &str) -> NaiveDate {
    prompt
        .split("today's date: ")
        .nth(1)
        .and_then(|rest| rest.get(..10))
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Local::now().date_naive())
}

/// Pull the user text out of a backend prompt
fn text_from_prompt(prompt: &str) -> &str {
    prompt
        .split("Text: \"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap_or(prompt)
}

async fn handle_health() -> StatusCode {
    StatusCode::OK
}

/// Parse service endpoint
async fn handle_parse_expense(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ServiceRequest>,
) -> Response {
    // The hosted service dates answers itself
    match state.answer(&request.text, Local::now().date_naive()).await {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(response) => response,
    }
}

/// Ollama generate endpoint
async fn handle_generate(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let today = today_from_prompt(&request.prompt);
    match state.answer(text_from_prompt(&request.prompt), today).await {
        Ok(response) => Json(GenerateResponse {
            model: request.model,
            response,
            done: true,
        })
        .into_response(),
        Err(response) => response,
    }
}

/// Gemini generateContent endpoint
async fn handle_gemini(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<serde_json::Value>,
) -> Response {
    let prompt = request["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    match state
        .answer(text_from_prompt(&prompt), today_from_prompt(&prompt))
        .await
    {
        Ok(text) => Json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
        .into_response(),
        Err(response) => response,
    }
}

#[derive(Debug, Deserialize)]
struct ServiceRequest {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

#[derive(Debug, Serialize)]
struct MockExpense {
    amount: f64,
    category: String,
    description: String,
    date: String,
    confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_from_prompt() {
        let prompt = crate::ai::prompt::expense_prompt(
            "taxi 300",
            &["Travel"],
            chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        );
        assert_eq!(text_from_prompt(&prompt), "taxi 300");
    }

    #[test]
    fn test_today_from_prompt() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let prompt = crate::ai::prompt::expense_prompt("taxi 300", &["Travel"], today);
        assert_eq!(today_from_prompt(&prompt), today);
    }

    #[test]
    fn test_expense_json() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&expense_json("$12 uber", today)).unwrap();
        assert_eq!(json["amount"], 12.0);
        assert_eq!(json["category"], "Travel");
        assert_eq!(json["date"], "2024-03-15");
        assert_eq!(json["currency"], "USD");
    }
}
