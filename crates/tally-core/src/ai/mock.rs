//! Mock backend for testing
//!
//! Answers without any network. By default it echoes what the keyword tables
//! find in the text, which makes it usable for development without a model.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::classify::classify;
use crate::error::RemoteParseError;
use crate::extract::amount::{detect_currency, first_numeral};

use super::types::RemoteExpense;
use super::ParseBackend;

/// How the mock answers
#[derive(Debug, Clone, Default)]
pub enum MockBehavior {
    /// Build a response from the text with the local extractors
    #[default]
    Echo,
    /// Always return this response
    Fixed(RemoteExpense),
    /// Always fail with a malformed-response error
    Fail,
    /// Sleep, then answer like `Echo`
    Delay(Duration),
}

/// Mock parse backend for testing
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    pub behavior: MockBehavior,
}

impl MockBackend {
    /// Create a new mock backend (healthy, echoing)
    pub fn new() -> Self {
        Self {
            healthy: true,
            behavior: MockBehavior::Echo,
        }
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            healthy: true,
            behavior,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            behavior: MockBehavior::Fail,
        }
    }

    fn echo(text: &str, today: NaiveDate) -> RemoteExpense {
        RemoteExpense {
            amount: first_numeral(text),
            category: Some(classify(text).as_str().to_string()),
            description: Some(text.trim().to_string()),
            date: Some(today.format("%Y-%m-%d").to_string()),
            confidence: Some(0.95),
            currency: detect_currency(text).map(|c| c.code().to_string()),
            success: None,
            error: None,
        }
    }
}

#[async_trait]
impl ParseBackend for MockBackend {
    async fn parse_expense(
        &self,
        text: &str,
        _categories: &[&str],
        today: NaiveDate,
    ) -> Result<RemoteExpense, RemoteParseError> {
        match &self.behavior {
            MockBehavior::Echo => Ok(Self::echo(text, today)),
            MockBehavior::Fixed(expense) => Ok(expense.clone()),
            MockBehavior::Fail => Err(RemoteParseError::Malformed(
                "mock backend configured to fail".into(),
            )),
            MockBehavior::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(Self::echo(text, today))
            }
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
