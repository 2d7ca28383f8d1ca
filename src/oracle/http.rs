//! HTTP oracle client (OpenAI-compatible chat completions).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::OracleConfig;
use crate::error::{OracleError, Result};

use super::TextOracle;

const MAX_COMPLETION_TOKENS: u32 = 4096;

/// OpenAI-compatible chat completions client with bounded retry.
pub struct HttpOracle {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

/// Chat completion request format.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completion response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// API error response format.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl HttpOracle {
    /// Create a new oracle client from configuration.
    pub fn from_config(config: &OracleConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OracleError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            max_retries: config.max_retries.max(1),
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    /// One chat completion attempt.
    async fn request_completion(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> std::result::Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature,
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout
                } else if e.is_connect() {
                    OracleError::Connection(e.to_string())
                } else {
                    OracleError::Request(e.to_string())
                }
            })?;

        let status = response.status();

        if status.is_success() {
            let result: ChatResponse = response
                .json()
                .await
                .map_err(|e| OracleError::Request(format!("Failed to parse response: {}", e)))?;

            match result.choices.into_iter().next() {
                Some(choice) => Ok(choice.message.content),
                None => Err(OracleError::EmptyResponse),
            }
        } else if status.as_u16() == 429 {
            Err(OracleError::RateLimited)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            // Try to parse as an OpenAI-style error body
            let message = match serde_json::from_str::<ErrorResponse>(&error_text) {
                Ok(body) => body.error.message,
                Err(_) => error_text,
            };

            Err(OracleError::Api { status: status.as_u16(), message })
        }
    }

    /// Whether an attempt error is worth retrying.
    fn is_transient(error: &OracleError) -> bool {
        match error {
            OracleError::Timeout | OracleError::Connection(_) | OracleError::RateLimited => true,
            OracleError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[async_trait]
impl TextOracle for HttpOracle {
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let mut last_error: Option<OracleError> = None;

        for attempt in 1..=self.max_retries {
            debug!("Oracle completion attempt {} of {}", attempt, self.max_retries);

            match self.request_completion(system, user, temperature).await {
                Ok(text) => return Ok(text),
                Err(e) if Self::is_transient(&e) => {
                    if attempt < self.max_retries {
                        // 1s, 2s, 4s, ... for the default base delay
                        let delay = self.retry_base_delay * 2u32.pow(attempt - 1);
                        warn!(
                            "Oracle attempt {} failed ({}), retrying in {:?}",
                            attempt, e, delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let last = last_error.map(|e| e.to_string()).unwrap_or_default();
        Err(OracleError::Exhausted {
            attempts: self.max_retries,
            last_error: last,
        }
        .into())
    }
}
