//! Spreadsheet values provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::SeoProviderConfig;
use crate::error::{ProviderError, Result};

use super::TableProvider;

/// Table provider backed by the Sheets API `values.get` endpoint.
pub struct SheetsTableProvider {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    range: String,
    access_token: String,
}

/// Values response format. Cells arrive as arbitrary JSON scalars.
#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsTableProvider {
    /// Create a new table provider from configuration.
    pub fn from_config(config: &SeoProviderConfig) -> Result<Self> {
        let access_token = config.resolve_token()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.range.clone(),
            access_token,
        })
    }

    fn coerce_cell(value: Value) -> String {
        match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl TableProvider for SheetsTableProvider {
    fn source_id(&self) -> &str {
        &self.spreadsheet_id
    }

    async fn fetch_values(&self) -> Result<Vec<Vec<String>>> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, self.range
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Request("Request timed out".to_string())
                } else if e.is_connect() {
                    ProviderError::Request(format!("Connection failed: {}", e))
                } else {
                    ProviderError::Request(e.to_string())
                }
            })?;

        let status = response.status();

        if status.is_success() {
            let result: ValuesResponse = response
                .json()
                .await
                .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

            Ok(result
                .values
                .into_iter()
                .map(|row| row.into_iter().map(Self::coerce_cell).collect())
                .collect())
        } else if status.as_u16() == 429 {
            Err(ProviderError::RateLimited.into())
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ProviderError::Api { status: status.as_u16(), message }.into())
        }
    }
}
