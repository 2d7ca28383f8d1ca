//! Analytics Data API report provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AnalyticsProviderConfig;
use crate::error::{ProviderError, Result};

use super::{ReportProvider, ReportRequest, ReportResponse, ReportRow};

/// Report provider backed by the GA4 Data API `runReport` endpoint.
pub struct Ga4ReportProvider {
    client: Client,
    base_url: String,
    access_token: String,
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReportRequest<'a> {
    date_ranges: Vec<WireDateRange<'a>>,
    metrics: Vec<WireName<'a>>,
    dimensions: Vec<WireName<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimension_filter: Option<WireFilterExpression<'a>>,
    limit: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireDateRange<'a> {
    start_date: &'a str,
    end_date: &'a str,
}

#[derive(Debug, Serialize)]
struct WireName<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct WireFilterExpression<'a> {
    filter: WireFilter<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireFilter<'a> {
    field_name: &'a str,
    string_filter: WireStringFilter<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireStringFilter<'a> {
    match_type: &'a str,
    value: &'a str,
    case_sensitive: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunReportResponse {
    #[serde(default)]
    dimension_headers: Vec<WireHeader>,
    #[serde(default)]
    metric_headers: Vec<WireHeader>,
    #[serde(default)]
    rows: Vec<WireRow>,
    #[serde(default)]
    totals: Vec<WireRow>,
    #[serde(default)]
    row_count: i64,
}

#[derive(Debug, Deserialize)]
struct WireHeader {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRow {
    #[serde(default)]
    dimension_values: Vec<WireValue>,
    #[serde(default)]
    metric_values: Vec<WireValue>,
}

#[derive(Debug, Deserialize)]
struct WireValue {
    #[serde(default)]
    value: String,
}

impl Ga4ReportProvider {
    /// Create a new report provider from configuration.
    pub fn from_config(config: &AnalyticsProviderConfig) -> Result<Self> {
        let access_token = config.resolve_token()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn build_body(request: &ReportRequest) -> RunReportRequest<'_> {
        RunReportRequest {
            date_ranges: vec![WireDateRange {
                start_date: &request.start_date,
                end_date: &request.end_date,
            }],
            metrics: request.metrics.iter().map(|m| WireName { name: m }).collect(),
            dimensions: request.dimensions.iter().map(|d| WireName { name: d }).collect(),
            dimension_filter: request.dimension_filter.as_ref().map(|f| WireFilterExpression {
                filter: WireFilter {
                    field_name: &f.field,
                    string_filter: WireStringFilter {
                        match_type: "CONTAINS",
                        value: &f.value,
                        case_sensitive: false,
                    },
                },
            }),
            limit: request.limit,
        }
    }
}

#[async_trait]
impl ReportProvider for Ga4ReportProvider {
    async fn run_report(&self, request: &ReportRequest) -> Result<ReportResponse> {
        // Accept both bare ids and the resource-name form
        let property_id = request.property_id.trim_start_matches("properties/");
        let url = format!("{}/v1beta/properties/{}:runReport", self.base_url, property_id);

        let body = Self::build_body(request);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
            .json(&body)
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
            let result: RunReportResponse = response
                .json()
                .await
                .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
            Ok(convert_response(result))
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

fn convert_response(wire: RunReportResponse) -> ReportResponse {
    let convert_row = |row: WireRow| ReportRow {
        dimension_values: row.dimension_values.into_iter().map(|v| v.value).collect(),
        metric_values: row.metric_values.into_iter().map(|v| v.value).collect(),
    };

    ReportResponse {
        dimension_headers: wire.dimension_headers.into_iter().map(|h| h.name).collect(),
        metric_headers: wire.metric_headers.into_iter().map(|h| h.name).collect(),
        rows: wire.rows.into_iter().map(convert_row).collect(),
        totals: wire.totals.into_iter().map(convert_row).collect(),
        row_count: wire.row_count,
    }
}
