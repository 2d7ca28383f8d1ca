//! Provider traits and the neutral request/response types they exchange.

use async_trait::async_trait;

use crate::error::Result;

/// A single dimension filter. Report requests carry at most one.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionFilter {
    pub field: String,
    pub value: String,
}

/// A fully resolved report request.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Property identifier, without any `properties/` prefix.
    pub property_id: String,
    /// Inclusive start date, `YYYY-MM-DD`.
    pub start_date: String,
    /// Inclusive end date, `YYYY-MM-DD`.
    pub end_date: String,
    pub metrics: Vec<String>,
    pub dimensions: Vec<String>,
    pub dimension_filter: Option<DimensionFilter>,
    pub limit: i64,
}

/// One row of report output. Value order matches the response header order;
/// that correspondence is the provider's contract and is not re-checked.
#[derive(Debug, Clone, Default)]
pub struct ReportRow {
    pub dimension_values: Vec<String>,
    pub metric_values: Vec<String>,
}

/// Raw report output before reshaping.
#[derive(Debug, Clone, Default)]
pub struct ReportResponse {
    pub dimension_headers: Vec<String>,
    pub metric_headers: Vec<String>,
    pub rows: Vec<ReportRow>,
    pub totals: Vec<ReportRow>,
    pub row_count: i64,
}

/// Source of aggregated website analytics reports.
#[async_trait]
pub trait ReportProvider: Send + Sync {
    async fn run_report(&self, request: &ReportRequest) -> Result<ReportResponse>;
}

/// Source of a rectangular value table (first row is the header row).
#[async_trait]
pub trait TableProvider: Send + Sync {
    /// Stable identifier for the underlying dataset, used as the cache key.
    fn source_id(&self) -> &str;

    async fn fetch_values(&self) -> Result<Vec<Vec<String>>>;
}
