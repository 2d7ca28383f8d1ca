//! Report query execution: date resolution, request build, reshaping.

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{PlanError, Result};
use crate::providers::{DimensionFilter, ReportProvider, ReportRequest, ReportResponse};

use super::{DateRangeSpec, ValidatedReportPlan};

/// Row cap sent with every report request.
const REPORT_ROW_LIMIT: i64 = 1000;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Resolved inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDateRange {
    pub start: String,
    pub end: String,
}

/// Plan echo attached to report output.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub metrics: Vec<String>,
    pub dimensions: Vec<String>,
    pub date_range: ResolvedDateRange,
}

/// Reshaped report output: one flat field-to-value object per row.
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub rows: Vec<Map<String, Value>>,
    pub totals: Map<String, Value>,
    pub row_count: i64,
    pub metadata: ReportMetadata,
}

/// Resolve a date range spec against today's UTC date.
///
/// Absolute specs must be well-formed ISO dates; anything else is fatal,
/// there is no fallback window.
pub fn resolve_date_range(range: &DateRangeSpec) -> Result<ResolvedDateRange> {
    resolve_from(range, Utc::now().date_naive())
}

fn resolve_from(range: &DateRangeSpec, today: NaiveDate) -> Result<ResolvedDateRange> {
    match range {
        DateRangeSpec::Relative { days } => {
            let start = today - Duration::days(*days as i64);
            Ok(ResolvedDateRange {
                start: start.format(DATE_FORMAT).to_string(),
                end: today.format(DATE_FORMAT).to_string(),
            })
        }
        DateRangeSpec::Absolute { start, end } => {
            let parsed_start = NaiveDate::parse_from_str(start, DATE_FORMAT)
                .map_err(|_| PlanError::InvalidDate(start.clone()))?;
            let parsed_end = NaiveDate::parse_from_str(end, DATE_FORMAT)
                .map_err(|_| PlanError::InvalidDate(end.clone()))?;
            Ok(ResolvedDateRange {
                start: parsed_start.format(DATE_FORMAT).to_string(),
                end: parsed_end.format(DATE_FORMAT).to_string(),
            })
        }
    }
}

/// Execute a validated plan against a report provider.
pub async fn execute(
    provider: &dyn ReportProvider,
    property_id: &str,
    plan: &ValidatedReportPlan,
) -> Result<ReportData> {
    let range = resolve_date_range(&plan.date_range)?;

    // Only the first validated filter reaches the provider; additional
    // clauses are ignored rather than AND-combined.
    let dimension_filter = plan.filters.first().map(|f| DimensionFilter {
        field: f.field.clone(),
        value: f.value.clone(),
    });

    let request = ReportRequest {
        property_id: property_id.to_string(),
        start_date: range.start.clone(),
        end_date: range.end.clone(),
        metrics: plan.metrics.clone(),
        dimensions: plan.dimensions.clone(),
        dimension_filter,
        limit: REPORT_ROW_LIMIT,
    };

    let response = provider.run_report(&request).await?;
    Ok(reshape(response, plan, range))
}

/// Zip header names with row values positionally into flat objects.
fn reshape(
    response: ReportResponse,
    plan: &ValidatedReportPlan,
    range: ResolvedDateRange,
) -> ReportData {
    let mut rows = Vec::with_capacity(response.rows.len());
    for row in &response.rows {
        let mut flat = Map::new();
        for (header, value) in response.dimension_headers.iter().zip(&row.dimension_values) {
            flat.insert(header.clone(), Value::String(value.clone()));
        }
        for (header, value) in response.metric_headers.iter().zip(&row.metric_values) {
            flat.insert(header.clone(), Value::String(value.clone()));
        }
        rows.push(flat);
    }

    let mut totals = Map::new();
    for total_row in &response.totals {
        for (header, value) in response.metric_headers.iter().zip(&total_row.metric_values) {
            totals.insert(header.clone(), Value::String(value.clone()));
        }
    }

    ReportData {
        rows,
        totals,
        row_count: response.row_count,
        metadata: ReportMetadata {
            metrics: plan.metrics.clone(),
            dimensions: plan.dimensions.clone(),
            date_range: range,
        },
    }
}
