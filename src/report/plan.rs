//! Report plan types, parsing, and validation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::oracle::extract_json_object;

use super::vocab::{resolve_dimension, resolve_metric};

/// Date range requested by a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DateRangeSpec {
    /// Trailing window ending today.
    Relative {
        #[serde(default = "default_relative_days")]
        days: u32,
    },
    /// Explicit ISO dates, parsed at execution time.
    Absolute { start: String, end: String },
}

fn default_relative_days() -> u32 {
    7
}

impl Default for DateRangeSpec {
    fn default() -> Self {
        DateRangeSpec::Relative { days: 7 }
    }
}

/// Filter clause as extracted from oracle output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDimensionFilter {
    pub dimension: String,
    pub value: String,
}

/// Sort request carried through the plan but not sent to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderBySpec {
    pub field: String,
    pub descending: bool,
}

/// Reporting plan as extracted from oracle output, prior to validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawReportPlan {
    pub metrics: Vec<String>,
    pub dimensions: Vec<String>,
    pub date_range: Option<DateRangeSpec>,
    pub filters: Vec<RawDimensionFilter>,
    pub order_by: Option<OrderBySpec>,
}

impl RawReportPlan {
    /// The plan used when the oracle's output cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            metrics: vec![
                "screenPageViews".to_string(),
                "totalUsers".to_string(),
                "sessions".to_string(),
            ],
            dimensions: vec!["date".to_string()],
            date_range: Some(DateRangeSpec::Relative { days: 7 }),
            filters: vec![],
            order_by: None,
        }
    }
}

/// Filter clause with its field resolved to a canonical dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionFilterClause {
    pub field: String,
    pub value: String,
}

/// Reporting plan after vocabulary validation. Everything in here is safe
/// to hand to a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedReportPlan {
    pub metrics: Vec<String>,
    pub dimensions: Vec<String>,
    pub date_range: DateRangeSpec,
    pub filters: Vec<DimensionFilterClause>,
    pub order_by: Option<OrderBySpec>,
}

/// Parse oracle output into a raw plan, falling back to the default plan
/// when the text carries no usable JSON object.
pub fn parse_plan(text: &str) -> RawReportPlan {
    if let Some(span) = extract_json_object(text) {
        match serde_json::from_str::<RawReportPlan>(span) {
            Ok(plan) => return plan,
            Err(e) => debug!("Report plan did not parse ({}), using fallback", e),
        }
    } else {
        debug!("No JSON object in oracle output, using fallback report plan");
    }
    RawReportPlan::fallback()
}

/// Validate a raw plan against the vocabulary.
///
/// Pure function: unresolvable names are dropped (and returned), resolved
/// names are deduplicated in first-occurrence order, and an empty metric
/// list gets the single default metric. Never fails.
pub fn validate(raw: RawReportPlan) -> (ValidatedReportPlan, Vec<String>) {
    let mut dropped = Vec::new();

    let mut metrics: Vec<String> = Vec::new();
    for metric in &raw.metrics {
        match resolve_metric(metric) {
            Some(api_name) => {
                if !metrics.iter().any(|m| m == api_name) {
                    metrics.push(api_name.to_string());
                }
            }
            None => dropped.push(format!("metric:{}", metric)),
        }
    }
    if metrics.is_empty() {
        metrics.push("screenPageViews".to_string());
    }

    let mut dimensions: Vec<String> = Vec::new();
    for dimension in &raw.dimensions {
        match resolve_dimension(dimension) {
            Some(api_name) => {
                if !dimensions.iter().any(|d| d == api_name) {
                    dimensions.push(api_name.to_string());
                }
            }
            None => dropped.push(format!("dimension:{}", dimension)),
        }
    }

    let mut filters = Vec::new();
    for filter in &raw.filters {
        match resolve_dimension(&filter.dimension) {
            Some(api_name) => filters.push(DimensionFilterClause {
                field: api_name.to_string(),
                value: filter.value.clone(),
            }),
            None => dropped.push(format!("filter:{}", filter.dimension)),
        }
    }

    let validated = ValidatedReportPlan {
        metrics,
        dimensions,
        date_range: raw.date_range.unwrap_or_default(),
        filters,
        order_by: raw.order_by,
    };

    (validated, dropped)
}
