//! Table plan types, parsing, and validation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::oracle::extract_json_object;

use super::columns::resolve_column;

/// High-level operation named by the plan. Informational: execution is
/// driven by the filter/group/select/limit fields, not by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableOperation {
    Filter,
    Group,
    Aggregate,
    Count,
    List,
    #[serde(other)]
    Other,
}

impl Default for TableOperation {
    fn default() -> Self {
        TableOperation::List
    }
}

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Greater,
    Less,
    IsEmpty,
    NotEmpty,
    #[serde(other)]
    Other,
}

impl Default for FilterOp {
    fn default() -> Self {
        FilterOp::Equals
    }
}

/// Group aggregation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Count,
    Sum,
    Mean,
    #[serde(other)]
    Other,
}

/// Filter clause as extracted from oracle output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawColumnFilter {
    pub column: String,
    pub operator: FilterOp,
    pub value: String,
}

/// Analysis plan as extracted from oracle output, prior to validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawTablePlan {
    pub operation: TableOperation,
    pub filters: Vec<RawColumnFilter>,
    pub group_by: Option<String>,
    pub aggregation: Option<Aggregation>,
    pub select_columns: Vec<String>,
    pub limit: usize,
    pub return_json: bool,
}

impl Default for RawTablePlan {
    fn default() -> Self {
        Self {
            operation: TableOperation::List,
            filters: vec![],
            group_by: None,
            aggregation: None,
            select_columns: vec![],
            limit: 100,
            return_json: false,
        }
    }
}

/// Filter clause bound to an actual dataset column.
///
/// `requested` keeps the name the query asked for; length-based comparisons
/// key off the conceptual name, not the resolved header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableFilterClause {
    pub column: String,
    pub requested: String,
    pub operator: FilterOp,
    pub value: String,
}

/// Analysis plan after column resolution. Every column named in here exists
/// in the dataset headers it was validated against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedTablePlan {
    pub operation: TableOperation,
    pub filters: Vec<TableFilterClause>,
    pub group_by: Option<String>,
    pub aggregation: Option<Aggregation>,
    pub select_columns: Vec<String>,
    pub limit: usize,
    pub return_json: bool,
}

/// Parse oracle output into a raw plan, falling back to the default
/// list-everything plan when the text carries no usable JSON object.
pub fn parse_plan(text: &str) -> RawTablePlan {
    if let Some(span) = extract_json_object(text) {
        match serde_json::from_str::<RawTablePlan>(span) {
            Ok(plan) => return plan,
            Err(e) => debug!("Table plan did not parse ({}), using fallback", e),
        }
    } else {
        debug!("No JSON object in oracle output, using fallback table plan");
    }
    RawTablePlan::default()
}

/// Validate a raw plan against the dataset headers.
///
/// Pure function: filters on unresolvable columns or unknown operators are
/// dropped (and returned), an unresolvable group column cancels grouping,
/// unresolvable selections are dropped. Never fails.
pub fn validate(raw: RawTablePlan, headers: &[String]) -> (ValidatedTablePlan, Vec<String>) {
    let mut dropped = Vec::new();

    let mut filters = Vec::new();
    for filter in &raw.filters {
        if filter.operator == FilterOp::Other {
            dropped.push(format!("filter-op:{}", filter.column));
            continue;
        }
        match resolve_column(headers, &filter.column) {
            Some(column) => filters.push(TableFilterClause {
                column: column.to_string(),
                requested: filter.column.clone(),
                operator: filter.operator,
                value: filter.value.clone(),
            }),
            None => dropped.push(format!("filter:{}", filter.column)),
        }
    }

    let group_by = match &raw.group_by {
        Some(requested) => match resolve_column(headers, requested) {
            Some(column) => Some(column.to_string()),
            None => {
                dropped.push(format!("group_by:{}", requested));
                None
            }
        },
        None => None,
    };

    let mut select_columns: Vec<String> = Vec::new();
    for requested in &raw.select_columns {
        match resolve_column(headers, requested) {
            Some(column) => {
                if !select_columns.iter().any(|c| c == column) {
                    select_columns.push(column.to_string());
                }
            }
            None => dropped.push(format!("select:{}", requested)),
        }
    }

    let validated = ValidatedTablePlan {
        operation: raw.operation,
        filters,
        group_by,
        aggregation: raw.aggregation,
        select_columns,
        limit: raw.limit,
        return_json: raw.return_json,
    };

    (validated, dropped)
}
