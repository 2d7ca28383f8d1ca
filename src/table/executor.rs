//! Tabular plan execution over an in-memory sheet snapshot.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::{PlanError, Result};

use super::dataset::SheetTable;
use super::plan::{Aggregation, FilterOp, TableFilterClause, ValidatedTablePlan};

/// Outcome of a table plan, shaped for the response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TableResult {
    Grouped {
        data: Vec<Map<String, Value>>,
        total_groups: usize,
    },
    List {
        data: Vec<Map<String, Value>>,
        total_matching: usize,
        columns: Vec<String>,
    },
}

impl TableResult {
    /// Result rows, whichever shape the result took.
    pub fn data(&self) -> &[Map<String, Value>] {
        match self {
            TableResult::Grouped { data, .. } => data,
            TableResult::List { data, .. } => data,
        }
    }

    /// Matching row count for a list, group count for a grouped result.
    pub fn match_count(&self) -> usize {
        match self {
            TableResult::Grouped { total_groups, .. } => *total_groups,
            TableResult::List { total_matching, .. } => *total_matching,
        }
    }
}

/// Filter clause bound to a column index, with derived compare state.
struct BoundFilter<'a> {
    column: usize,
    operator: FilterOp,
    value: &'a str,
    value_lower: String,
    threshold: Option<f64>,
    length_mode: bool,
}

fn bind_filters<'a>(
    table: &SheetTable,
    filters: &'a [TableFilterClause],
) -> Result<Vec<BoundFilter<'a>>> {
    let mut bound = Vec::with_capacity(filters.len());
    for clause in filters {
        // Columns were resolved against this table's headers at validation.
        let Some(column) = table.column_index(&clause.column) else {
            continue;
        };
        let threshold = match clause.operator {
            FilterOp::Greater | FilterOp::Less => Some(
                clause
                    .value
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| PlanError::InvalidFilterValue(clause.value.clone()))?,
            ),
            _ => None,
        };
        bound.push(BoundFilter {
            column,
            operator: clause.operator,
            value: &clause.value,
            value_lower: clause.value.to_lowercase(),
            threshold,
            // "title length" measures the title text, whichever column the
            // name resolved to.
            length_mode: clause.requested.to_lowercase().contains("length"),
        });
    }
    Ok(bound)
}

fn row_matches(filter: &BoundFilter<'_>, cell: Option<&str>) -> bool {
    match filter.operator {
        FilterOp::Equals => cell.map_or(false, |c| c == filter.value),
        FilterOp::NotEquals => cell.map_or(true, |c| c != filter.value),
        FilterOp::Contains => {
            cell.map_or(false, |c| c.to_lowercase().contains(&filter.value_lower))
        }
        FilterOp::NotContains => {
            cell.map_or(true, |c| !c.to_lowercase().contains(&filter.value_lower))
        }
        FilterOp::Greater | FilterOp::Less => numeric_matches(filter, cell),
        FilterOp::IsEmpty => cell.map_or(true, |c| c.trim().is_empty()),
        FilterOp::NotEmpty => cell.map_or(false, |c| !c.trim().is_empty()),
        FilterOp::Other => false,
    }
}

fn numeric_matches(filter: &BoundFilter<'_>, cell: Option<&str>) -> bool {
    let Some(threshold) = filter.threshold else {
        return false;
    };
    let measured = if filter.length_mode {
        Some(cell.unwrap_or("").chars().count() as f64)
    } else {
        cell.and_then(|c| c.trim().parse::<f64>().ok())
    };
    match (measured, filter.operator) {
        (Some(m), FilterOp::Greater) => m > threshold,
        (Some(m), FilterOp::Less) => m < threshold,
        _ => false,
    }
}

/// Run a validated plan against a sheet: filters, then grouping or listing,
/// with the row limit applied last.
pub fn execute(table: &SheetTable, plan: &ValidatedTablePlan) -> Result<TableResult> {
    let bound = bind_filters(table, &plan.filters)?;

    let mut rows: Vec<usize> = (0..table.row_count()).collect();
    for filter in &bound {
        rows.retain(|&row| row_matches(filter, table.cell(row, filter.column)));
    }

    let grouping = match (&plan.group_by, plan.aggregation) {
        (Some(name), Some(agg)) if matches!(agg, Aggregation::Count | Aggregation::Sum) => {
            table.column_index(name).map(|col| (name.as_str(), col, agg))
        }
        // Other aggregations fall through to the ungrouped listing.
        _ => None,
    };

    if let Some((name, col, agg)) = grouping {
        return Ok(grouped(table, &rows, name, col, agg, plan.limit));
    }

    Ok(list(table, &rows, plan))
}

fn grouped(
    table: &SheetTable,
    rows: &[usize],
    group_name: &str,
    group_col: usize,
    agg: Aggregation,
    limit: usize,
) -> TableResult {
    // BTreeMap keeps group keys in ascending order.
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for &row in rows {
        // Rows with no value in the group column are left out entirely.
        if let Some(cell) = table.cell(row, group_col) {
            groups.entry(cell.to_string()).or_default().push(row);
        }
    }
    let total_groups = groups.len();

    let mut data = Vec::new();
    match agg {
        Aggregation::Count => {
            for (key, members) in &groups {
                let mut record = Map::new();
                record.insert(group_name.to_string(), Value::String(key.clone()));
                record.insert(
                    "count".to_string(),
                    Value::Number(Number::from(members.len())),
                );
                data.push(record);
            }
        }
        Aggregation::Sum => {
            let numeric = summable_columns(table, rows, group_col);
            for (key, members) in &groups {
                let mut record = Map::new();
                record.insert(group_name.to_string(), Value::String(key.clone()));
                for (header, col) in &numeric {
                    let sum: f64 = members
                        .iter()
                        .filter_map(|&row| table.cell(row, *col))
                        .filter_map(|c| c.trim().parse::<f64>().ok())
                        .sum();
                    if let Some(n) = Number::from_f64(sum) {
                        record.insert(header.clone(), Value::Number(n));
                    }
                }
                data.push(record);
            }
        }
        _ => {}
    }

    data.truncate(limit);
    TableResult::Grouped { data, total_groups }
}

/// Columns with at least one numeric cell among the given rows, excluding
/// the group column.
fn summable_columns(table: &SheetTable, rows: &[usize], group_col: usize) -> Vec<(String, usize)> {
    table
        .headers()
        .iter()
        .enumerate()
        .filter(|&(col, _)| col != group_col)
        .filter(|&(col, _)| {
            rows.iter().any(|&row| {
                table
                    .cell(row, col)
                    .map_or(false, |c| c.trim().parse::<f64>().is_ok())
            })
        })
        .map(|(col, header)| (header.clone(), col))
        .collect()
}

fn list(table: &SheetTable, rows: &[usize], plan: &ValidatedTablePlan) -> TableResult {
    let columns: Vec<String> = if plan.select_columns.is_empty() {
        table.headers().to_vec()
    } else {
        plan.select_columns.clone()
    };
    let indexed: Vec<(String, usize)> = columns
        .iter()
        .filter_map(|name| table.column_index(name).map(|col| (name.clone(), col)))
        .collect();

    let mut data = Vec::new();
    for &row in rows.iter().take(plan.limit) {
        let mut record = Map::new();
        for (name, col) in &indexed {
            if let Some(cell) = table.cell(row, *col) {
                record.insert(name.clone(), Value::String(cell.to_string()));
            }
        }
        data.push(record);
    }

    let total_matching = data.len();
    TableResult::List {
        data,
        total_matching,
        columns,
    }
}
