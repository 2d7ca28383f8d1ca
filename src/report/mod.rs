//! Report query domain (website analytics).
//!
//! A natural-language question becomes a [`RawReportPlan`] via the oracle,
//! is validated against the closed metric/dimension vocabulary in
//! [`vocab`], and executes against a [`ReportProvider`] yielding flat
//! [`ReportData`] rows.
//!
//! [`ReportProvider`]: crate::providers::ReportProvider

pub mod vocab;

mod executor;
mod plan;

pub use executor::{execute, resolve_date_range, ReportData, ReportMetadata, ResolvedDateRange};
pub use plan::{
    parse_plan, validate, DateRangeSpec, DimensionFilterClause, OrderBySpec, RawDimensionFilter,
    RawReportPlan, ValidatedReportPlan,
};
