//! Tabular query domain (SEO audit data).
//!
//! The audit dataset is a spreadsheet export fetched through a
//! [`TableProvider`] and cached with a TTL. Oracle output becomes a
//! [`RawTablePlan`], is validated against the live column headers, and runs
//! through a small filter/group/select/limit algebra over [`SheetTable`].
//!
//! [`TableProvider`]: crate::providers::TableProvider

mod columns;
mod dataset;
mod executor;
mod plan;

pub use columns::resolve_column;
pub use dataset::{DatasetCache, SheetTable};
pub use executor::{execute, TableResult};
pub use plan::{
    parse_plan, validate, Aggregation, FilterOp, RawColumnFilter, RawTablePlan, TableFilterClause,
    TableOperation, ValidatedTablePlan,
};
