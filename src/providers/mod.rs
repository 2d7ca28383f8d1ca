//! External data providers.
//!
//! The query engines never talk to the network themselves; they go through
//! the [`ReportProvider`] and [`TableProvider`] seams. The HTTP
//! implementations here are thin wire adapters: request shaping, auth
//! headers, status mapping. All plan semantics live in the core.

mod analytics;
mod sheets;
mod traits;

pub use analytics::Ga4ReportProvider;
pub use sheets::SheetsTableProvider;
pub use traits::{
    DimensionFilter, ReportProvider, ReportRequest, ReportResponse, ReportRow, TableProvider,
};
