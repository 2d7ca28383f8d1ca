//! Assay: natural language analytics and SEO query service
//!
//! An HTTP service that answers natural language questions about website
//! analytics reports and SEO crawl data. A text-generation oracle plans
//! each answer, the plans execute against live data providers, and the
//! results are narrated back as prose.

pub mod agents;
pub mod api;
pub mod config;
pub mod error;
pub mod fusion;
pub mod oracle;
pub mod orchestrator;
pub mod providers;
pub mod query;
pub mod report;
pub mod table;

pub use agents::{Agent, AgentContext, AgentResponse, AnalyticsAgent, SeoAgent};
pub use api::{create_router, serve, ApiState, ErrorResponse, QueryRequest};
pub use config::Config;
pub use error::{AssayError, ConfigError, OracleError, PlanError, ProviderError, Result};
pub use fusion::ResponseFuser;
pub use oracle::{HttpOracle, TextOracle};
pub use orchestrator::{Orchestrator, QueryOutcome};
pub use providers::{Ga4ReportProvider, ReportProvider, SheetsTableProvider, TableProvider};
pub use query::{IntentRouter, QueryIntent};
pub use report::{RawReportPlan, ReportData, ValidatedReportPlan};
pub use table::{DatasetCache, RawTablePlan, SheetTable, TableResult, ValidatedTablePlan};
