//! Natural language query routing.
//!
//! This module provides:
//! - Intent classification deciding which agents a query needs
//! - A keyword fallback for unusable classifier output

mod router;
mod types;

pub use router::IntentRouter;
pub use types::QueryIntent;
