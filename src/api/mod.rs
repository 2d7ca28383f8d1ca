//! HTTP API for the query service.
//!
//! A small REST surface over the orchestrator: a banner route, a health
//! probe, and the query endpoint itself.

mod handlers;
mod rest;

pub use handlers::*;
pub use rest::*;
