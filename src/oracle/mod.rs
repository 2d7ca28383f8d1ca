//! Text-generation oracle.
//!
//! Every natural-language step in the service (intent classification, plan
//! extraction, result narration) goes through the [`TextOracle`] trait.
//! [`HttpOracle`] implements it against any OpenAI-compatible chat
//! completions endpoint with bounded retry.

mod http;
mod parse;
mod traits;

pub use http::HttpOracle;
pub use parse::extract_json_object;
pub use traits::TextOracle;

/// Temperature used for structured extraction calls (intent, plans).
pub const EXTRACTION_TEMPERATURE: f32 = 0.1;

/// Temperature used for narrative summaries.
pub const SUMMARY_TEMPERATURE: f32 = 0.7;
