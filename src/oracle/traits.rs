//! Oracle trait definition.

use async_trait::async_trait;

use crate::error::Result;

/// A text-generation capability.
///
/// Implementations must be safe to share across concurrent queries.
#[async_trait]
pub trait TextOracle: Send + Sync {
    /// Run one completion: a system instruction plus a user message,
    /// returning the generated text.
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String>;
}
