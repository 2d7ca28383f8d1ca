//! Domain agents.
//!
//! Each agent runs the same four-stage pipeline for its domain: ask the
//! oracle for a plan, validate it against the domain vocabulary, execute
//! it against the data source, and narrate the result. Every outcome is
//! normalized into [`AgentResponse`] at the agent boundary.

mod analytics;
mod seo;

pub use analytics::AnalyticsAgent;
pub use seo::SeoAgent;

use async_trait::async_trait;
use serde_json::Value;

// ============================================================================
// Agent contract
// ============================================================================

/// Handler-specific parameters carried alongside the query text.
#[derive(Debug, Clone, Default)]
pub struct AgentContext {
    /// GA4 property the analytics agent should report on.
    pub property_id: Option<String>,
}

/// Uniform envelope produced by every agent. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    pub success: bool,
    pub data: Option<Value>,
    pub message: String,
    pub agent_name: String,
    pub error: Option<String>,
}

impl AgentResponse {
    pub fn success(agent_name: &str, data: Value, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message,
            agent_name: agent_name.to_string(),
            error: None,
        }
    }

    pub fn failure(agent_name: &str, error: String) -> Self {
        Self {
            success: false,
            data: None,
            message: String::new(),
            agent_name: agent_name.to_string(),
            error: Some(error),
        }
    }
}

/// A domain pipeline that answers one class of question.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    /// Keyword sniff. An auxiliary signal only; routing is intent-based.
    fn can_handle(&self, query: &str) -> bool;

    /// Run the pipeline. Failures come back inside the response envelope,
    /// never as an unhandled fault.
    async fn process(&self, query: &str, context: &AgentContext) -> AgentResponse;
}
