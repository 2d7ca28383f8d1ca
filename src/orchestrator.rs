//! Orchestrator that routes queries to agents and shapes the response.
//!
//! The orchestrator handles:
//! - Intent detection via the router
//! - Dispatch to the analytics and SEO agents
//! - The analytics property-id precondition
//! - Fusion of multi-agent results

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::agents::{Agent, AgentContext, AgentResponse};
use crate::fusion::ResponseFuser;
use crate::query::IntentRouter;

// ============================================================================
// Response envelope
// ============================================================================

/// Intent echo returned when a precondition fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntentSummary {
    pub requires_analytics: bool,
    pub requires_seo: bool,
}

/// Wire envelope for every query outcome, handled failures included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_agent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_data: Option<Map<String, Value>>,
}

impl QueryOutcome {
    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            ..Default::default()
        }
    }

    /// Envelope for exactly one agent's response.
    pub fn from_single(response: AgentResponse) -> Self {
        Self {
            success: response.success,
            message: Some(response.message),
            data: response.data,
            agent: Some(response.agent_name),
            error: response.error,
            ..Default::default()
        }
    }

    fn missing_property(requires_seo: bool) -> Self {
        Self {
            success: false,
            error: Some("GA4 propertyId is required for analytics queries".to_string()),
            intent: Some(IntentSummary {
                requires_analytics: true,
                requires_seo,
            }),
            ..Default::default()
        }
    }

    fn no_agent() -> Self {
        Self {
            success: false,
            error: Some("Could not determine appropriate agent for this query".to_string()),
            message: Some(
                "Please rephrase your question to be about web analytics (GA4) or SEO audit data."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Routes each query to the agents its intent calls for.
pub struct Orchestrator {
    /// Intent router.
    router: IntentRouter,
    /// Analytics agent.
    analytics: Arc<dyn Agent>,
    /// SEO agent.
    seo: Arc<dyn Agent>,
    /// Fuser for multi-agent results.
    fuser: ResponseFuser,
}

impl Orchestrator {
    pub fn new(
        router: IntentRouter,
        analytics: Arc<dyn Agent>,
        seo: Arc<dyn Agent>,
        fuser: ResponseFuser,
    ) -> Self {
        Self {
            router,
            analytics,
            seo,
            fuser,
        }
    }

    /// Process a query end to end. Every failure mode comes back inside
    /// the envelope; nothing escapes as an error.
    pub async fn process_query(&self, query: &str, property_id: Option<&str>) -> QueryOutcome {
        let intent = match self.router.classify(query).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!("Intent classification failed: {}", e);
                return QueryOutcome::failure(e.to_string());
            }
        };
        info!("Detected intent: {:?}", intent);

        for agent in [self.analytics.as_ref(), self.seo.as_ref()] {
            debug!(
                "Agent '{}' keyword sniff: {}",
                agent.name(),
                agent.can_handle(query)
            );
        }

        let mut responses: Vec<AgentResponse> = Vec::new();

        if intent.requires_analytics {
            let Some(property_id) = property_id.filter(|p| !p.is_empty()) else {
                return QueryOutcome::missing_property(intent.requires_seo);
            };
            let context = AgentContext {
                property_id: Some(property_id.to_string()),
            };
            responses.push(self.analytics.process(query, &context).await);
        }

        if intent.requires_seo {
            responses.push(self.seo.process(query, &AgentContext::default()).await);
        }

        if responses.is_empty() {
            return QueryOutcome::no_agent();
        }

        if responses.len() == 1 {
            return QueryOutcome::from_single(responses.remove(0));
        }

        self.fuser.fuse(query, &responses, &intent).await
    }
}
