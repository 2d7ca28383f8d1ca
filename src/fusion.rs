//! Fusion of multi-agent results into one answer.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::agents::AgentResponse;
use crate::oracle::{TextOracle, SUMMARY_TEMPERATURE};
use crate::orchestrator::QueryOutcome;
use crate::query::QueryIntent;

const FUSION_INSTRUCTION: &str = r#"You are synthesizing results from multiple data sources.
Combine analytics data (page views, users, etc.) with SEO data (title tags, meta descriptions, etc.)
to provide a unified, insightful answer.

Guidelines:
- Match data points across sources (e.g., URLs from analytics with SEO attributes)
- Highlight interesting correlations
- If user requested JSON, return structured JSON
- Keep response clear and actionable
"#;

/// Merges the responses of two agents, or reports partial failure.
pub struct ResponseFuser {
    oracle: Arc<dyn TextOracle>,
}

impl ResponseFuser {
    pub fn new(oracle: Arc<dyn TextOracle>) -> Self {
        Self { oracle }
    }

    /// Fuse two or more agent responses. Any agent error turns the whole
    /// outcome into a failure that still carries the successful side's data.
    pub async fn fuse(
        &self,
        query: &str,
        responses: &[AgentResponse],
        intent: &QueryIntent,
    ) -> QueryOutcome {
        let errors: Vec<&str> = responses.iter().filter_map(|r| r.error.as_deref()).collect();
        if !errors.is_empty() {
            let mut partial = Map::new();
            for response in responses.iter().filter(|r| r.success) {
                partial.insert(
                    response.agent_name.clone(),
                    response.data.clone().unwrap_or(Value::Null),
                );
            }
            return QueryOutcome {
                success: false,
                error: Some(errors.join("; ")),
                partial_data: Some(partial),
                ..Default::default()
            };
        }

        let mut analytics_data = None;
        let mut seo_data = None;
        for response in responses {
            match response.agent_name.as_str() {
                "analytics" => analytics_data = response.data.clone(),
                "seo" => seo_data = response.data.clone(),
                _ => {}
            }
        }

        let context = format!(
            "User Question: {}\n\n\
             Analytics Data:\n{}\n\n\
             SEO Data:\n{}\n\n\
             Intent: {}\n",
            query,
            render(&analytics_data),
            render(&seo_data),
            intent.reasoning,
        );

        match self
            .oracle
            .complete(FUSION_INSTRUCTION, &context, SUMMARY_TEMPERATURE)
            .await
        {
            Ok(message) => QueryOutcome {
                success: true,
                message: Some(message),
                data: Some(json!({
                    "analytics": analytics_data,
                    "seo": seo_data,
                })),
                agents: Some(responses.iter().map(|r| r.agent_name.clone()).collect()),
                cross_agent: Some(true),
                ..Default::default()
            },
            Err(e) => {
                warn!("Fusion synthesis failed: {}", e);
                QueryOutcome::failure(e.to_string())
            }
        }
    }
}

fn render(data: &Option<Value>) -> String {
    match data {
        Some(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        None => "Not available".to_string(),
    }
}
