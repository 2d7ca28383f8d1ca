//! Analytics agent: answers GA4 reporting questions.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::oracle::{TextOracle, EXTRACTION_TEMPERATURE, SUMMARY_TEMPERATURE};
use crate::providers::ReportProvider;
use crate::report::{self, ReportData, ValidatedReportPlan};

use super::{Agent, AgentContext, AgentResponse};

const AGENT_NAME: &str = "analytics";

/// Rows shown to the oracle when narrating results.
const SUMMARY_SAMPLE_ROWS: usize = 20;

const CAN_HANDLE_KEYWORDS: &[&str] = &[
    "analytics",
    "ga4",
    "traffic",
    "visitors",
    "users",
    "sessions",
    "page views",
    "pageviews",
    "bounce rate",
    "engagement",
    "conversion",
    "revenue",
    "source",
    "medium",
    "channel",
    "daily",
    "weekly",
    "monthly",
    "breakdown",
    "trend",
];

const PARSE_INSTRUCTION: &str = r#"You are a GA4 query parser. Extract the following from user queries:
- metrics: List of metrics to fetch (e.g., pageviews, users, sessions)
- dimensions: List of dimensions to group by (e.g., date, page path, country)
- date_range: Start and end dates or relative range (e.g., "last 14 days")
- filters: Any filters mentioned (e.g., specific page paths)
- order_by: How to sort results if mentioned

Return ONLY valid JSON in this exact format:
{
    "metrics": ["metric1", "metric2"],
    "dimensions": ["dimension1"],
    "date_range": {"type": "relative", "days": 14},
    "filters": [{"dimension": "pagePath", "value": "/pricing"}],
    "order_by": {"field": "date", "descending": false}
}

Common mappings:
- "page views", "views" -> "screenPageViews"
- "users" -> "totalUsers"
- "daily breakdown" -> dimension: "date"
- "traffic sources" -> dimension: "sessionDefaultChannelGroup"
- "last X days" -> date_range with days: X

If information is not specified, use reasonable defaults:
- Default date range: last 7 days
- Default dimensions: ["date"] for time-series queries
"#;

const SUMMARY_INSTRUCTION: &str = r#"You are a data analyst explaining GA4 analytics results.
Given the user's question and the GA4 data, provide a clear, insightful response.

Guidelines:
- Summarize key findings first
- Highlight trends if time-series data is present
- Mention specific numbers and percentages
- If data is empty or sparse, explain this gracefully
- Keep response concise but informative
- If the user requested JSON format, return data as JSON instead
"#;

/// Agent for Google Analytics 4 report queries.
pub struct AnalyticsAgent {
    oracle: Arc<dyn TextOracle>,
    provider: Arc<dyn ReportProvider>,
}

impl AnalyticsAgent {
    pub fn new(oracle: Arc<dyn TextOracle>, provider: Arc<dyn ReportProvider>) -> Self {
        Self { oracle, provider }
    }

    async fn run(&self, query: &str, property_id: &str) -> Result<(serde_json::Value, String)> {
        let raw_text = self
            .oracle
            .complete(PARSE_INSTRUCTION, query, EXTRACTION_TEMPERATURE)
            .await?;
        let raw_plan = report::parse_plan(&raw_text);
        info!("Parsed reporting plan: {:?}", raw_plan);

        let (plan, dropped) = report::validate(raw_plan);
        if !dropped.is_empty() {
            debug!("Dropped unknown plan fields: {:?}", dropped);
        }

        let data = report::execute(self.provider.as_ref(), property_id, &plan).await?;
        let message = self.narrate(query, &plan, &data).await?;

        let payload = json!({
            "reporting_plan": plan,
            "raw_data": data,
        });
        Ok((payload, message))
    }

    async fn narrate(
        &self,
        query: &str,
        plan: &ValidatedReportPlan,
        data: &ReportData,
    ) -> Result<String> {
        let sample_len = data.rows.len().min(SUMMARY_SAMPLE_ROWS);
        let sample = serde_json::to_string_pretty(&data.rows[..sample_len])?;
        let totals = serde_json::to_string_pretty(&data.totals)?;

        let context = format!(
            "User Question: {}\n\n\
             Query Plan:\n\
             - Metrics: {:?}\n\
             - Dimensions: {:?}\n\
             - Date Range: {}\n\
             - Filters: {}\n\n\
             GA4 Results:\n\
             - Total Rows: {}\n\
             - Data: {}\n\
             - Totals: {}\n",
            query,
            plan.metrics,
            plan.dimensions,
            serde_json::to_string(&plan.date_range)?,
            serde_json::to_string(&plan.filters)?,
            data.row_count,
            sample,
            totals,
        );

        self.oracle
            .complete(SUMMARY_INSTRUCTION, &context, SUMMARY_TEMPERATURE)
            .await
    }
}

#[async_trait::async_trait]
impl Agent for AnalyticsAgent {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    fn can_handle(&self, query: &str) -> bool {
        let query_lower = query.to_lowercase();
        CAN_HANDLE_KEYWORDS.iter().any(|kw| query_lower.contains(kw))
    }

    async fn process(&self, query: &str, context: &AgentContext) -> AgentResponse {
        let Some(property_id) = context.property_id.as_deref().filter(|p| !p.is_empty()) else {
            return AgentResponse::failure(
                AGENT_NAME,
                "GA4 propertyId is required for analytics queries".to_string(),
            );
        };

        match self.run(query, property_id).await {
            Ok((data, message)) => AgentResponse::success(AGENT_NAME, data, message),
            Err(e) => {
                warn!("Error processing analytics query: {}", e);
                AgentResponse::failure(AGENT_NAME, e.to_string())
            }
        }
    }
}
