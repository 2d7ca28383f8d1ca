//! SEO agent: answers questions about a crawl-export spreadsheet.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::oracle::{TextOracle, EXTRACTION_TEMPERATURE, SUMMARY_TEMPERATURE};
use crate::providers::TableProvider;
use crate::table::{self, DatasetCache, SheetTable, TableResult, ValidatedTablePlan};

use super::{Agent, AgentContext, AgentResponse};

const AGENT_NAME: &str = "seo";

/// Rows shown to the oracle when narrating results.
const SUMMARY_SAMPLE_ROWS: usize = 20;

const CAN_HANDLE_KEYWORDS: &[&str] = &[
    "seo",
    "url",
    "urls",
    "title tag",
    "meta description",
    "https",
    "http",
    "indexable",
    "indexability",
    "crawl",
    "screaming frog",
    "audit",
    "404",
    "redirect",
    "canonical",
    "h1",
    "heading",
    "content",
    "word count",
    "duplicate",
    "robots",
    "sitemap",
    "status code",
];

const SUMMARY_INSTRUCTION: &str = r#"You are an SEO expert explaining audit results.
Given the user's question and the analysis results, provide clear insights.

Guidelines:
- Summarize key findings first
- Provide specific counts and percentages
- Explain SEO implications when relevant
- If results are empty, explain what this means
- Keep response concise but actionable
- For indexability questions, explain what indexable/non-indexable means
"#;

fn parse_instruction(columns: &[String]) -> String {
    format!(
        r#"You are an SEO data analyst. Parse the user's query to determine what analysis to perform.

Available columns in the data: {:?}

Common column mappings:
- URL, Address -> the page URL
- Title, Title 1 -> title tag
- Meta Description, Meta Description 1 -> meta description
- Status Code -> HTTP status
- Indexability -> whether page is indexable
- Content Type -> page content type
- Word Count -> content length

Return ONLY valid JSON in this format:
{{
    "operation": "filter|group|aggregate|count|list",
    "filters": [
        {{"column": "column_name", "operator": "equals|contains|not_contains|greater|less|not_equals|is_empty|not_empty", "value": "value"}}
    ],
    "group_by": "column_name or null",
    "aggregation": "count|sum|mean|null",
    "select_columns": ["col1", "col2"],
    "limit": 100,
    "return_json": false
}}

Examples:
- "URLs without HTTPS" -> filter where URL not contains "https"
- "Group by indexability" -> group_by: "Indexability", aggregation: "count"
- "Title tags longer than 60 chars" -> filter where title length > 60
- "Return in JSON format" -> return_json: true
"#,
        columns
    )
}

/// Agent for Screaming Frog style SEO audit queries.
pub struct SeoAgent {
    oracle: Arc<dyn TextOracle>,
    provider: Arc<dyn TableProvider>,
    datasets: DatasetCache,
}

impl SeoAgent {
    pub fn new(
        oracle: Arc<dyn TextOracle>,
        provider: Arc<dyn TableProvider>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            oracle,
            provider,
            datasets: DatasetCache::new(cache_ttl),
        }
    }

    /// Fetch the dataset through the cache. Any failure, and a sheet with
    /// headers but no rows, count as "no data".
    async fn load_table(&self) -> Option<Arc<SheetTable>> {
        match self.datasets.get_or_fetch(self.provider.as_ref()).await {
            Ok(sheet) if sheet.row_count() > 0 => Some(sheet),
            Ok(_) => {
                warn!("SEO dataset has headers but no rows");
                None
            }
            Err(e) => {
                warn!("Failed to load SEO data: {}", e);
                None
            }
        }
    }

    async fn run(&self, query: &str, sheet: &SheetTable) -> Result<(serde_json::Value, String)> {
        let instruction = parse_instruction(sheet.headers());
        let raw_text = self
            .oracle
            .complete(&instruction, query, EXTRACTION_TEMPERATURE)
            .await?;
        let raw_plan = table::parse_plan(&raw_text);
        info!("SEO analysis plan: {:?}", raw_plan);

        let (plan, dropped) = table::validate(raw_plan, sheet.headers());
        if !dropped.is_empty() {
            debug!("Dropped unresolvable plan fields: {:?}", dropped);
        }

        let result = table::execute(sheet, &plan)?;
        let message = self
            .narrate(query, &plan, &result, sheet.row_count())
            .await?;

        let payload = json!({
            "analysis_plan": plan,
            "result_data": result,
            "total_urls": sheet.row_count(),
        });
        Ok((payload, message))
    }

    async fn narrate(
        &self,
        query: &str,
        plan: &ValidatedTablePlan,
        result: &TableResult,
        total_urls: usize,
    ) -> Result<String> {
        // Machine-readable output skips the oracle entirely.
        if plan.return_json {
            return Ok(serde_json::to_string_pretty(result.data())?);
        }

        let sample_len = result.data().len().min(SUMMARY_SAMPLE_ROWS);
        let sample = serde_json::to_string_pretty(&result.data()[..sample_len])?;
        let result_type = match result {
            TableResult::Grouped { .. } => "grouped",
            TableResult::List { .. } => "list",
        };

        let context = format!(
            "User Question: {}\n\n\
             Analysis:\n\
             - Operation: {:?}\n\
             - Filters applied: {}\n\
             - Group by: {}\n\n\
             Results:\n\
             - Type: {}\n\
             - Total URLs in dataset: {}\n\
             - Matching results: {}\n\
             - Data sample: {}\n",
            query,
            plan.operation,
            serde_json::to_string(&plan.filters)?,
            plan.group_by.as_deref().unwrap_or("null"),
            result_type,
            total_urls,
            result.match_count(),
            sample,
        );

        self.oracle
            .complete(SUMMARY_INSTRUCTION, &context, SUMMARY_TEMPERATURE)
            .await
    }
}

#[async_trait::async_trait]
impl Agent for SeoAgent {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    fn can_handle(&self, query: &str) -> bool {
        let query_lower = query.to_lowercase();
        CAN_HANDLE_KEYWORDS.iter().any(|kw| query_lower.contains(kw))
    }

    async fn process(&self, query: &str, _context: &AgentContext) -> AgentResponse {
        let Some(sheet) = self.load_table().await else {
            return AgentResponse::failure(
                AGENT_NAME,
                "Failed to load SEO data from spreadsheet".to_string(),
            );
        };

        match self.run(query, &sheet).await {
            Ok((data, message)) => AgentResponse::success(AGENT_NAME, data, message),
            Err(e) => {
                warn!("Error processing SEO query: {}", e);
                AgentResponse::failure(AGENT_NAME, e.to_string())
            }
        }
    }
}
