//! End-to-end orchestration tests with scripted oracle and provider stubs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use assay::agents::{AnalyticsAgent, SeoAgent};
use assay::error::{ProviderError, Result};
use assay::fusion::ResponseFuser;
use assay::oracle::TextOracle;
use assay::orchestrator::Orchestrator;
use assay::providers::{
    ReportProvider, ReportRequest, ReportResponse, ReportRow, TableProvider,
};
use assay::query::IntentRouter;

/// Oracle stub that replays a fixed script of completions in order.
struct ScriptedOracle {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedOracle {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        })
    }
}

#[async_trait]
impl TextOracle for ScriptedOracle {
    async fn complete(&self, _system: &str, _user: &str, _temperature: f32) -> Result<String> {
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("oracle called more times than scripted"))
    }
}

/// Report provider with one fixed row of data.
struct FixedReports;

#[async_trait]
impl ReportProvider for FixedReports {
    async fn run_report(&self, request: &ReportRequest) -> Result<ReportResponse> {
        assert_eq!(request.property_id, "123456", "property id should plumb through");
        Ok(ReportResponse {
            dimension_headers: vec!["date".to_string()],
            metric_headers: vec!["sessions".to_string()],
            rows: vec![ReportRow {
                dimension_values: vec!["20250101".to_string()],
                metric_values: vec!["42".to_string()],
            }],
            totals: vec![ReportRow {
                dimension_values: vec![],
                metric_values: vec!["42".to_string()],
            }],
            row_count: 1,
        })
    }
}

/// Sheets provider with a two-row crawl export.
struct FixedSheets;

#[async_trait]
impl TableProvider for FixedSheets {
    fn source_id(&self) -> &str {
        "crawl-export"
    }

    async fn fetch_values(&self) -> Result<Vec<Vec<String>>> {
        Ok(vec![
            vec!["Address", "Title 1", "Indexability"],
            vec!["https://a.test/", "Home", "Indexable"],
            vec!["http://b.test/", "Old page", "Non-Indexable"],
        ]
        .into_iter()
        .map(|row| row.into_iter().map(String::from).collect())
        .collect())
    }
}

/// Sheets provider that is always unreachable.
struct DownSheets;

#[async_trait]
impl TableProvider for DownSheets {
    fn source_id(&self) -> &str {
        "down"
    }

    async fn fetch_values(&self) -> Result<Vec<Vec<String>>> {
        Err(ProviderError::Request("connection refused".to_string()).into())
    }
}

fn orchestrator(oracle: Arc<ScriptedOracle>, sheets: Arc<dyn TableProvider>) -> Orchestrator {
    let router = IntentRouter::new(oracle.clone());
    let analytics = Arc::new(AnalyticsAgent::new(oracle.clone(), Arc::new(FixedReports)));
    let seo = Arc::new(SeoAgent::new(
        oracle.clone(),
        sheets,
        Duration::from_secs(300),
    ));
    let fuser = ResponseFuser::new(oracle);
    Orchestrator::new(router, analytics, seo, fuser)
}

const ANALYTICS_INTENT: &str = r#"{
    "requires_analytics": true,
    "requires_seo": false,
    "is_cross_agent": false,
    "reasoning": "asks for session counts"
}"#;

const CROSS_INTENT: &str = r#"{
    "requires_analytics": true,
    "requires_seo": true,
    "is_cross_agent": true,
    "reasoning": "needs report data joined with crawl data"
}"#;

const SESSIONS_PLAN: &str = r#"{
    "metrics": ["sessions"],
    "dimensions": ["date"],
    "date_range": {"type": "relative", "days": 7}
}"#;

const INDEXABILITY_PLAN: &str = r#"{
    "operation": "group",
    "group_by": "Indexability",
    "aggregation": "count"
}"#;

#[tokio::test]
async fn test_analytics_only_query() {
    let oracle = ScriptedOracle::new(&[
        ANALYTICS_INTENT,
        SESSIONS_PLAN,
        "Sessions held steady at 42.",
    ]);
    let orch = orchestrator(oracle, Arc::new(FixedSheets));

    let outcome = orch
        .process_query("how many sessions this week", Some("123456"))
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.agent.as_deref(), Some("analytics"));
    assert_eq!(outcome.message.as_deref(), Some("Sessions held steady at 42."));
    assert_eq!(outcome.cross_agent, None);
    assert_eq!(outcome.error, None);

    let data = outcome.data.unwrap();
    assert_eq!(data["reporting_plan"]["metrics"], json!(["sessions"]));
    assert_eq!(data["raw_data"]["rows"][0]["sessions"], json!("42"));
    assert_eq!(data["raw_data"]["row_count"], json!(1));
}

#[tokio::test]
async fn test_analytics_requires_property_id() {
    // Classification happens first; the precondition fails before any
    // agent or provider is touched.
    let oracle = ScriptedOracle::new(&[ANALYTICS_INTENT]);
    let orch = orchestrator(oracle, Arc::new(FixedSheets));

    let outcome = orch.process_query("how many sessions this week", None).await;

    assert!(!outcome.success);
    assert_eq!(
        outcome.error.as_deref(),
        Some("GA4 propertyId is required for analytics queries")
    );
    let intent = outcome.intent.unwrap();
    assert!(intent.requires_analytics);
    assert!(!intent.requires_seo);
}

#[tokio::test]
async fn test_empty_property_id_counts_as_missing() {
    let oracle = ScriptedOracle::new(&[ANALYTICS_INTENT]);
    let orch = orchestrator(oracle, Arc::new(FixedSheets));

    let outcome = orch
        .process_query("how many sessions this week", Some(""))
        .await;

    assert!(!outcome.success);
    assert_eq!(
        outcome.error.as_deref(),
        Some("GA4 propertyId is required for analytics queries")
    );
}

#[tokio::test]
async fn test_cross_agent_fusion() {
    // Call order: classify, analytics plan, analytics narration, SEO plan,
    // SEO narration, fusion.
    let oracle = ScriptedOracle::new(&[
        CROSS_INTENT,
        SESSIONS_PLAN,
        "Sessions summary.",
        INDEXABILITY_PLAN,
        "Indexability summary.",
        "Traffic concentrates on the indexable pages.",
    ]);
    let orch = orchestrator(oracle, Arc::new(FixedSheets));

    let outcome = orch
        .process_query("sessions per day and indexability of my pages", Some("123456"))
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.cross_agent, Some(true));
    assert_eq!(
        outcome.agents,
        Some(vec!["analytics".to_string(), "seo".to_string()])
    );
    assert_eq!(
        outcome.message.as_deref(),
        Some("Traffic concentrates on the indexable pages.")
    );
    assert_eq!(outcome.agent, None);

    let data = outcome.data.unwrap();
    assert_eq!(data["analytics"]["raw_data"]["rows"][0]["sessions"], json!("42"));
    assert_eq!(data["seo"]["total_urls"], json!(2));
    assert_eq!(data["seo"]["result_data"]["total_groups"], json!(2));
}

#[tokio::test]
async fn test_partial_failure_carries_partial_data() {
    // SEO side fails before its oracle calls, so only the analytics leg
    // consumes script entries; fusion short-circuits without synthesis.
    let oracle = ScriptedOracle::new(&[CROSS_INTENT, SESSIONS_PLAN, "Sessions summary."]);
    let orch = orchestrator(oracle, Arc::new(DownSheets));

    let outcome = orch
        .process_query("sessions per day and indexability of my pages", Some("123456"))
        .await;

    assert!(!outcome.success);
    assert!(outcome
        .error
        .as_deref()
        .unwrap()
        .contains("Failed to load SEO data from spreadsheet"));

    let partial = outcome.partial_data.unwrap();
    assert_eq!(partial["analytics"]["raw_data"]["rows"][0]["sessions"], json!("42"));
    assert!(!partial.contains_key("seo"));
}

#[tokio::test]
async fn test_unclassifiable_query_gets_guidance() {
    let oracle = ScriptedOracle::new(&[r#"{
        "requires_analytics": false,
        "requires_seo": false,
        "is_cross_agent": false,
        "reasoning": "unrelated to either dataset"
    }"#]);
    let orch = orchestrator(oracle, Arc::new(FixedSheets));

    let outcome = orch.process_query("what is the meaning of life", None).await;

    assert!(!outcome.success);
    assert_eq!(
        outcome.error.as_deref(),
        Some("Could not determine appropriate agent for this query")
    );
    assert!(outcome.message.unwrap().contains("rephrase"));
}

#[tokio::test]
async fn test_prose_classification_falls_back_to_keywords() {
    // The classifier returns prose instead of JSON; keyword detection
    // routes the query to analytics.
    let oracle = ScriptedOracle::new(&[
        "This looks like a question about website traffic.",
        SESSIONS_PLAN,
        "Steady traffic.",
    ]);
    let orch = orchestrator(oracle, Arc::new(FixedSheets));

    let outcome = orch
        .process_query("show me ga4 traffic for last week", Some("123456"))
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.agent.as_deref(), Some("analytics"));
    assert_eq!(outcome.message.as_deref(), Some("Steady traffic."));
}

#[tokio::test]
async fn test_repeat_query_yields_identical_plan_and_data() {
    // Same question twice against unchanged upstream data: the validated
    // plan and report payload repeat exactly, only the narration differs.
    let oracle = ScriptedOracle::new(&[
        ANALYTICS_INTENT,
        SESSIONS_PLAN,
        "First pass summary.",
        ANALYTICS_INTENT,
        SESSIONS_PLAN,
        "Second pass summary.",
    ]);
    let orch = orchestrator(oracle, Arc::new(FixedSheets));

    let first = orch
        .process_query("how many sessions this week", Some("123456"))
        .await;
    let second = orch
        .process_query("how many sessions this week", Some("123456"))
        .await;

    assert!(first.success);
    assert!(second.success);
    assert_ne!(first.message, second.message);
    assert_eq!(first.data, second.data);
}
