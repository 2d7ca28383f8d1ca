//! Dataset caching behavior across SEO queries.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use assay::agents::{Agent, AgentContext, SeoAgent};
use assay::error::Result;
use assay::oracle::TextOracle;
use assay::providers::TableProvider;

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

/// Sheets provider that counts how often it is actually fetched.
struct CountingSheets {
    fetches: AtomicUsize,
}

impl CountingSheets {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            fetches: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TableProvider for CountingSheets {
    fn source_id(&self) -> &str {
        "crawl-export"
    }

    async fn fetch_values(&self) -> Result<Vec<Vec<String>>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            vec!["Address".to_string(), "Status Code".to_string()],
            vec!["https://a.test/".to_string(), "200".to_string()],
            vec!["https://a.test/old".to_string(), "404".to_string()],
        ])
    }
}

/// Plan that lists 404 pages as JSON, so each query costs exactly one
/// oracle completion and no narration.
const NOT_FOUND_PLAN: &str = r#"{
    "operation": "filter",
    "filters": [{"column": "Status Code", "operator": "equals", "value": "404"}],
    "return_json": true
}"#;

#[tokio::test]
async fn test_dataset_fetched_once_within_ttl() {
    let provider = CountingSheets::new();
    let oracle = ScriptedOracle::new(&[NOT_FOUND_PLAN, NOT_FOUND_PLAN]);
    let agent = SeoAgent::new(oracle, provider.clone(), Duration::from_secs(300));

    let first = agent.process("list 404 pages", &AgentContext::default()).await;
    let second = agent.process("list 404 pages", &AgentContext::default()).await;

    assert!(first.success);
    assert!(second.success);
    assert_eq!(
        provider.fetches.load(Ordering::SeqCst),
        1,
        "second query should reuse the cached dataset"
    );
}

#[tokio::test]
async fn test_dataset_refetched_after_ttl() {
    let provider = CountingSheets::new();
    let oracle = ScriptedOracle::new(&[NOT_FOUND_PLAN, NOT_FOUND_PLAN]);
    let agent = SeoAgent::new(oracle, provider.clone(), Duration::from_millis(50));

    let first = agent.process("list 404 pages", &AgentContext::default()).await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    let second = agent.process("list 404 pages", &AgentContext::default()).await;

    assert!(first.success);
    assert!(second.success);
    assert_eq!(
        provider.fetches.load(Ordering::SeqCst),
        2,
        "expired dataset should be fetched again"
    );
}

#[tokio::test]
async fn test_same_plan_gives_same_result() {
    let provider = CountingSheets::new();
    let oracle = ScriptedOracle::new(&[NOT_FOUND_PLAN, NOT_FOUND_PLAN]);
    let agent = SeoAgent::new(oracle, provider, Duration::from_secs(300));

    let first = agent.process("list 404 pages", &AgentContext::default()).await;
    let second = agent.process("list 404 pages", &AgentContext::default()).await;

    let first_data = first.data.unwrap();
    let second_data = second.data.unwrap();
    assert_eq!(first_data, second_data);
    assert_eq!(
        first_data["result_data"]["data"][0]["Address"],
        json!("https://a.test/old")
    );
    assert_eq!(first_data["result_data"]["total_matching"], json!(1));
}
