//! HTTP surface tests using in-process requests against the router.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tower::ServiceExt;

use assay::agents::{AnalyticsAgent, SeoAgent};
use assay::api::{create_router, ApiState};
use assay::error::Result;
use assay::fusion::ResponseFuser;
use assay::oracle::TextOracle;
use assay::orchestrator::Orchestrator;
use assay::providers::{
    ReportProvider, ReportRequest, ReportResponse, ReportRow, TableProvider,
};
use assay::query::IntentRouter;

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

struct FixedReports;

#[async_trait]
impl ReportProvider for FixedReports {
    async fn run_report(&self, _request: &ReportRequest) -> Result<ReportResponse> {
        Ok(ReportResponse {
            dimension_headers: vec!["date".to_string()],
            metric_headers: vec!["sessions".to_string()],
            rows: vec![ReportRow {
                dimension_values: vec!["20250101".to_string()],
                metric_values: vec!["42".to_string()],
            }],
            totals: vec![],
            row_count: 1,
        })
    }
}

struct FixedSheets;

#[async_trait]
impl TableProvider for FixedSheets {
    fn source_id(&self) -> &str {
        "crawl-export"
    }

    async fn fetch_values(&self) -> Result<Vec<Vec<String>>> {
        Ok(vec![
            vec!["Address".to_string(), "Indexability".to_string()],
            vec!["https://a.test/".to_string(), "Indexable".to_string()],
        ])
    }
}

/// Router backed by a fully wired orchestrator over the given script.
fn scripted_router(replies: &[&str]) -> axum::Router {
    let oracle = ScriptedOracle::new(replies);
    let router = IntentRouter::new(oracle.clone());
    let analytics = Arc::new(AnalyticsAgent::new(oracle.clone(), Arc::new(FixedReports)));
    let seo = Arc::new(SeoAgent::new(
        oracle.clone(),
        Arc::new(FixedSheets),
        Duration::from_secs(300),
    ));
    let fuser = ResponseFuser::new(oracle);
    let orchestrator = Arc::new(Orchestrator::new(router, analytics, seo, fuser));
    create_router(Arc::new(ApiState::new(orchestrator)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_banner() {
    let router = scripted_router(&[]);

    let response = router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["service"], json!("assay"));
    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_health_probe() {
    let router = scripted_router(&[]);

    let response = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_query_without_orchestrator_is_503() {
    let router = create_router(Arc::new(ApiState::uninitialized()));

    let request = post_json("/query", &json!({"query": "how many sessions"}));
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["error"], json!("Service not initialized"));
    assert_eq!(body["code"], json!("not_initialized"));
}

#[tokio::test]
async fn test_query_end_to_end() {
    let router = scripted_router(&[
        r#"{"requires_analytics": true, "requires_seo": false, "is_cross_agent": false, "reasoning": "traffic"}"#,
        r#"{"metrics": ["sessions"], "dimensions": ["date"], "date_range": {"type": "relative", "days": 7}}"#,
        "Sessions held steady at 42.",
    ]);

    let request = post_json(
        "/query",
        &json!({"query": "how many sessions this week", "propertyId": "123456"}),
    );
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["agent"], json!("analytics"));
    assert_eq!(body["message"], json!("Sessions held steady at 42."));
    assert_eq!(body["data"]["raw_data"]["rows"][0]["sessions"], json!("42"));
    // Unset optional envelope fields stay off the wire.
    assert!(body.get("crossAgent").is_none());
    assert!(body.get("agents").is_none());
    assert!(body.get("partialData").is_none());
}

#[tokio::test]
async fn test_handled_failure_stays_200() {
    // Missing propertyId on an analytics query: the envelope reports the
    // failure, the transport does not.
    let router = scripted_router(&[
        r#"{"requires_analytics": true, "requires_seo": false, "is_cross_agent": false, "reasoning": "traffic"}"#,
    ]);

    let request = post_json("/query", &json!({"query": "how many sessions this week"}));
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["error"],
        json!("GA4 propertyId is required for analytics queries")
    );
    assert_eq!(body["intent"]["requiresAnalytics"], json!(true));
    assert_eq!(body["intent"]["requiresSeo"], json!(false));
}

#[tokio::test]
async fn test_malformed_body_is_client_error() {
    let router = scripted_router(&[]);

    let request = Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("this is not json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());

    // A JSON body without the required query field is also rejected
    // before the handler runs.
    let request = post_json("/query", &json!({"propertyId": "123456"}));
    let response = router.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}
