//! Query intent routing.
//!
//! Asks the oracle which agents a query needs, with a keyword heuristic
//! as the fallback when the oracle's answer is not usable JSON.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::oracle::{extract_json_object, TextOracle, EXTRACTION_TEMPERATURE};

use super::types::QueryIntent;

// ============================================================================
// Keyword fallback vocabulary
// ============================================================================

const ANALYTICS_KEYWORDS: &[&str] = &[
    "page view",
    "session",
    "traffic",
    "user",
    "ga4",
    "analytics",
    "daily",
    "trend",
];

const SEO_KEYWORDS: &[&str] = &[
    "url",
    "title tag",
    "meta",
    "https",
    "indexab",
    "seo",
    "screaming frog",
];

const CLASSIFY_INSTRUCTION: &str = r#"You are a query router for a system with two agents:

1. ANALYTICS AGENT: Handles Google Analytics 4 (GA4) queries about:
   - Page views, users, sessions, traffic
   - Daily/weekly breakdowns and trends
   - Traffic sources, channels
   - Conversion metrics
   - Time-series analytics data

2. SEO AGENT: Handles Screaming Frog SEO audit queries about:
   - URL analysis (HTTPS, status codes)
   - Title tags, meta descriptions
   - Indexability status
   - Page content analysis
   - Technical SEO issues

Analyze the query and return ONLY valid JSON:
{
    "requires_analytics": true/false,
    "requires_seo": true/false,
    "is_cross_agent": true/false,
    "reasoning": "brief explanation"
}

Cross-agent queries combine both (e.g., "top pages by views with their title tags").
"#;

// ============================================================================
// Intent Router
// ============================================================================

/// Decides which agents a query needs.
pub struct IntentRouter {
    oracle: Arc<dyn TextOracle>,
}

impl IntentRouter {
    pub fn new(oracle: Arc<dyn TextOracle>) -> Self {
        Self { oracle }
    }

    /// Classify a query. Transport failures from the oracle propagate;
    /// unusable oracle output does not, it falls back to keywords.
    pub async fn classify(&self, query: &str) -> Result<QueryIntent> {
        let raw = self
            .oracle
            .complete(CLASSIFY_INSTRUCTION, query, EXTRACTION_TEMPERATURE)
            .await?;

        if let Some(span) = extract_json_object(&raw) {
            match serde_json::from_str::<QueryIntent>(span) {
                Ok(intent) => return Ok(intent),
                Err(e) => debug!("Intent JSON did not parse ({}), using keyword fallback", e),
            }
        } else {
            debug!("No JSON object in intent response, using keyword fallback");
        }

        Ok(keyword_intent(query))
    }
}

/// Keyword-membership heuristic over the two fixed vocabularies.
fn keyword_intent(query: &str) -> QueryIntent {
    let query_lower = query.to_lowercase();
    let has_analytics = ANALYTICS_KEYWORDS.iter().any(|kw| query_lower.contains(kw));
    let has_seo = SEO_KEYWORDS.iter().any(|kw| query_lower.contains(kw));

    QueryIntent {
        // Queries matching neither vocabulary are treated as analytics.
        requires_analytics: has_analytics || !has_seo,
        requires_seo: has_seo,
        is_cross_agent: has_analytics && has_seo,
        reasoning: "Keyword-based detection".to_string(),
    }
}
