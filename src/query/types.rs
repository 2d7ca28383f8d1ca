//! Intent types produced by the router.

use serde::{Deserialize, Serialize};

/// Which agents a query needs. Created per request, never persisted.
///
/// Oracle classifications arrive as loose JSON; absent fields default to
/// false so a partial answer still routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryIntent {
    pub requires_analytics: bool,
    pub requires_seo: bool,
    pub is_cross_agent: bool,
    pub reasoning: String,
}
