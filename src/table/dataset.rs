//! In-memory sheet snapshot and the TTL cache in front of the provider.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, info};

use crate::error::{ProviderError, Result};
use crate::providers::TableProvider;

/// A fetched spreadsheet held as headers plus data rows.
///
/// Rows may be ragged: a row shorter than the header count simply has no
/// value in the trailing columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Build a table from raw sheet values. The first row becomes the
    /// header row, trimmed. Returns `None` when there are no rows at all.
    pub fn from_values(mut values: Vec<Vec<String>>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let headers = values
            .remove(0)
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();
        Some(Self {
            headers,
            rows: values,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell accessor. `None` when the row does not reach this column.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Index of a header by exact name, as produced by column resolution.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// TTL cache of fetched sheets, keyed by provider source id.
///
/// Concurrent requests for the same source share a single fetch. A fetch
/// that fails or returns no rows is not cached, so the next request retries.
pub struct DatasetCache {
    cache: Cache<String, Arc<SheetTable>>,
}

impl DatasetCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().time_to_live(ttl).build(),
        }
    }

    /// Return the cached table for this provider, fetching on miss.
    pub async fn get_or_fetch(&self, provider: &dyn TableProvider) -> Result<Arc<SheetTable>> {
        let key = provider.source_id().to_string();
        self.cache
            .try_get_with(key.clone(), async {
                info!(source = %key, "Fetching dataset");
                let values = provider.fetch_values().await?;
                let table = SheetTable::from_values(values)
                    .ok_or_else(|| ProviderError::EmptyDataset(key.clone()))?;
                debug!(
                    source = %key,
                    rows = table.row_count(),
                    columns = table.headers().len(),
                    "Dataset cached"
                );
                Ok(Arc::new(table))
            })
            .await
            .map_err(|e: Arc<crate::error::AssayError>| {
                ProviderError::Request(e.to_string()).into()
            })
    }

    pub async fn invalidate(&self, source_id: &str) {
        self.cache.invalidate(source_id).await;
    }
}
