use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::TweetCache;
use crate::config::Config;
use crate::params::{BundleScanState, OperationTable};

/// State of one hosting page, shared by every component attached to it.
///
/// Locks are only held for a single synchronous step; when two are needed they are taken
/// in field order (operations, then bundles).
#[derive(Debug, Clone)]
pub struct PageContext {
    pub config: Arc<Config>,
    /// Resolved texts from intercepted responses and active lookups
    pub cache: Arc<RwLock<TweetCache>>,
    /// Live operation parameters: operation name -> (hash, features)
    pub operations: Arc<RwLock<OperationTable>>,
    /// Bundle scan progress and its first-match results
    pub bundles: Arc<RwLock<BundleScanState>>,
}

impl PageContext {
    pub fn new(config: Config) -> Self {
        let cache = TweetCache::new(config.cache_capacity);
        Self {
            config: Arc::new(config),
            cache: Arc::new(RwLock::new(cache)),
            operations: Arc::new(RwLock::new(OperationTable::new())),
            bundles: Arc::new(RwLock::new(BundleScanState::new())),
        }
    }

    /// Cached text for `id`. Empty texts count as a miss.
    pub async fn cached_text(&self, id: &str) -> Option<String> {
        self.cache
            .read()
            .await
            .get(id)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }

    pub async fn cache_text(&self, id: &str, text: String) {
        if let Some(evicted) = self.cache.write().await.put(id, text) {
            tracing::trace!("Evicted tweet {} from cache", evicted);
        }
    }
}

impl Default for PageContext {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
