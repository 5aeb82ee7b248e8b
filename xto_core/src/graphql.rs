//! Active side of text resolution: ask the API directly when the cache misses.

use reqwest::cookie::CookieStore;
use std::sync::Arc;

use twitter_client::consts::{CSRF_COOKIE, FEATURE_OPERATION_PRIORITY, HASH_OPERATION_PRIORITY, TWEET_RESULT_OPERATION};
use twitter_client::{default_features, Fetch, TwitterClient};
use xto_util::find_cookie;

use crate::context::PageContext;
use crate::error::{Error, Result};
use crate::params::{BundleScanState, OperationTable};
use crate::text::resolve_record;

/// Live hash of the most specific observed operation, else the one found in the bundles.
pub fn select_hash(operations: &OperationTable, bundles: &BundleScanState) -> Option<String> {
    operations
        .hash_for(HASH_OPERATION_PRIORITY)
        .or(bundles.pre_scanned_hash())
        .map(str::to_string)
}

/// Live feature flags, else the bundle fallback, else the built-in defaults.
pub fn select_features(operations: &OperationTable, bundles: &BundleScanState) -> String {
    operations
        .features_for(FEATURE_OPERATION_PRIORITY)
        .or(bundles.fallback_features())
        .map(str::to_string)
        .unwrap_or_else(default_features)
}

pub struct GraphqlResolver {
    ctx: PageContext,
    /// Unobserved transport; lookups must not feed the interceptor.
    fetch: Arc<dyn Fetch>,
    cookies: Arc<dyn CookieStore>,
}

impl GraphqlResolver {
    pub fn new(ctx: PageContext, fetch: Arc<dyn Fetch>, cookies: Arc<dyn CookieStore>) -> Self {
        Self { ctx, fetch, cookies }
    }

    /// Fetch and resolve the text of `tweet_id`, caching it on success.
    /// Every failure ends in `None`, and nothing is cached.
    pub async fn resolve(&self, tweet_id: &str) -> Option<String> {
        match self.try_resolve(tweet_id).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!("Active lookup of tweet {} failed: {}", tweet_id, e);
                None
            }
        }
    }

    async fn try_resolve(&self, tweet_id: &str) -> Result<String> {
        let csrf_token = self
            .csrf_token()
            .ok_or_else(|| Error::MissingCredential(CSRF_COOKIE.to_string()))?;

        let (hash, features) = {
            let operations = self.ctx.operations.read().await;
            let bundles = self.ctx.bundles.read().await;
            (select_hash(&operations, &bundles), select_features(&operations, &bundles))
        };
        let hash = hash.ok_or_else(|| Error::MissingOperationHash(TWEET_RESULT_OPERATION.to_string()))?;

        let client = TwitterClient::new(self.fetch.clone(), csrf_token);
        let record = client.tweet_by_id(&hash, &features, tweet_id).await?;
        let text = resolve_record(&record);

        self.ctx.cache_text(tweet_id, text.clone()).await;
        tracing::info!("Resolved tweet {} through {}", tweet_id, TWEET_RESULT_OPERATION);
        Ok(text)
    }

    fn csrf_token(&self) -> Option<String> {
        let header = self.cookies.cookies(&self.ctx.config.host_origin)?;
        find_cookie(header.to_str().ok()?, CSRF_COOKIE)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use reqwest::cookie::Jar;
    use reqwest::StatusCode;

    use crate::params::OperationParams;
    use crate::test::{read_client_fixture, StubFetch};

    fn params(hash: &str, features: &str) -> OperationParams {
        OperationParams {
            hash: hash.to_string(),
            features: features.to_string(),
        }
    }

    fn jar_with_csrf() -> Arc<Jar> {
        let jar = Jar::default();
        jar.add_cookie_str("ct0=token123; Domain=x.com; Path=/", &"https://x.com".parse().unwrap());
        Arc::new(jar)
    }

    #[test]
    fn test_hash_priority() {
        let mut operations = OperationTable::new();
        let mut bundles = BundleScanState::new();
        assert_eq!(select_hash(&operations, &bundles), None);

        bundles.offer_hash("bundle".to_string());
        assert_eq!(select_hash(&operations, &bundles).as_deref(), Some("bundle"));

        operations.observe("TimelineTweetDetail", params("timeline", ""));
        assert_eq!(select_hash(&operations, &bundles).as_deref(), Some("timeline"));

        operations.observe("TweetDetail", params("detail", ""));
        assert_eq!(select_hash(&operations, &bundles).as_deref(), Some("detail"));

        operations.observe("TweetResultByRestId", params("result", ""));
        assert_eq!(select_hash(&operations, &bundles).as_deref(), Some("result"));

        operations.observe("HomeTimeline", params("home", ""));
        assert_eq!(select_hash(&operations, &bundles).as_deref(), Some("result"));
    }

    #[test]
    fn test_feature_priority() {
        let mut operations = OperationTable::new();
        let mut bundles = BundleScanState::new();
        assert_eq!(select_features(&operations, &bundles), default_features());

        bundles.offer_features(r#"{"bundle":true}"#.to_string());
        assert_eq!(select_features(&operations, &bundles), r#"{"bundle":true}"#);

        operations.observe("HomeTimeline", params("h", r#"{"home":true}"#));
        assert_eq!(select_features(&operations, &bundles), r#"{"home":true}"#);

        operations.observe("TweetDetail", params("d", ""));
        assert_eq!(select_features(&operations, &bundles), r#"{"home":true}"#);

        operations.observe("TweetDetail", params("d", r#"{"detail":true}"#));
        assert_eq!(select_features(&operations, &bundles), r#"{"detail":true}"#);
    }

    #[tokio::test]
    async fn test_no_cookie_means_no_request() {
        let stub = StubFetch::new();
        let ctx = PageContext::default();
        ctx.bundles.write().await.offer_hash("bundle".to_string());
        let resolver = GraphqlResolver::new(ctx.clone(), stub.clone(), Arc::new(Jar::default()));

        assert_eq!(resolver.resolve("1790000000000000001").await, None);
        assert_eq!(stub.calls(), 0);
        assert!(ctx.cache.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_no_hash_means_no_request() {
        let stub = StubFetch::new();
        let resolver = GraphqlResolver::new(PageContext::default(), stub.clone(), jar_with_csrf());

        assert_eq!(resolver.resolve("1790000000000000001").await, None);
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_resolves_and_backfills_cache() {
        let stub = StubFetch::new();
        stub.route("/TweetResultByRestId", StatusCode::OK, &read_client_fixture("TweetResultByRestId.json"));
        let ctx = PageContext::default();
        ctx.operations.write().await.observe("TweetDetail", params("liveHash", r#"{"live":true}"#));
        let resolver = GraphqlResolver::new(ctx.clone(), stub.clone(), jar_with_csrf());

        let text = resolver.resolve("1790000000000000001").await.unwrap();
        assert_eq!(
            text,
            "A long post that keeps going well past the limit. Read more at https://example.com/long and enjoy."
        );
        assert_eq!(ctx.cached_text("1790000000000000001").await, Some(text));

        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/i/api/graphql/liveHash/TweetResultByRestId");
        assert_eq!(requests[0].headers["x-csrf-token"], "token123");
    }

    #[tokio::test]
    async fn test_empty_text_resolves_to_nothing() {
        let stub = StubFetch::new();
        stub.route(
            "/TweetResultByRestId",
            StatusCode::OK,
            r#"{"data":{"tweetResult":{"result":{"legacy":{"id_str":"5","full_text":""}}}}}"#,
        );
        let ctx = PageContext::default();
        ctx.bundles.write().await.offer_hash("bundle".to_string());
        let resolver = GraphqlResolver::new(ctx.clone(), stub.clone(), jar_with_csrf());

        assert_eq!(resolver.resolve("5").await, None);
        assert_eq!(stub.calls(), 1);
        assert!(ctx.cache.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_failures_do_not_touch_cache() {
        let stub = StubFetch::new();
        stub.route("/TweetResultByRestId", StatusCode::FORBIDDEN, "{}");
        let ctx = PageContext::default();
        ctx.bundles.write().await.offer_hash("bundle".to_string());
        let resolver = GraphqlResolver::new(ctx.clone(), stub.clone(), jar_with_csrf());
        assert_eq!(resolver.resolve("1").await, None);

        stub.route("/TweetResultByRestId", StatusCode::OK, r#"{"data":{"tweetResult":{}}}"#);
        assert_eq!(resolver.resolve("1").await, None);

        stub.route("/TweetResultByRestId", StatusCode::OK, "<html>");
        assert_eq!(resolver.resolve("1").await, None);

        assert_eq!(stub.calls(), 3);
        assert!(ctx.cache.read().await.is_empty());
    }
}
