//! Passive side of text resolution: watch the page's own API traffic.

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use twitter_client::operation::{is_api_request, parse_operation, ObservedOperation};
use twitter_client::{Fetch, FetchRequest, FetchResponse, Tweet, TweetRecord};

use crate::context::PageContext;
use crate::params::OperationParams;
use crate::text::resolve_record;

/// Wraps the page's outgoing request function.
///
/// Callers get exactly what the inner transport returns. For API responses, operation
/// parameters and post records are harvested on a separate task, and any failure there
/// stays there.
#[derive(Debug, Clone)]
pub struct InterceptedFetch<F> {
    inner: F,
    ctx: PageContext,
}

impl<F: Fetch> InterceptedFetch<F> {
    pub fn new(inner: F, ctx: PageContext) -> Self {
        Self { inner, ctx }
    }

    /// The unwrapped transport, for traffic that must not be observed.
    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: Fetch> Fetch for InterceptedFetch<F> {
    async fn fetch(&self, request: FetchRequest) -> twitter_client::Result<FetchResponse> {
        let url = request.url.clone();
        let response = self.inner.fetch(request).await?;

        if is_api_request(&url) {
            let ctx = self.ctx.clone();
            let copy = response.clone();
            tokio::spawn(async move { harvest(&ctx, &url, copy).await });
        }

        Ok(response)
    }
}

/// Record operation parameters from the request URL and cache every post record in the body.
pub(crate) async fn harvest(ctx: &PageContext, request_url: &Url, response: FetchResponse) {
    if let Some(operation) = parse_operation(request_url) {
        record_operation(ctx, operation).await;
    }

    let body: Value = match response.json() {
        Ok(body) => body,
        Err(e) => {
            tracing::trace!("Skipping non-JSON response from {}: {}", response.url.path(), e);
            return;
        }
    };

    let records = collect_records(&body, ctx.config.max_depth);
    if records.is_empty() {
        return;
    }

    let mut cache = ctx.cache.write().await;
    for record in &records {
        cache.put(record.id.as_str(), resolve_record(record));
    }
    tracing::debug!(
        "Cached {} tweets from {} (cache size {})",
        records.len(),
        response.url.path(),
        cache.len()
    );
}

async fn record_operation(ctx: &PageContext, operation: ObservedOperation) {
    let ObservedOperation { name, hash, features } = operation;
    tracing::trace!("Observed operation {} with hash {}", name, hash);

    ctx.operations.write().await.observe(
        name.as_str(),
        OperationParams {
            hash,
            features: features.clone(),
        },
    );
    if !features.is_empty() && ctx.bundles.write().await.offer_features(features) {
        tracing::debug!("Fallback features taken from live {} request", name);
    }
}

/// Every post record reachable from `root` within `max_depth` levels, in document order.
pub(crate) fn collect_records(root: &Value, max_depth: usize) -> Vec<TweetRecord> {
    let mut records = Vec::new();
    let mut stack = vec![(root, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        if depth > max_depth {
            continue;
        }

        if Tweet::is_record(node) {
            match Tweet::from_json(node) {
                Ok(tweet) => {
                    if let Some(record) = tweet.id().and_then(|id| tweet.to_record(id)) {
                        records.push(record);
                    }
                }
                Err(e) => tracing::trace!("Skipping malformed tweet record: {}", e),
            }
        }

        match node {
            Value::Object(map) => stack.extend(map.values().rev().map(|child| (child, depth + 1))),
            Value::Array(items) => stack.extend(items.iter().rev().map(|child| (child, depth + 1))),
            _ => {}
        }
    }

    records
}
