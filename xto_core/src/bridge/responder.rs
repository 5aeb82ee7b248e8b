use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::bus::{MessageBus, WindowId};
use super::message::{BridgeMessage, DebugReport, FetchTextRequest, TextResult, DEBUG_SAMPLE_SIZE};
use crate::context::PageContext;
use crate::graphql::GraphqlResolver;

/// Answering side of the bridge: cache first, then an active lookup.
pub struct BridgeResponder {
    ctx: PageContext,
    bus: MessageBus,
    window: WindowId,
    resolver: Arc<GraphqlResolver>,
}

impl BridgeResponder {
    pub fn new(ctx: PageContext, bus: MessageBus, window: WindowId, resolver: Arc<GraphqlResolver>) -> Self {
        Self {
            ctx,
            bus,
            window,
            resolver,
        }
    }

    /// Start answering. Subscribes before returning, so requests posted afterwards are seen.
    pub fn spawn(self) -> JoinHandle<()> {
        let mut messages = self.bus.subscribe();
        let responder = Arc::new(self);
        tokio::spawn(async move {
            loop {
                let envelope = match messages.recv().await {
                    Ok(envelope) => envelope,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Bridge responder skipped {} messages", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if envelope.source != responder.window {
                    continue;
                }

                match envelope.message() {
                    Some(BridgeMessage::FetchText(request)) => {
                        let responder = responder.clone();
                        tokio::spawn(async move { responder.answer_text(request).await });
                    }
                    Some(BridgeMessage::Debug) => {
                        let responder = responder.clone();
                        tokio::spawn(async move { responder.answer_debug().await });
                    }
                    _ => {}
                }
            }
        })
    }

    async fn answer_text(&self, request: FetchTextRequest) {
        let text = self.lookup(&request.id).await;
        let cache_size = self.ctx.cache.read().await.len();
        tracing::debug!(
            "Answering bridge request {} for tweet {} (found: {})",
            request.correlation_id,
            request.id,
            text.is_some()
        );

        let result = TextResult {
            correlation_id: request.correlation_id,
            text,
            cache_size,
        };
        self.bus.post_message(self.window, &BridgeMessage::TextResult(result));
    }

    async fn lookup(&self, id: &str) -> Option<String> {
        if id.is_empty() {
            return None;
        }
        match self.ctx.cached_text(id).await {
            Some(text) => Some(text),
            None => self.resolver.resolve(id).await,
        }
    }

    async fn answer_debug(&self) {
        let report = debug_report(&self.ctx).await;
        self.bus.post_message(self.window, &BridgeMessage::DebugResult(report));
    }
}

pub async fn debug_report(ctx: &PageContext) -> DebugReport {
    let (cache_size, cached_ids) = {
        let cache = ctx.cache.read().await;
        let ids = cache.ids().take(DEBUG_SAMPLE_SIZE).map(str::to_string).collect();
        (cache.len(), ids)
    };
    let operation_names = ctx.operations.read().await.names();
    let bundles = ctx.bundles.read().await;
    DebugReport {
        cache_size,
        cached_ids,
        operation_names,
        pre_scanned_hash: bundles.pre_scanned_hash().map(str::to_string),
        scanned_source_count: bundles.scanned_count(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use reqwest::cookie::Jar;
    use reqwest::StatusCode;
    use std::time::Duration;

    use crate::bridge::client::BridgeClient;
    use crate::params::OperationParams;
    use crate::test::{read_client_fixture, StubFetch};

    const TIMEOUT: Duration = Duration::from_secs(8);

    fn attach(ctx: &PageContext, stub: Arc<StubFetch>, jar: Jar) -> (BridgeClient, JoinHandle<()>) {
        let bus = MessageBus::default();
        let window = WindowId::new();
        let resolver = Arc::new(GraphqlResolver::new(ctx.clone(), stub, Arc::new(jar)));
        let responder = BridgeResponder::new(ctx.clone(), bus.clone(), window, resolver).spawn();
        (BridgeClient::new(bus, window, TIMEOUT), responder)
    }

    #[tokio::test]
    async fn test_answers_from_cache() {
        let ctx = PageContext::default();
        ctx.cache_text("42", "cached text".to_string()).await;
        let stub = StubFetch::new();
        let (client, _responder) = attach(&ctx, stub.clone(), Jar::default());

        assert_eq!(client.fetch_text("42").await.as_deref(), Some("cached text"));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_without_anything_answers_null_quickly() {
        let stub = StubFetch::new();
        let (client, _responder) = attach(&PageContext::default(), stub.clone(), Jar::default());

        let started = std::time::Instant::now();
        assert_eq!(client.fetch_text("1790000000000000001").await, None);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(stub.calls(), 0);
        assert_eq!(client.pending_calls().await, 0);
    }

    #[tokio::test]
    async fn test_miss_falls_back_to_active_lookup() {
        let ctx = PageContext::default();
        ctx.operations.write().await.observe(
            "TweetResultByRestId",
            OperationParams {
                hash: "liveHash".to_string(),
                features: String::new(),
            },
        );
        let stub = StubFetch::new();
        stub.route("/TweetResultByRestId", StatusCode::OK, &read_client_fixture("TweetResultByRestId.json"));
        let jar = Jar::default();
        jar.add_cookie_str("ct0=token123; Domain=x.com; Path=/", &ctx.config.host_origin);
        let (client, _responder) = attach(&ctx, stub.clone(), jar);

        let text = client.fetch_text("1790000000000000001").await.unwrap();
        assert!(text.ends_with("Read more at https://example.com/long and enjoy."));
        assert_eq!(stub.calls(), 1);

        // Served from the cache the second time.
        assert_eq!(client.fetch_text("1790000000000000001").await, Some(text));
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_debug_report() {
        let ctx = PageContext::default();
        for i in 0..12 {
            ctx.cache_text(&i.to_string(), format!("text {}", i)).await;
        }
        ctx.operations.write().await.observe(
            "HomeTimeline",
            OperationParams {
                hash: "h".to_string(),
                features: String::new(),
            },
        );
        {
            let mut bundles = ctx.bundles.write().await;
            bundles.mark_scanned("https://abs.twimg.com/main.js");
            bundles.offer_hash("bundleHash".to_string());
        }
        let (client, _responder) = attach(&ctx, StubFetch::new(), Jar::default());

        let report = client.debug().await.unwrap();
        assert_eq!(report.cache_size, 12);
        assert_eq!(report.cached_ids, (0..10).map(|i| i.to_string()).collect::<Vec<_>>());
        assert_eq!(report.operation_names, vec!["HomeTimeline".to_string()]);
        assert_eq!(report.pre_scanned_hash.as_deref(), Some("bundleHash"));
        assert_eq!(report.scanned_source_count, 1);
    }

    #[tokio::test]
    async fn test_foreign_window_is_ignored() {
        let ctx = PageContext::default();
        ctx.cache_text("42", "cached text".to_string()).await;
        let bus = MessageBus::default();
        let resolver = Arc::new(GraphqlResolver::new(ctx.clone(), StubFetch::new(), Arc::new(Jar::default())));
        let _responder = BridgeResponder::new(ctx, bus.clone(), WindowId::new(), resolver).spawn();

        let mut observer = bus.subscribe();
        let request = BridgeMessage::FetchText(FetchTextRequest {
            id: "42".to_string(),
            correlation_id: "c1".to_string(),
        });
        bus.post_message(WindowId::new(), &request);
        crate::test::settle().await;

        // Only the request itself went over the bus.
        assert!(observer.try_recv().is_ok());
        assert!(observer.try_recv().is_err());
    }
}
