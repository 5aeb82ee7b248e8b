//! Proactive discovery of operation parameters from the host's script bundles.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use twitter_client::bundle::{find_feature_object, find_query_id};
use twitter_client::{Fetch, FetchRequest};
use xto_util::host_matches;

use crate::context::PageContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Ready,
}

/// One structural change of the page, as delivered by a mutation observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomMutation {
    ScriptAdded { src: Option<String> },
    Other,
}

#[derive(Clone)]
pub struct BundleScanner {
    ctx: PageContext,
    /// Unobserved transport
    fetch: Arc<dyn Fetch>,
}

impl BundleScanner {
    pub fn new(ctx: PageContext, fetch: Arc<dyn Fetch>) -> Self {
        Self { ctx, fetch }
    }

    /// Start a background scan of `src` if it is trusted and new.
    /// The returned handle completes when that scan is done.
    pub async fn scan_script(&self, src: &str) -> Option<JoinHandle<()>> {
        let url = self.ctx.config.host_origin.join(src).ok()?;
        if !host_matches(url.as_str(), &self.ctx.config.trusted_script_hosts) {
            return None;
        }
        if !self.ctx.bundles.write().await.mark_scanned(url.as_str()) {
            return None;
        }

        let ctx = self.ctx.clone();
        let fetch = self.fetch.clone();
        Some(tokio::spawn(async move {
            let response = fetch.fetch(FetchRequest::get(url.clone())).await;
            let source = match response.and_then(|r| r.error_for_status()) {
                Ok(response) => response.text(),
                Err(e) => {
                    tracing::debug!("Cannot fetch bundle {}: {}", url, e);
                    return;
                }
            };
            scan_source(&ctx, url.as_str(), &source).await;
        }))
    }

    /// Scan every script added by incoming mutation batches, as soon as it appears.
    pub fn observe(&self, mut mutations: mpsc::UnboundedReceiver<Vec<DomMutation>>) -> JoinHandle<()> {
        let scanner = self.clone();
        tokio::spawn(async move {
            while let Some(batch) = mutations.recv().await {
                for mutation in batch {
                    if let DomMutation::ScriptAdded { src: Some(src) } = mutation {
                        scanner.scan_script(&src).await;
                    }
                }
            }
            tracing::debug!("Mutation stream closed, script observer stopped");
        })
    }

    /// Scan scripts that were on the page before observation started, once the page is ready.
    pub fn scan_existing(&self, sources: Vec<String>, mut ready: watch::Receiver<ReadyState>) -> JoinHandle<()> {
        let scanner = self.clone();
        tokio::spawn(async move {
            if *ready.borrow() == ReadyState::Loading {
                tracing::debug!("Page still loading, deferring scan of {} scripts", sources.len());
                if ready.wait_for(|state| *state == ReadyState::Ready).await.is_err() {
                    return;
                }
            }
            for src in &sources {
                scanner.scan_script(src).await;
            }
        })
    }
}

async fn scan_source(ctx: &PageContext, src: &str, source: &str) {
    let (need_hash, need_features) = {
        let bundles = ctx.bundles.read().await;
        (bundles.pre_scanned_hash().is_none(), bundles.fallback_features().is_none())
    };
    if !need_hash && !need_features {
        return;
    }

    let hash = if need_hash { find_query_id(source) } else { None };
    let features = if need_features { find_feature_object(source) } else { None };

    let mut bundles = ctx.bundles.write().await;
    if let Some(hash) = hash {
        if bundles.offer_hash(hash) {
            tracing::info!("Found operation hash in bundle {}", src);
        }
    }
    if let Some(features) = features {
        if bundles.offer_features(features) {
            tracing::info!("Found feature flags in bundle {}", src);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use reqwest::StatusCode;

    use crate::test::{read_client_fixture, settle, StubFetch};

    const MAIN_BUNDLE: &str = "https://abs.twimg.com/responsive-web/client-web/main.abc.js";

    fn scanner_with_bundle() -> (BundleScanner, Arc<StubFetch>, PageContext) {
        let stub = StubFetch::new();
        stub.route("main.abc.js", StatusCode::OK, &read_client_fixture("main.bundle.js"));
        stub.route("vendor.js", StatusCode::OK, r#"queryId:"later",operationName:"TweetResultByRestId""#);
        let ctx = PageContext::default();
        (BundleScanner::new(ctx.clone(), stub.clone()), stub, ctx)
    }

    #[tokio::test]
    async fn test_scan_extracts_parameters() {
        let (scanner, _, ctx) = scanner_with_bundle();
        scanner.scan_script(MAIN_BUNDLE).await.unwrap().await.unwrap();

        let bundles = ctx.bundles.read().await;
        assert_eq!(bundles.pre_scanned_hash(), Some("Xl5pC_lBk_gcO2ItU39DQw"));
        assert!(bundles.fallback_features().unwrap().contains("verified_phone_label_enabled"));
    }

    #[tokio::test]
    async fn test_first_match_is_kept() {
        let (scanner, _, ctx) = scanner_with_bundle();
        scanner.scan_script(MAIN_BUNDLE).await.unwrap().await.unwrap();
        scanner.scan_script("https://abs.twimg.com/vendor.js").await.unwrap().await.unwrap();
        assert_eq!(ctx.bundles.read().await.pre_scanned_hash(), Some("Xl5pC_lBk_gcO2ItU39DQw"));
    }

    #[tokio::test]
    async fn test_dedupe_and_allowlist() {
        let (scanner, stub, ctx) = scanner_with_bundle();
        assert!(scanner.scan_script(MAIN_BUNDLE).await.is_some());
        assert!(scanner.scan_script(MAIN_BUNDLE).await.is_none());
        assert!(scanner.scan_script("https://cdn.example.com/main.abc.js").await.is_none());
        settle().await;

        assert_eq!(stub.calls(), 1);
        assert_eq!(ctx.bundles.read().await.scanned_count(), 1);
    }

    #[tokio::test]
    async fn test_dedupe_uses_resolved_url() {
        let (scanner, stub, ctx) = scanner_with_bundle();
        stub.route("x.com/main.js", StatusCode::OK, "");
        assert!(scanner.scan_script("/main.js").await.is_some());
        assert!(scanner.scan_script("https://x.com/main.js").await.is_none());
        settle().await;

        assert_eq!(stub.calls(), 1);
        assert_eq!(ctx.bundles.read().await.scanned_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_swallowed() {
        let (scanner, _, ctx) = scanner_with_bundle();
        scanner
            .scan_script("https://abs.twimg.com/missing.js")
            .await
            .unwrap()
            .await
            .unwrap();
        let bundles = ctx.bundles.read().await;
        assert_eq!(bundles.pre_scanned_hash(), None);
        assert_eq!(bundles.scanned_count(), 1);
    }

    #[tokio::test]
    async fn test_existing_scripts_wait_for_ready() {
        let (scanner, stub, ctx) = scanner_with_bundle();
        let (ready_sender, ready) = watch::channel(ReadyState::Loading);
        let handle = scanner.scan_existing(vec![MAIN_BUNDLE.to_string()], ready);

        settle().await;
        assert_eq!(stub.calls(), 0);

        ready_sender.send(ReadyState::Ready).unwrap();
        handle.await.unwrap();
        settle().await;
        assert_eq!(stub.calls(), 1);
        assert!(ctx.bundles.read().await.pre_scanned_hash().is_some());
    }

    #[tokio::test]
    async fn test_added_scripts_scan_while_loading() {
        let (scanner, stub, _) = scanner_with_bundle();
        let (_ready_sender, ready) = watch::channel(ReadyState::Loading);
        let _existing = scanner.scan_existing(vec!["https://abs.twimg.com/vendor.js".to_string()], ready);

        let (mutation_sender, mutations) = mpsc::unbounded_channel();
        let observer = scanner.observe(mutations);
        mutation_sender
            .send(vec![
                DomMutation::Other,
                DomMutation::ScriptAdded { src: None },
                DomMutation::ScriptAdded {
                    src: Some(MAIN_BUNDLE.to_string()),
                },
            ])
            .unwrap();
        drop(mutation_sender);
        observer.await.unwrap();
        settle().await;

        let urls: Vec<_> = stub.requests().iter().map(|r| r.url.to_string()).collect();
        assert_eq!(urls, vec![MAIN_BUNDLE.to_string()]);
    }
}
