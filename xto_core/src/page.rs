use reqwest::cookie::CookieStore;
use std::sync::Arc;
use tokio::task::JoinHandle;

use twitter_client::Fetch;

use crate::bridge::{BridgeClient, BridgeResponder, MessageBus, WindowId};
use crate::config::Config;
use crate::context::PageContext;
use crate::graphql::GraphqlResolver;
use crate::interceptor::InterceptedFetch;
use crate::scanner::BundleScanner;

/// Every component attached to one hosting page.
///
/// `transport` is the page's own request function. Host traffic should go through
/// [`Page::fetch`] so it is observed; the scanner and the resolver use `transport` directly.
pub struct Page {
    ctx: PageContext,
    fetch: Arc<dyn Fetch>,
    scanner: BundleScanner,
    bus: MessageBus,
    window: WindowId,
    responder: JoinHandle<()>,
}

impl Page {
    pub fn attach(config: Config, transport: Arc<dyn Fetch>, cookies: Arc<dyn CookieStore>) -> Self {
        let ctx = PageContext::new(config);
        let fetch: Arc<dyn Fetch> = Arc::new(InterceptedFetch::new(transport.clone(), ctx.clone()));
        let scanner = BundleScanner::new(ctx.clone(), transport.clone());
        let resolver = Arc::new(GraphqlResolver::new(ctx.clone(), transport, cookies));

        let bus = MessageBus::default();
        let window = WindowId::new();
        let responder = BridgeResponder::new(ctx.clone(), bus.clone(), window, resolver).spawn();
        tracing::info!("Attached to page {}", ctx.config.host_origin);

        Self {
            ctx,
            fetch,
            scanner,
            bus,
            window,
            responder,
        }
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    /// The intercepted request function.
    pub fn fetch(&self) -> Arc<dyn Fetch> {
        self.fetch.clone()
    }

    pub fn scanner(&self) -> &BundleScanner {
        &self.scanner
    }

    /// A requester living in the same window as the responder.
    pub fn client(&self) -> BridgeClient {
        BridgeClient::new(self.bus.clone(), self.window, self.ctx.config.bridge_timeout)
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        self.responder.abort();
    }
}
