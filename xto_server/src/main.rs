mod error;
mod payload;
mod router;
mod state;

use axum::Router;
use dotenvy::dotenv;
use itertools::Itertools;
use reqwest::cookie::Jar;
use tokio::sync::{mpsc, watch};
use tower_http::trace::TraceLayer;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use std::env;
use std::sync::Arc;

use twitter_client::{Fetch, HttpFetch, SessionCookie};
use xto_core::scanner::ReadyState;
use xto_core::{Config, Page};

use crate::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 1. Initialize logger
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env()
        .unwrap()
        .add_directive("hyper::proto=info".parse().unwrap())
        .add_directive("hyper::client=info".parse().unwrap())
        .add_directive("reqwest=info".parse().unwrap());
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    // 2. Load configuration
    let config = Config::from_env().expect("XTO_* variables must be valid");

    // 3. Initialize session
    let jar = Arc::new(Jar::default());
    match env::var("XTO_COOKIE") {
        Ok(cookie) => {
            let cookie: SessionCookie = cookie.parse().expect("XTO_COOKIE must contain ct0 and auth_token");
            cookie.install(&jar).expect("cannot install session cookie");
        }
        Err(_) => tracing::warn!("XTO_COOKIE not set, active lookups will find no credential"),
    }
    let transport: Arc<dyn Fetch> = Arc::new(HttpFetch::new(jar.clone()).expect("cannot build HTTP client"));

    // 4. Attach to the page
    let page = Arc::new(Page::attach(config, transport, jar));

    let (mutations, mutation_receiver) = mpsc::unbounded_channel();
    page.scanner().observe(mutation_receiver);

    let (ready, ready_receiver) = watch::channel(ReadyState::Loading);
    let sources = env::var("XTO_SCRIPT_SOURCES")
        .map(|sources| {
            sources
                .split(',')
                .map(str::trim)
                .filter(|src| !src.is_empty())
                .map(str::to_string)
                .collect_vec()
        })
        .unwrap_or_default();
    page.scanner().scan_existing(sources, ready_receiver);

    // 5. Setup state and router
    let app_state = AppState {
        bridge: Arc::new(page.client()),
        page,
        mutations,
        ready: Arc::new(ready),
    };

    let app = Router::new()
        .merge(router::bridge::bridge_router())
        .merge(router::page::page_router())
        .layer(TraceLayer::new_for_http().on_request(()))
        .with_state(app_state);

    // 6. Start server
    let addr = env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set");
    tracing::info!("Server starting at {}", addr);
    axum::Server::bind(&addr.parse().unwrap())
        .serve(app.into_make_service())
        .await
        .unwrap();
}
