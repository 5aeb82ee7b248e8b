use axum::{extract::State, response::Json, routing::post, Router};
use reqwest::Url;

use twitter_client::{Fetch, FetchRequest};
use xto_core::scanner::{DomMutation, ReadyState};

use crate::{
    error::Result,
    payload::{PageFetchRequest, PageFetchResponse, ScriptsRequest},
    state::AppState,
};

pub fn page_router() -> Router<AppState> {
    Router::new()
        .route("/page/scripts", post(add_scripts))
        .route("/page/ready", post(mark_ready))
        .route("/page/fetch", post(page_fetch))
}

async fn add_scripts(State(app_state): State<AppState>, Json(payload): Json<ScriptsRequest>) -> Result<()> {
    let batch = payload
        .sources
        .into_iter()
        .map(|src| DomMutation::ScriptAdded { src: Some(src) })
        .collect();
    app_state
        .mutations
        .send(batch)
        .map_err(|_| anyhow::anyhow!("Script observer is not running"))?;
    Ok(())
}

async fn mark_ready(State(app_state): State<AppState>) {
    let previous = app_state.ready.send_replace(ReadyState::Ready);
    if previous == ReadyState::Loading {
        tracing::info!("Page is ready");
    }
}

/// Issue a request as the page itself would, so the response is observed.
async fn page_fetch(
    State(app_state): State<AppState>,
    Json(payload): Json<PageFetchRequest>,
) -> Result<Json<PageFetchResponse>> {
    let url = Url::parse(&payload.url)?;
    let response = app_state.page.fetch().fetch(FetchRequest::get(url)).await?;
    Ok(Json(PageFetchResponse {
        status: response.status.as_u16(),
        body: response.text(),
    }))
}
