use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};

use xto_core::bridge::DebugReport;

use crate::{error::Result, payload::TweetTextResponse, state::AppState};

pub fn bridge_router() -> Router<AppState> {
    Router::new()
        .route("/tweet/:id/text", get(fetch_tweet_text))
        .route("/debug", get(fetch_debug))
}

async fn fetch_tweet_text(State(app_state): State<AppState>, Path(id): Path<String>) -> Json<TweetTextResponse> {
    let text = app_state.bridge.fetch_text(&id).await;
    Json(TweetTextResponse { id, text })
}

async fn fetch_debug(State(app_state): State<AppState>) -> Result<Json<DebugReport>> {
    let report = app_state
        .bridge
        .debug()
        .await
        .ok_or_else(|| xto_core::Error::Timeout("debug request was not answered".to_string()))?;
    Ok(Json(report))
}
