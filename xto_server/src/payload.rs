use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct TweetTextResponse {
    pub id: String,
    /// `None` when neither the cache nor an active lookup produced a text
    pub text: Option<String>,
}

/// Scripts that appeared on the page, delivered as one mutation batch.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptsRequest {
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageFetchRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageFetchResponse {
    pub status: u16,
    pub body: String,
}
