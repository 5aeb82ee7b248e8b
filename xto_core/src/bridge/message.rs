use serde::{Deserialize, Serialize};

/// Messages exchanged between the page-side extractor and the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BridgeMessage {
    FetchText(FetchTextRequest),
    TextResult(TextResult),
    Debug,
    DebugResult(DebugReport),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchTextRequest {
    pub id: String,
    pub correlation_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextResult {
    pub correlation_id: String,
    pub text: Option<String>,
    pub cache_size: usize,
}

/// Introspection snapshot of the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugReport {
    pub cache_size: usize,
    /// At most `DEBUG_SAMPLE_SIZE` ids, oldest first
    pub cached_ids: Vec<String>,
    pub operation_names: Vec<String>,
    pub pre_scanned_hash: Option<String>,
    pub scanned_source_count: usize,
}

pub const DEBUG_SAMPLE_SIZE: usize = 10;
