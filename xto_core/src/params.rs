use std::collections::{HashMap, HashSet};

/// Hash and serialized feature flags needed to call one GraphQL operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationParams {
    pub hash: String,
    pub features: String,
}

/// Operation parameters seen on live requests. The latest observation always wins.
#[derive(Debug, Clone, Default)]
pub struct OperationTable {
    operations: HashMap<String, OperationParams>,
}

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, name: impl Into<String>, params: OperationParams) {
        self.operations.insert(name.into(), params);
    }

    pub fn get(&self, name: &str) -> Option<&OperationParams> {
        self.operations.get(name)
    }

    /// Hash of the first operation in `priority` that has been observed.
    pub fn hash_for(&self, priority: &[&str]) -> Option<&str> {
        priority
            .iter()
            .find_map(|name| self.operations.get(*name))
            .map(|params| params.hash.as_str())
    }

    /// Feature string of the first operation in `priority` observed with non-empty features.
    pub fn features_for(&self, priority: &[&str]) -> Option<&str> {
        priority
            .iter()
            .filter_map(|name| self.operations.get(*name))
            .map(|params| params.features.as_str())
            .find(|features| !features.is_empty())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.operations.keys().cloned().collect();
        names.sort();
        names
    }
}

/// What the bundle scan has found so far. Each value is set at most once.
#[derive(Debug, Clone, Default)]
pub struct BundleScanState {
    scanned_sources: HashSet<String>,
    pre_scanned_hash: Option<String>,
    fallback_features: Option<String>,
}

impl BundleScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `src` as scanned. Returns `false` if it already was.
    pub fn mark_scanned(&mut self, src: &str) -> bool {
        self.scanned_sources.insert(src.to_string())
    }

    pub fn scanned_count(&self) -> usize {
        self.scanned_sources.len()
    }

    /// Keep `hash` unless one was found before. Returns whether it was kept.
    pub fn offer_hash(&mut self, hash: String) -> bool {
        offer(&mut self.pre_scanned_hash, hash)
    }

    /// Keep `features` unless a fallback was found before. Returns whether it was kept.
    pub fn offer_features(&mut self, features: String) -> bool {
        offer(&mut self.fallback_features, features)
    }

    pub fn pre_scanned_hash(&self) -> Option<&str> {
        self.pre_scanned_hash.as_deref()
    }

    pub fn fallback_features(&self) -> Option<&str> {
        self.fallback_features.as_deref()
    }
}

fn offer(slot: &mut Option<String>, value: String) -> bool {
    if slot.is_some() || value.is_empty() {
        return false;
    }
    *slot = Some(value);
    true
}
