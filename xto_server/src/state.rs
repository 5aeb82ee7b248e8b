use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use xto_core::bridge::BridgeClient;
use xto_core::scanner::{DomMutation, ReadyState};
use xto_core::Page;

#[derive(Clone)]
pub struct AppState {
    /// The hosted page and everything attached to it
    pub page: Arc<Page>,
    /// Requesting side of the bridge, in the page's window
    pub bridge: Arc<BridgeClient>,

    /// Mutation batches for the script observer
    pub mutations: mpsc::UnboundedSender<Vec<DomMutation>>,
    /// Page ready state
    pub ready: Arc<watch::Sender<ReadyState>>,
}
