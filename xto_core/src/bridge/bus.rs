use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::message::BridgeMessage;

/// Identity of the window a message was posted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(Uuid);

impl WindowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct Envelope {
    pub source: WindowId,
    pub data: Value,
}

impl Envelope {
    /// The payload as a bridge message, or `None` for anything else on the channel.
    pub fn message(&self) -> Option<BridgeMessage> {
        serde_json::from_value(self.data.clone()).ok()
    }
}

/// Shared, unauthenticated message channel. Every subscriber sees every message,
/// its own included.
#[derive(Debug, Clone)]
pub struct MessageBus {
    sender: broadcast::Sender<Envelope>,
}

impl MessageBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn post(&self, source: WindowId, data: Value) {
        // Nobody listening is not an error.
        let _ = self.sender.send(Envelope { source, data });
    }

    pub fn post_message(&self, source: WindowId, message: &BridgeMessage) {
        match serde_json::to_value(message) {
            Ok(data) => self.post(source, data),
            Err(e) => tracing::error!("Cannot encode bridge message: {}", e),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.sender.subscribe()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(256)
    }
}
