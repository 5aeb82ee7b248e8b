use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, oneshot, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::bus::{Envelope, MessageBus, WindowId};
use super::message::{BridgeMessage, DebugReport, FetchTextRequest};

type PendingTable<K, T> = Arc<RwLock<HashMap<K, oneshot::Sender<T>>>>;

/// Requesting side of the bridge.
///
/// Each call registers a pending entry before posting its request. The entry is removed either
/// by the dispatcher when the matching reply arrives or by the caller when the timeout fires;
/// whichever removes it decides the outcome.
pub struct BridgeClient {
    bus: MessageBus,
    window: WindowId,
    timeout: Duration,
    pending: PendingTable<String, Option<String>>,
    pending_debug: PendingTable<u64, DebugReport>,
    next_debug: AtomicU64,
    dispatcher: JoinHandle<()>,
}

impl BridgeClient {
    pub fn new(bus: MessageBus, window: WindowId, timeout: Duration) -> Self {
        let pending: PendingTable<String, Option<String>> = Arc::default();
        let pending_debug: PendingTable<u64, DebugReport> = Arc::default();
        let dispatcher = tokio::spawn(dispatch(
            bus.subscribe(),
            window,
            pending.clone(),
            pending_debug.clone(),
        ));
        Self {
            bus,
            window,
            timeout,
            pending,
            pending_debug,
            next_debug: AtomicU64::new(0),
            dispatcher,
        }
    }

    /// Ask the responder for the resolved text of `id`. `None` on a null reply or on timeout.
    pub async fn fetch_text(&self, id: &str) -> Option<String> {
        let correlation_id = Uuid::new_v4().to_string();
        let (sender, receiver) = oneshot::channel();
        self.pending.write().await.insert(correlation_id.clone(), sender);

        let request = FetchTextRequest {
            id: id.to_string(),
            correlation_id: correlation_id.clone(),
        };
        self.bus.post_message(self.window, &BridgeMessage::FetchText(request));

        let reply = await_reply(&self.pending, &correlation_id, receiver, self.timeout).await;
        if reply.is_none() {
            tracing::debug!("Bridge request {} for tweet {} timed out", correlation_id, id);
        }
        reply.flatten()
    }

    pub async fn debug(&self) -> Option<DebugReport> {
        let token = self.next_debug.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        self.pending_debug.write().await.insert(token, sender);

        self.bus.post_message(self.window, &BridgeMessage::Debug);
        await_reply(&self.pending_debug, &token, receiver, self.timeout).await
    }

    /// Calls still waiting for a reply.
    pub async fn pending_calls(&self) -> usize {
        self.pending.read().await.len() + self.pending_debug.read().await.len()
    }
}

impl Drop for BridgeClient {
    fn drop(&mut self) {
        self.dispatcher.abort();
    }
}

async fn await_reply<K, T>(
    pending: &PendingTable<K, T>,
    key: &K,
    mut receiver: oneshot::Receiver<T>,
    timeout: Duration,
) -> Option<T>
where
    K: Eq + Hash,
{
    match tokio::time::timeout(timeout, &mut receiver).await {
        Ok(reply) => reply.ok(),
        Err(_) => {
            if pending.write().await.remove(key).is_some() {
                None
            } else {
                // The dispatcher won the race and has already sent.
                receiver.try_recv().ok()
            }
        }
    }
}

async fn dispatch(
    mut messages: broadcast::Receiver<Envelope>,
    window: WindowId,
    pending: PendingTable<String, Option<String>>,
    pending_debug: PendingTable<u64, DebugReport>,
) {
    loop {
        let envelope = match messages.recv().await {
            Ok(envelope) => envelope,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Bridge client skipped {} messages", skipped);
                continue;
            }
            Err(RecvError::Closed) => break,
        };
        if envelope.source != window {
            continue;
        }

        match envelope.message() {
            Some(BridgeMessage::TextResult(result)) => {
                let mut pending = pending.write().await;
                if let Some(sender) = pending.remove(&result.correlation_id) {
                    let _ = sender.send(result.text);
                }
            }
            Some(BridgeMessage::DebugResult(report)) => {
                let mut pending_debug = pending_debug.write().await;
                for (_, sender) in pending_debug.drain() {
                    let _ = sender.send(report.clone());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    use crate::bridge::message::TextResult;
    use crate::test::settle;

    const TIMEOUT: Duration = Duration::from_secs(8);

    /// Answers every fetch-text request with a wrong id, a foreign window, and then the real reply.
    fn noisy_responder(bus: MessageBus, window: WindowId) -> JoinHandle<()> {
        let mut messages = bus.subscribe();
        tokio::spawn(async move {
            while let Ok(envelope) = messages.recv().await {
                let Some(BridgeMessage::FetchText(request)) = envelope.message() else {
                    continue;
                };
                let reply = |correlation_id: &str, text: &str| {
                    BridgeMessage::TextResult(TextResult {
                        correlation_id: correlation_id.to_string(),
                        text: Some(text.to_string()),
                        cache_size: 0,
                    })
                };
                bus.post_message(window, &reply("other", "wrong id"));
                bus.post_message(WindowId::new(), &reply(&request.correlation_id, "foreign"));
                bus.post(window, json!({"type": "text-result", "correlationId": request.correlation_id}));
                bus.post_message(window, &reply(&request.correlation_id, &format!("text of {}", request.id)));
            }
        })
    }

    #[tokio::test]
    async fn test_only_matching_reply_resolves() {
        let bus = MessageBus::default();
        let window = WindowId::new();
        let _responder = noisy_responder(bus.clone(), window);
        let client = BridgeClient::new(bus, window, TIMEOUT);

        let (a, b) = tokio::join!(client.fetch_text("1"), client.fetch_text("2"));
        assert_eq!(a.as_deref(), Some("text of 1"));
        assert_eq!(b.as_deref(), Some("text of 2"));
        assert_eq!(client.pending_calls().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_removes_listener() {
        let bus = MessageBus::default();
        let window = WindowId::new();
        let mut observer = bus.subscribe();
        let client = BridgeClient::new(bus.clone(), window, TIMEOUT);

        let started = tokio::time::Instant::now();
        assert_eq!(client.fetch_text("1").await, None);
        let elapsed = started.elapsed();
        assert!(elapsed >= TIMEOUT && elapsed < TIMEOUT + Duration::from_millis(10));
        assert_eq!(client.pending_calls().await, 0);

        let Some(BridgeMessage::FetchText(request)) = observer.recv().await.unwrap().message() else {
            panic!("expected the fetch-text request");
        };
        let late = BridgeMessage::TextResult(TextResult {
            correlation_id: request.correlation_id,
            text: Some("late".to_string()),
            cache_size: 1,
        });
        bus.post_message(window, &late);
        settle().await;
        assert_eq!(client.pending_calls().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debug_times_out_without_responder() {
        let client = BridgeClient::new(MessageBus::default(), WindowId::new(), TIMEOUT);
        assert_eq!(client.debug().await, None);
        assert_eq!(client.pending_calls().await, 0);
    }
}
