//! Request/response protocol between the page and an out-of-process extractor.

mod bus;
mod client;
mod message;
mod responder;

pub use bus::{Envelope, MessageBus, WindowId};
pub use client::BridgeClient;
pub use message::{BridgeMessage, DebugReport, FetchTextRequest, TextResult, DEBUG_SAMPLE_SIZE};
pub use responder::{debug_report, BridgeResponder};
