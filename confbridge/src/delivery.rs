//! Result delivery back to the embedding layer
//!
//! Every command resolves to at most one [`Reply`] pushed through a
//! [`ResultSink`]. Callback identifiers come in two lifetime classes,
//! modeled explicitly by [`CallbackRef`]: one-shot identifiers are
//! consumed by their first reply, persistent ones keep receiving replies
//! until they are replaced. The [`CallbackRegistry`] enforces that split
//! so a consumed identifier can never be resolved twice.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use dashmap::DashMap;
use futures::Stream;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Callback identifier tagged with its lifetime class
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackRef {
    /// Resolved exactly once, then consumed
    OneShot(String),
    /// Resolved zero or more times, valid until explicitly replaced
    Persistent(String),
}

impl CallbackRef {
    /// The opaque identifier
    pub fn id(&self) -> &str {
        match self {
            CallbackRef::OneShot(id) | CallbackRef::Persistent(id) => id,
        }
    }

    /// Whether the identifier survives delivery
    pub fn is_persistent(&self) -> bool {
        matches!(self, CallbackRef::Persistent(_))
    }
}

/// Lifetime class recorded for a registered identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackLifetime {
    /// Consumed by its first reply
    OneShot,
    /// Survives delivery
    Persistent,
}

/// Status of a delivered reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    /// Operation succeeded
    Ok,
    /// Operation failed
    Error,
}

/// One result delivered back through a callback identifier
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Identifier the reply resolves
    pub callback_id: String,
    /// Outcome status
    pub status: ReplyStatus,
    /// Payload for successes, error message for failures
    pub payload: Option<Value>,
    /// Whether the identifier remains valid for future replies
    pub keep_callback: bool,
}

impl Reply {
    /// Success with no payload
    pub fn ok(callback_id: impl Into<String>) -> Self {
        Self {
            callback_id: callback_id.into(),
            status: ReplyStatus::Ok,
            payload: None,
            keep_callback: false,
        }
    }

    /// Success carrying a payload
    pub fn ok_with(callback_id: impl Into<String>, payload: Value) -> Self {
        Self {
            callback_id: callback_id.into(),
            status: ReplyStatus::Ok,
            payload: Some(payload),
            keep_callback: false,
        }
    }

    /// Failure carrying the engine's description
    pub fn error(callback_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            callback_id: callback_id.into(),
            status: ReplyStatus::Error,
            payload: Some(Value::String(message.into())),
            keep_callback: false,
        }
    }

    /// Error message, when this is a failure reply
    pub fn error_message(&self) -> Option<&str> {
        match self.status {
            ReplyStatus::Error => self.payload.as_ref().and_then(Value::as_str),
            ReplyStatus::Ok => None,
        }
    }
}

/// Outbound seam the bridge pushes replies through
pub trait ResultSink: Send + Sync {
    /// Deliver one reply to the embedding layer
    fn deliver(&self, reply: Reply);
}

/// Registry of outstanding callback identifiers.
///
/// Claiming a one-shot identifier removes it, so a second claim fails and
/// the reply is dropped instead of delivered twice. Persistent identifiers
/// survive claims and are removed only by [`discard`](Self::discard).
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    entries: DashMap<String, CallbackLifetime>,
}

impl CallbackRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identifier with the lifetime class of `callback`
    pub fn register(&self, callback: &CallbackRef) {
        let lifetime = if callback.is_persistent() {
            CallbackLifetime::Persistent
        } else {
            CallbackLifetime::OneShot
        };
        self.entries.insert(callback.id().to_string(), lifetime);
    }

    /// Claim an identifier for delivery.
    ///
    /// One-shot entries are consumed by the claim.
    pub fn claim(&self, id: &str) -> Option<CallbackLifetime> {
        // Drop the read guard before removing, or the shard deadlocks.
        let lifetime = self.entries.get(id).map(|entry| *entry.value())?;
        if lifetime == CallbackLifetime::OneShot {
            self.entries.remove(id);
        }
        Some(lifetime)
    }

    /// Remove an identifier without delivering anything
    pub fn discard(&self, id: &str) {
        self.entries.remove(id);
    }

    /// Whether an identifier is still outstanding
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of outstanding identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no identifiers are outstanding
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry-checked reply delivery.
///
/// The worker resolves every command through a responder so the one-shot
/// invariant holds no matter which operation path produced the reply.
pub struct Responder {
    registry: CallbackRegistry,
    sink: Arc<dyn ResultSink>,
}

impl Responder {
    /// Create a responder pushing replies into `sink`
    pub fn new(sink: Arc<dyn ResultSink>) -> Self {
        Self {
            registry: CallbackRegistry::new(),
            sink,
        }
    }

    /// Record an identifier before its operation runs
    pub fn register(&self, callback: &CallbackRef) {
        self.registry.register(callback);
    }

    /// Drop an identifier without delivering a reply
    pub fn discard(&self, callback: &CallbackRef) {
        self.registry.discard(callback.id());
    }

    /// Deliver a success with no payload
    pub fn ok(&self, callback: &CallbackRef) {
        self.deliver(callback, Reply::ok(callback.id()));
    }

    /// Deliver a success carrying a payload
    pub fn ok_with(&self, callback: &CallbackRef, payload: Value) {
        self.deliver(callback, Reply::ok_with(callback.id(), payload));
    }

    /// Deliver a failure carrying the engine's description
    pub fn error(&self, callback: &CallbackRef, message: impl Into<String>) {
        self.deliver(callback, Reply::error(callback.id(), message));
    }

    /// Outstanding identifiers
    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    fn deliver(&self, callback: &CallbackRef, mut reply: Reply) {
        match self.registry.claim(callback.id()) {
            Some(lifetime) => {
                reply.keep_callback = lifetime == CallbackLifetime::Persistent;
                debug!(
                    callback_id = callback.id(),
                    status = ?reply.status,
                    keep = reply.keep_callback,
                    "Delivering reply"
                );
                self.sink.deliver(reply);
            }
            None => {
                warn!(
                    callback_id = callback.id(),
                    "Dropping reply for consumed or unknown callback"
                );
            }
        }
    }
}

/// Sink pushing replies into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Reply>,
}

impl ChannelSink {
    /// Create a sink together with the stream draining it
    pub fn channel() -> (Self, ReplyStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, ReplyStream::new(rx))
    }
}

impl ResultSink for ChannelSink {
    fn deliver(&self, reply: Reply) {
        if self.tx.send(reply).is_err() {
            debug!("Reply stream dropped, discarding reply");
        }
    }
}

/// Stream of replies for async consumption
#[derive(Debug)]
pub struct ReplyStream {
    receiver: mpsc::UnboundedReceiver<Reply>,
}

impl ReplyStream {
    /// Create a stream over a reply receiver
    pub fn new(receiver: mpsc::UnboundedReceiver<Reply>) -> Self {
        Self { receiver }
    }

    /// Next reply, waiting until one arrives
    pub async fn next(&mut self) -> Option<Reply> {
        self.receiver.recv().await
    }

    /// Next reply without waiting
    pub fn try_next(&mut self) -> Option<Reply> {
        self.receiver.try_recv().ok()
    }

    /// Close the stream
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

impl Stream for ReplyStream {
    type Item = Reply;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Reply>> {
        self.receiver.poll_recv(cx)
    }
}

/// Sink collecting replies in memory, for embedding tests and demos
#[derive(Debug, Default)]
pub struct MemorySink {
    replies: parking_lot::Mutex<Vec<Reply>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far
    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().clone()
    }

    /// Drain everything delivered so far
    pub fn take(&self) -> Vec<Reply> {
        std::mem::take(&mut self.replies.lock())
    }

    /// Number of replies delivered so far
    pub fn len(&self) -> usize {
        self.replies.lock().len()
    }

    /// Whether nothing has been delivered yet
    pub fn is_empty(&self) -> bool {
        self.replies.lock().is_empty()
    }
}

impl ResultSink for MemorySink {
    fn deliver(&self, reply: Reply) {
        self.replies.lock().push(reply);
    }
}
