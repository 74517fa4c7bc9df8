//! # confbridge - Asynchronous Conferencing Command Bridge
//!
//! confbridge marshals plugin-style commands (method name, positional
//! untyped arguments, opaque callback identifier) into calls on an
//! external conferencing engine and marshals the engine's asynchronous
//! outcomes back through a small fixed result vocabulary: ok,
//! ok-with-payload, or error-with-message.
//!
//! ## Key Properties
//!
//! - **Single worker**: every engine call runs on one dispatch task, so
//!   the engine never sees concurrent calls from the bridge
//! - **Non-blocking submission**: [`Bridge::submit`] returns immediately;
//!   results arrive later through a [`ResultSink`]
//! - **Explicit callback lifetimes**: one-shot identifiers are consumed
//!   by their first reply, the persistent token-refresh identifier keeps
//!   receiving replies until replaced
//! - **Opaque engine**: the wrapped SDK sits behind the
//!   [`Engine`](confbridge_core::Engine) trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use confbridge::{Bridge, ChannelSink, Command, NullEngine};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (sink, mut replies) = ChannelSink::channel();
//!     let bridge = Bridge::new(Arc::new(NullEngine::new()), Arc::new(sink));
//!
//!     let participant = json!({
//!         "externalId": "alice",
//!         "name": "Alice",
//!         "avatarUrl": "https://example.com/alice.png"
//!     });
//!     bridge
//!         .submit(Command::with_args("connect", vec![participant], "cb-1"))
//!         .unwrap();
//!
//!     let reply = replies.next().await.unwrap();
//!     println!("connect resolved: {:?}", reply.status);
//!
//!     bridge.shutdown().await;
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use confbridge_core::{
    BridgeError, ConferenceInfo, ConferenceParams, CreateOptions, Engine, EngineError,
    EngineResult, JoinOptions, NullEngine, ParticipantInfo, TokenRefreshRequester, TokenRequest,
};

// Public API modules
pub mod bridge;
pub mod command;
pub mod config;
pub mod delivery;

// Re-export main API types
pub use bridge::Bridge;
pub use command::{Command, Method};
pub use config::{BridgeConfig, CredentialSource, Credentials};
pub use delivery::{
    CallbackLifetime, CallbackRef, CallbackRegistry, ChannelSink, MemorySink, Reply, ReplyStatus,
    ReplyStream, Responder, ResultSink,
};
