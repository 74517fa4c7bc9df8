//! Core abstractions for the confbridge command bridge
//!
//! This crate holds everything the bridge and an engine implementation
//! share: the [`Engine`] trait describing the wrapped conferencing SDK,
//! the typed argument and payload shapes that cross the bridge, and the
//! bridge error taxonomy.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod null;
pub mod types;

pub use engine::{Engine, EngineError, EngineResult, TokenRefreshRequester, TokenRequest};
pub use error::BridgeError;
pub use null::NullEngine;
pub use types::{ConferenceInfo, ConferenceParams, CreateOptions, JoinOptions, ParticipantInfo};
