//! Conferencing engine abstraction
//!
//! The engine performs the real signaling and media work; the bridge only
//! marshals commands into it and completions out of it. Everything the
//! bridge needs from the engine is expressed here as an object-safe trait
//! so the wrapped SDK stays an opaque collaborator.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::types::{ConferenceInfo, CreateOptions, JoinOptions, ParticipantInfo};

/// Error reported by the engine, surfaced verbatim to callers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{description}")]
pub struct EngineError {
    /// Engine-specific error code
    pub code: i32,
    /// Human-readable description
    pub description: String,
}

impl EngineError {
    /// Engine code meaning "already left / no active conference".
    ///
    /// Surfaced by the engine when leaving a conference that is not
    /// running; normalized to success by the bridge so callers never see
    /// it as an error.
    pub const NO_ACTIVE_CONFERENCE: i32 = -10002;

    /// Create a new engine error
    pub fn new(code: i32, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    /// Whether this is the "already left / no active conference" sentinel
    pub fn is_no_active_conference(&self) -> bool {
        self.code == Self::NO_ACTIVE_CONFERENCE
    }
}

/// Result alias for engine completions
pub type EngineResult<T> = Result<T, EngineError>;

/// One pending request from the engine for a fresh access token.
///
/// Resolving consumes the request; dropping it unanswered closes the
/// engine-side receiver, which the engine treats the same as a failed
/// renewal.
#[derive(Debug)]
pub struct TokenRequest {
    responder: oneshot::Sender<Option<String>>,
}

impl TokenRequest {
    /// Answer the engine with a fresh token, or `None` if renewal failed
    pub fn resolve(self, token: Option<String>) {
        if self.responder.send(token).is_err() {
            tracing::debug!("Engine abandoned token request before it was resolved");
        }
    }
}

/// Handle the engine uses to ask for fresh access tokens.
///
/// Handed to the engine by [`Engine::initialize_token`]. Each call to
/// [`request`](TokenRefreshRequester::request) submits a [`TokenRequest`]
/// to the bridge and returns the receiving half the engine awaits.
#[derive(Debug, Clone)]
pub struct TokenRefreshRequester {
    tx: mpsc::UnboundedSender<TokenRequest>,
}

impl TokenRefreshRequester {
    /// Create a requester together with the receiver the bridge drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TokenRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Ask for a fresh token.
    ///
    /// The returned receiver resolves with `Some(token)` once the caller
    /// renews it, with `None` when renewal fails, or with an error when the
    /// request is superseded or the bridge shut down.
    pub fn request(&self) -> oneshot::Receiver<Option<String>> {
        let (responder, rx) = oneshot::channel();
        if self.tx.send(TokenRequest { responder }).is_err() {
            tracing::warn!("Token refresh requested after bridge shutdown");
        }
        rx
    }
}

/// The conferencing engine the bridge drives.
///
/// Fallible operations complete with `Result<_, EngineError>`; property
/// accessors are synchronous reads and writes of engine state. All methods
/// are invoked from the bridge's single worker task, so implementations
/// never see concurrent calls from the bridge.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Initialize with a consumer key/secret pair
    fn initialize(&self, consumer_key: &str, consumer_secret: &str);

    /// Initialize with an access token plus a renewal hook the engine
    /// invokes whenever the token expires
    fn initialize_token(&self, access_token: &str, refresher: TokenRefreshRequester);

    /// Open a session for the given participant
    async fn open_session(&self, participant: ParticipantInfo) -> EngineResult<()>;

    /// Close the current session
    async fn close_session(&self) -> EngineResult<()>;

    /// Id of the participant the session is open for, if any
    fn session_user_id(&self) -> Option<String>;

    /// Whether a session is currently connected
    fn session_open(&self) -> bool;

    /// Create a conference
    async fn create_conference(&self, options: CreateOptions) -> EngineResult<ConferenceInfo>;

    /// Join a conference by id
    async fn join_conference(
        &self,
        conference_id: &str,
        video: bool,
        options: JoinOptions,
    ) -> EngineResult<ConferenceInfo>;

    /// Leave the current conference
    async fn leave_conference(&self) -> EngineResult<()>;

    /// Invite participants, by external id, into a conference
    async fn invite(&self, conference_id: &str, external_ids: Vec<String>) -> EngineResult<()>;

    /// Broadcast a message to the current conference
    async fn broadcast(&self, message: &str) -> EngineResult<()>;

    /// Start sending video for the given participant
    async fn start_video(&self, participant_id: &str) -> EngineResult<()>;

    /// Stop sending video for the given participant
    async fn stop_video(&self, participant_id: &str) -> EngineResult<()>;

    /// Switch between front and back camera
    async fn switch_camera(&self);

    /// Start recording the current conference
    async fn start_recording(&self) -> EngineResult<()>;

    /// Stop recording the current conference
    async fn stop_recording(&self) -> EngineResult<()>;

    /// Show the conference UI maximized
    fn set_maximized(&self, enabled: bool);

    /// Enable telecom-style call handling
    fn set_telecom_mode(&self, enabled: bool);

    /// Whether telecom-style call handling is enabled
    fn telecom_mode(&self) -> bool;

    /// Enable video by default when joining
    fn set_default_video(&self, enabled: bool);

    /// Whether video is enabled by default when joining
    fn default_video(&self) -> bool;

    /// Route audio to the built-in speaker by default
    fn set_default_builtin_speaker(&self, enabled: bool);

    /// Whether spatial audio is enabled
    fn audio_3d(&self) -> bool;
}
