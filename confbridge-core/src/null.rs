//! No-op engine implementation
//!
//! Performs no signaling or media work; it just tracks the session and
//! property state the bridge reads back. Useful as a placeholder engine
//! in demos and embedding tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::engine::{Engine, EngineResult, TokenRefreshRequester};
use crate::types::{ConferenceInfo, CreateOptions, JoinOptions, ParticipantInfo};

/// Engine that succeeds at everything and does nothing
#[derive(Debug, Default)]
pub struct NullEngine {
    session_user: Mutex<Option<String>>,
    maximized: AtomicBool,
    telecom: AtomicBool,
    default_video: AtomicBool,
    default_speaker: AtomicBool,
}

impl NullEngine {
    /// Create a disconnected engine
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Engine for NullEngine {
    fn initialize(&self, _consumer_key: &str, _consumer_secret: &str) {}

    fn initialize_token(&self, _access_token: &str, _refresher: TokenRefreshRequester) {}

    async fn open_session(&self, participant: ParticipantInfo) -> EngineResult<()> {
        *self.session_user.lock() = Some(participant.external_id);
        Ok(())
    }

    async fn close_session(&self) -> EngineResult<()> {
        *self.session_user.lock() = None;
        Ok(())
    }

    fn session_user_id(&self) -> Option<String> {
        self.session_user.lock().clone()
    }

    fn session_open(&self) -> bool {
        self.session_user.lock().is_some()
    }

    async fn create_conference(&self, options: CreateOptions) -> EngineResult<ConferenceInfo> {
        let conference_id = options.alias.clone().unwrap_or_else(|| "conference".to_string());
        Ok(ConferenceInfo {
            conference_id,
            is_new: true,
            alias: options.alias,
        })
    }

    async fn join_conference(
        &self,
        conference_id: &str,
        _video: bool,
        options: JoinOptions,
    ) -> EngineResult<ConferenceInfo> {
        Ok(ConferenceInfo {
            conference_id: conference_id.to_string(),
            is_new: false,
            alias: options.conference_alias,
        })
    }

    async fn leave_conference(&self) -> EngineResult<()> {
        Ok(())
    }

    async fn invite(&self, _conference_id: &str, _external_ids: Vec<String>) -> EngineResult<()> {
        Ok(())
    }

    async fn broadcast(&self, _message: &str) -> EngineResult<()> {
        Ok(())
    }

    async fn start_video(&self, _participant_id: &str) -> EngineResult<()> {
        Ok(())
    }

    async fn stop_video(&self, _participant_id: &str) -> EngineResult<()> {
        Ok(())
    }

    async fn switch_camera(&self) {}

    async fn start_recording(&self) -> EngineResult<()> {
        Ok(())
    }

    async fn stop_recording(&self) -> EngineResult<()> {
        Ok(())
    }

    fn set_maximized(&self, enabled: bool) {
        self.maximized.store(enabled, Ordering::Relaxed);
    }

    fn set_telecom_mode(&self, enabled: bool) {
        self.telecom.store(enabled, Ordering::Relaxed);
    }

    fn telecom_mode(&self) -> bool {
        self.telecom.load(Ordering::Relaxed)
    }

    fn set_default_video(&self, enabled: bool) {
        self.default_video.store(enabled, Ordering::Relaxed);
    }

    fn default_video(&self) -> bool {
        self.default_video.load(Ordering::Relaxed)
    }

    fn set_default_builtin_speaker(&self, enabled: bool) {
        self.default_speaker.store(enabled, Ordering::Relaxed);
    }

    fn audio_3d(&self) -> bool {
        false
    }
}
