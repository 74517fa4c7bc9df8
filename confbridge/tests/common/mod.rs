#![allow(dead_code)]

//! Shared test support
//!
//! `MockEngine` answers every operation from a per-operation scripted
//! result and records the calls it sees, so tests can assert both the
//! replies the bridge delivers and the exact engine traffic behind them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use confbridge::{
    Bridge, ChannelSink, ConferenceInfo, CreateOptions, Engine, EngineResult, JoinOptions,
    ParticipantInfo, ReplyStream, TokenRefreshRequester,
};

/// Engine returning scripted results and recording every call
pub struct MockEngine {
    calls: Mutex<Vec<String>>,
    refresher: Mutex<Option<TokenRefreshRequester>>,
    session_user: Mutex<Option<String>>,
    open_session: Mutex<EngineResult<()>>,
    close_session: Mutex<EngineResult<()>>,
    create: Mutex<EngineResult<ConferenceInfo>>,
    join: Mutex<EngineResult<ConferenceInfo>>,
    leave: Mutex<EngineResult<()>>,
    invite: Mutex<EngineResult<()>>,
    broadcast: Mutex<EngineResult<()>>,
    start_video: Mutex<EngineResult<()>>,
    stop_video: Mutex<EngineResult<()>>,
    start_recording: Mutex<EngineResult<()>>,
    stop_recording: Mutex<EngineResult<()>>,
    maximized: AtomicBool,
    telecom: AtomicBool,
    default_video: AtomicBool,
    default_speaker: AtomicBool,
    audio_3d: AtomicBool,
}

impl Default for MockEngine {
    fn default() -> Self {
        let conference = ConferenceInfo {
            conference_id: "conf-1".to_string(),
            is_new: false,
            alias: None,
        };
        Self {
            calls: Mutex::new(Vec::new()),
            refresher: Mutex::new(None),
            session_user: Mutex::new(None),
            open_session: Mutex::new(Ok(())),
            close_session: Mutex::new(Ok(())),
            create: Mutex::new(Ok(conference.clone())),
            join: Mutex::new(Ok(conference)),
            leave: Mutex::new(Ok(())),
            invite: Mutex::new(Ok(())),
            broadcast: Mutex::new(Ok(())),
            start_video: Mutex::new(Ok(())),
            stop_video: Mutex::new(Ok(())),
            start_recording: Mutex::new(Ok(())),
            stop_recording: Mutex::new(Ok(())),
            maximized: AtomicBool::new(false),
            telecom: AtomicBool::new(false),
            default_video: AtomicBool::new(false),
            default_speaker: AtomicBool::new(false),
            audio_3d: AtomicBool::new(false),
        }
    }
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    pub fn set_session_user(&self, user_id: Option<&str>) {
        *self.session_user.lock() = user_id.map(str::to_string);
    }

    pub fn set_default_video(&self, enabled: bool) {
        self.default_video.store(enabled, Ordering::Relaxed);
    }

    pub fn set_telecom(&self, enabled: bool) {
        self.telecom.store(enabled, Ordering::Relaxed);
    }

    pub fn set_audio_3d(&self, enabled: bool) {
        self.audio_3d.store(enabled, Ordering::Relaxed);
    }

    pub fn maximized(&self) -> bool {
        self.maximized.load(Ordering::Relaxed)
    }

    pub fn telecom_enabled(&self) -> bool {
        self.telecom.load(Ordering::Relaxed)
    }

    pub fn default_speaker(&self) -> bool {
        self.default_speaker.load(Ordering::Relaxed)
    }

    pub fn set_open_session_result(&self, result: EngineResult<()>) {
        *self.open_session.lock() = result;
    }

    pub fn set_create_result(&self, result: EngineResult<ConferenceInfo>) {
        *self.create.lock() = result;
    }

    pub fn set_join_result(&self, result: EngineResult<ConferenceInfo>) {
        *self.join.lock() = result;
    }

    pub fn set_leave_result(&self, result: EngineResult<()>) {
        *self.leave.lock() = result;
    }

    pub fn set_invite_result(&self, result: EngineResult<()>) {
        *self.invite.lock() = result;
    }

    pub fn set_broadcast_result(&self, result: EngineResult<()>) {
        *self.broadcast.lock() = result;
    }

    pub fn set_start_video_result(&self, result: EngineResult<()>) {
        *self.start_video.lock() = result;
    }

    pub fn set_stop_recording_result(&self, result: EngineResult<()>) {
        *self.stop_recording.lock() = result;
    }

    /// Refresh requester captured by `initialize_token`, if any
    pub fn refresher(&self) -> Option<TokenRefreshRequester> {
        self.refresher.lock().clone()
    }
}

#[async_trait]
impl Engine for MockEngine {
    fn initialize(&self, consumer_key: &str, _consumer_secret: &str) {
        self.record(format!("initialize({consumer_key})"));
    }

    fn initialize_token(&self, access_token: &str, refresher: TokenRefreshRequester) {
        self.record(format!("initialize_token({access_token})"));
        *self.refresher.lock() = Some(refresher);
    }

    async fn open_session(&self, participant: ParticipantInfo) -> EngineResult<()> {
        self.record(format!("open_session({})", participant.external_id));
        self.open_session.lock().clone()
    }

    async fn close_session(&self) -> EngineResult<()> {
        self.record("close_session".to_string());
        self.close_session.lock().clone()
    }

    fn session_user_id(&self) -> Option<String> {
        self.session_user.lock().clone()
    }

    fn session_open(&self) -> bool {
        self.session_user.lock().is_some()
    }

    async fn create_conference(&self, options: CreateOptions) -> EngineResult<ConferenceInfo> {
        let live_recording = options.metadata.contains_key("liveRecording");
        self.record(format!(
            "create(alias={:?}, live_recording={live_recording})",
            options.alias
        ));
        self.create.lock().clone()
    }

    async fn join_conference(
        &self,
        conference_id: &str,
        video: bool,
        options: JoinOptions,
    ) -> EngineResult<ConferenceInfo> {
        self.record(format!(
            "join({conference_id}, video={video}, alias={:?}, type={:?})",
            options.conference_alias, options.participant_type
        ));
        self.join.lock().clone()
    }

    async fn leave_conference(&self) -> EngineResult<()> {
        self.record("leave".to_string());
        self.leave.lock().clone()
    }

    async fn invite(&self, conference_id: &str, external_ids: Vec<String>) -> EngineResult<()> {
        self.record(format!("invite({conference_id}, {external_ids:?})"));
        self.invite.lock().clone()
    }

    async fn broadcast(&self, message: &str) -> EngineResult<()> {
        self.record(format!("broadcast({message})"));
        self.broadcast.lock().clone()
    }

    async fn start_video(&self, participant_id: &str) -> EngineResult<()> {
        self.record(format!("start_video({participant_id})"));
        self.start_video.lock().clone()
    }

    async fn stop_video(&self, participant_id: &str) -> EngineResult<()> {
        self.record(format!("stop_video({participant_id})"));
        self.stop_video.lock().clone()
    }

    async fn switch_camera(&self) {
        self.record("switch_camera".to_string());
    }

    async fn start_recording(&self) -> EngineResult<()> {
        self.record("start_recording".to_string());
        self.start_recording.lock().clone()
    }

    async fn stop_recording(&self) -> EngineResult<()> {
        self.record("stop_recording".to_string());
        self.stop_recording.lock().clone()
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
        self.audio_3d.load(Ordering::Relaxed)
    }
}

/// Bridge over a fresh mock engine plus the stream its replies land on
pub fn bridge_with_mock() -> (Bridge, Arc<MockEngine>, ReplyStream) {
    let engine = MockEngine::new();
    let (sink, replies) = ChannelSink::channel();
    let bridge = Bridge::new(engine.clone(), Arc::new(sink));
    (bridge, engine, replies)
}
