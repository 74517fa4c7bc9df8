//! Access-token refresh example
//!
//! Shows the one persistent callback in the protocol: the engine asks
//! for a fresh token, the bridge pings the registered refresh callback,
//! and the embedding layer answers with `onAccessTokenOk`.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use confbridge::{
    Bridge, ChannelSink, Command, ConferenceInfo, CreateOptions, Engine, EngineResult,
    JoinOptions, NullEngine, ParticipantInfo, TokenRefreshRequester,
};

/// Engine adapter that keeps the refresh requester, the way a real SDK
/// binding would hold onto its renewal hook
#[derive(Default)]
struct TokenDemoEngine {
    inner: NullEngine,
    refresher: Mutex<Option<TokenRefreshRequester>>,
}

impl TokenDemoEngine {
    fn refresher(&self) -> Option<TokenRefreshRequester> {
        self.refresher.lock().clone()
    }
}

#[async_trait]
impl Engine for TokenDemoEngine {
    fn initialize(&self, consumer_key: &str, consumer_secret: &str) {
        self.inner.initialize(consumer_key, consumer_secret);
    }

    fn initialize_token(&self, access_token: &str, refresher: TokenRefreshRequester) {
        println!("🔑 Engine initialized with token {access_token}");
        *self.refresher.lock() = Some(refresher);
    }

    async fn open_session(&self, participant: ParticipantInfo) -> EngineResult<()> {
        self.inner.open_session(participant).await
    }

    async fn close_session(&self) -> EngineResult<()> {
        self.inner.close_session().await
    }

    fn session_user_id(&self) -> Option<String> {
        self.inner.session_user_id()
    }

    fn session_open(&self) -> bool {
        self.inner.session_open()
    }

    async fn create_conference(&self, options: CreateOptions) -> EngineResult<ConferenceInfo> {
        self.inner.create_conference(options).await
    }

    async fn join_conference(
        &self,
        conference_id: &str,
        video: bool,
        options: JoinOptions,
    ) -> EngineResult<ConferenceInfo> {
        self.inner.join_conference(conference_id, video, options).await
    }

    async fn leave_conference(&self) -> EngineResult<()> {
        self.inner.leave_conference().await
    }

    async fn invite(&self, conference_id: &str, external_ids: Vec<String>) -> EngineResult<()> {
        self.inner.invite(conference_id, external_ids).await
    }

    async fn broadcast(&self, message: &str) -> EngineResult<()> {
        self.inner.broadcast(message).await
    }

    async fn start_video(&self, participant_id: &str) -> EngineResult<()> {
        self.inner.start_video(participant_id).await
    }

    async fn stop_video(&self, participant_id: &str) -> EngineResult<()> {
        self.inner.stop_video(participant_id).await
    }

    async fn switch_camera(&self) {
        self.inner.switch_camera().await;
    }

    async fn start_recording(&self) -> EngineResult<()> {
        self.inner.start_recording().await
    }

    async fn stop_recording(&self) -> EngineResult<()> {
        self.inner.stop_recording().await
    }

    fn set_maximized(&self, enabled: bool) {
        self.inner.set_maximized(enabled);
    }

    fn set_telecom_mode(&self, enabled: bool) {
        self.inner.set_telecom_mode(enabled);
    }

    fn telecom_mode(&self) -> bool {
        self.inner.telecom_mode()
    }

    fn set_default_video(&self, enabled: bool) {
        self.inner.set_default_video(enabled);
    }

    fn default_video(&self) -> bool {
        self.inner.default_video()
    }

    fn set_default_builtin_speaker(&self, enabled: bool) {
        self.inner.set_default_builtin_speaker(enabled);
    }

    fn audio_3d(&self) -> bool {
        self.inner.audio_3d()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let engine = Arc::new(TokenDemoEngine::default());
    let (sink, mut replies) = ChannelSink::channel();
    let bridge = Bridge::new(engine.clone(), Arc::new(sink));

    // Register the persistent refresh callback, then initialize.
    bridge.submit(Command::new("refreshAccessTokenCallback", "refresh-cb"))?;
    bridge.submit(Command::with_args("initializeToken", vec![json!("tok-1")], "init-1"))?;
    let reply = replies.next().await.unwrap();
    println!("📨 {} -> {:?}", reply.callback_id, reply.status);

    // The engine decides it needs a fresh token.
    let refresher = engine.refresher().expect("refresher captured");
    let pending = refresher.request();

    // The bridge pings the refresh callback; the embedding layer answers.
    let ping = replies.next().await.unwrap();
    println!("🔔 Refresh requested via {} (keep={})", ping.callback_id, ping.keep_callback);
    bridge.submit(Command::with_args("onAccessTokenOk", vec![json!("tok-2")], "renew-1"))?;
    let reply = replies.next().await.unwrap();
    println!("📨 {} -> {:?}", reply.callback_id, reply.status);

    let token = pending.await?;
    println!("✅ Engine received {token:?}");

    bridge.shutdown().await;
    Ok(())
}
