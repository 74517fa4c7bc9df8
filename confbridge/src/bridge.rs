//! The command bridge
//!
//! [`Bridge`] accepts commands from the embedding layer and runs them
//! against the engine on a single worker task. Submission never blocks;
//! results come back later through the configured [`ResultSink`]. The
//! worker awaits each engine call to completion before picking up the
//! next command, so the engine never sees concurrent calls from the
//! bridge, and all mutable bridge state (credentials, the pending token
//! responder, the refresh callback) lives on the worker.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use confbridge_core::{
    BridgeError, CreateOptions, Engine, EngineResult, JoinOptions, ParticipantInfo,
    TokenRefreshRequester, TokenRequest,
};

use crate::command::{Command, CreateArgs, JoinArgs, Method};
use crate::config::{BridgeConfig, Credentials};
use crate::delivery::{CallbackRef, Responder, ResultSink};

/// Handle to a running command bridge.
///
/// Dropping the handle (or calling [`shutdown`](Bridge::shutdown)) closes
/// the command channel; the worker drains what was already submitted and
/// stops.
#[derive(Debug)]
pub struct Bridge {
    commands: mpsc::UnboundedSender<Command>,
    worker: JoinHandle<()>,
    instance_id: Uuid,
}

impl Bridge {
    /// Start a bridge with default configuration.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(engine: Arc<dyn Engine>, sink: Arc<dyn ResultSink>) -> Self {
        Self::with_config(engine, sink, BridgeConfig::default())
    }

    /// Start a bridge, initializing the engine when the configuration
    /// resolved startup credentials
    pub fn with_config(
        engine: Arc<dyn Engine>,
        sink: Arc<dyn ResultSink>,
        config: BridgeConfig,
    ) -> Self {
        let instance_id = Uuid::new_v4();
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (refresher, token_requests) = TokenRefreshRequester::channel();

        let worker = Worker {
            engine,
            responder: Responder::new(sink),
            credentials: config.credentials,
            refresher,
            token_requests,
            pending_token: None,
            refresh_callback: None,
        };
        let handle = tokio::spawn(worker.run(command_rx));

        info!(%instance_id, "Bridge started");
        Self {
            commands,
            worker: handle,
            instance_id,
        }
    }

    /// Instance id used in logs
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Submit a command for dispatch.
    ///
    /// Returns immediately; the result is delivered later through the
    /// sink. Fails only when the worker is no longer running.
    pub fn submit(&self, command: Command) -> Result<(), BridgeError> {
        self.commands.send(command).map_err(|_| BridgeError::Closed {
            reason: "worker stopped".to_string(),
        })
    }

    /// Close the command channel and wait for the worker to drain
    pub async fn shutdown(self) {
        let instance_id = self.instance_id;
        drop(self.commands);
        if let Err(err) = self.worker.await {
            warn!(%instance_id, error = %err, "Bridge worker ended abnormally");
        }
        info!(%instance_id, "Bridge stopped");
    }
}

/// Worker state; touched only from the worker task
struct Worker {
    engine: Arc<dyn Engine>,
    responder: Responder,
    credentials: Option<Credentials>,
    refresher: TokenRefreshRequester,
    token_requests: mpsc::UnboundedReceiver<TokenRequest>,
    pending_token: Option<TokenRequest>,
    refresh_callback: Option<CallbackRef>,
}

impl Worker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        if let Some(credentials) = self.credentials.clone() {
            info!("Initializing engine with startup credentials");
            self.engine
                .initialize(&credentials.consumer_key, &credentials.consumer_secret);
        }

        loop {
            tokio::select! {
                // Token requests are serviced ahead of queued commands so
                // a resolution command can never overtake the request it
                // answers. The worker holds a requester clone, so this
                // channel stays open for as long as the worker runs.
                biased;

                request = self.token_requests.recv() => {
                    if let Some(request) = request {
                        self.token_requested(request);
                    }
                }
                command = commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
            }
        }

        debug!("Bridge worker stopped");
    }

    async fn handle(&mut self, command: Command) {
        let Some(method) = Method::parse(&command.method) else {
            let err = BridgeError::UnknownMethod {
                name: command.method.clone(),
            };
            warn!(error = %err, "Dropping command");
            return;
        };

        let callback = if method == Method::RefreshAccessTokenCallback {
            CallbackRef::Persistent(command.callback_id.clone())
        } else {
            CallbackRef::OneShot(command.callback_id.clone())
        };
        self.responder.register(&callback);
        debug!(method = method.as_str(), callback_id = callback.id(), "Dispatching command");

        match method {
            Method::Initialize => self.initialize(&command, &callback),
            Method::InitializeToken => self.initialize_token(&command, &callback),
            Method::Connect | Method::OpenSession => self.open_session(&command, &callback).await,
            Method::Disconnect | Method::CloseSession => {
                let result = self.engine.close_session().await;
                self.complete(&callback, result);
            }
            Method::Create => self.create(&command, &callback).await,
            Method::Join | Method::Broadcast => self.join(&command, &callback).await,
            Method::Leave => self.leave(&callback).await,
            Method::Invite => self.invite(&command, &callback).await,
            Method::SendBroadcastMessage => self.broadcast_message(&command, &callback).await,
            Method::AppearMaximized => {
                self.engine.set_maximized(command.bool_arg(0).unwrap_or(false));
                self.responder.ok(&callback);
            }
            Method::DefaultBuiltInSpeaker => {
                self.engine
                    .set_default_builtin_speaker(command.bool_arg(0).unwrap_or(false));
                self.responder.ok(&callback);
            }
            Method::DefaultVideo => {
                self.engine.set_default_video(command.bool_arg(0).unwrap_or(false));
                self.responder.ok(&callback);
            }
            Method::SetTelecomMode => {
                self.engine.set_telecom_mode(command.bool_arg(0).unwrap_or(false));
                self.responder.ok(&callback);
            }
            Method::IsAudio3dEnabled => {
                let enabled = self.engine.audio_3d();
                self.responder.ok_with(&callback, Value::Bool(enabled));
            }
            Method::IsTelecomMode => {
                let enabled = self.engine.telecom_mode();
                self.responder.ok_with(&callback, Value::Bool(enabled));
            }
            Method::IsUserLoggedIn => {
                let logged_in = self.engine.session_open();
                self.responder.ok_with(&callback, Value::Bool(logged_in));
            }
            Method::StartVideo => self.start_video(&command, &callback).await,
            Method::StopVideo => self.stop_video(&command, &callback).await,
            Method::SwitchCamera => {
                self.engine.switch_camera().await;
                self.responder.ok(&callback);
            }
            Method::StartRecording => {
                let result = self.engine.start_recording().await;
                self.complete(&callback, result);
            }
            Method::StopRecording => {
                let result = self.engine.stop_recording().await;
                self.complete(&callback, result);
            }
            Method::RefreshAccessTokenCallback => self.register_refresh(callback),
            Method::OnAccessTokenOk => self.access_token_ok(&command, &callback),
            Method::OnAccessTokenKo => self.access_token_ko(&command, &callback),
            Method::StartConference => self.start_conference(&command, &callback).await,
            Method::StopConference => {
                let result = self.engine.leave_conference().await;
                self.complete(&callback, result);
            }
            Method::ScreenAutoLock | Method::CheckForAwaitingConference => {
                self.responder.ok(&callback);
            }
        }
    }

    /// Map an engine completion to the uniform ok/error delivery
    fn complete(&self, callback: &CallbackRef, result: EngineResult<()>) {
        match result {
            Ok(()) => self.responder.ok(callback),
            Err(err) => self.responder.error(callback, err.to_string()),
        }
    }

    /// Drop a command without delivering a result.
    ///
    /// Malformed input is intentionally wire-silent; the warning is the
    /// only trace it leaves.
    fn drop_command(&self, command: &Command, callback: &CallbackRef, reason: &str) {
        let err = BridgeError::MalformedCommand {
            method: command.method.clone(),
            reason: reason.to_string(),
        };
        warn!(callback_id = callback.id(), error = %err, "Dropping command");
        self.responder.discard(callback);
    }

    fn initialize(&mut self, command: &Command, callback: &CallbackRef) {
        if let (Some(key), Some(secret)) = (command.string_arg(0), command.string_arg(1)) {
            self.credentials = Some(Credentials {
                consumer_key: key.to_string(),
                consumer_secret: secret.to_string(),
            });
            self.engine.initialize(key, secret);
        }
        // Replies ok even without arguments; the engine keeps whatever
        // credentials it already had.
        self.responder.ok(callback);
    }

    fn initialize_token(&mut self, command: &Command, callback: &CallbackRef) {
        if let Some(token) = command.string_arg(0) {
            self.engine.initialize_token(token, self.refresher.clone());
        }
        self.responder.ok(callback);
    }

    async fn open_session(&mut self, command: &Command, callback: &CallbackRef) {
        let Some(participant) = command.parse_arg::<ParticipantInfo>(0) else {
            self.drop_command(command, callback, "missing or malformed participant");
            return;
        };
        let result = self.engine.open_session(participant).await;
        self.complete(callback, result);
    }

    async fn create(&mut self, command: &Command, callback: &CallbackRef) {
        // No required arguments: absent options create an unnamed
        // conference with engine defaults.
        let args = command.parse_arg::<CreateArgs>(0).unwrap_or_default();

        let mut options = CreateOptions {
            alias: args.alias,
            ..CreateOptions::default()
        };
        if let Some(params) = args.params {
            if let Some(live_recording) = params.live_recording {
                options
                    .metadata
                    .insert("liveRecording".to_string(), Value::Bool(live_recording));
            }
            options.params = Some(confbridge_core::ConferenceParams {
                ttl: params.ttl,
                rtcp_mode: params.rtcp_mode,
                mode: params.mode,
                video_codec: params.video_codec,
            });
        }

        match self.engine.create_conference(options).await {
            Ok(info) => self.responder.ok_with(callback, info.to_payload()),
            Err(err) => self.responder.error(callback, err.to_string()),
        }
    }

    async fn join(&mut self, command: &Command, callback: &CallbackRef) {
        let Some(conference_id) = command.string_arg(0).map(str::to_string) else {
            self.drop_command(command, callback, "missing conference id");
            return;
        };
        let Some(args) = command.parse_arg::<JoinArgs>(1) else {
            self.drop_command(command, callback, "missing or malformed join options");
            return;
        };

        // Alias and participant type only travel together.
        let mut options = JoinOptions::default();
        if let (Some(alias), Some(user_type)) =
            (args.alias, args.user.and_then(|user| user.user_type))
        {
            options.conference_alias = Some(alias);
            options.participant_type = Some(user_type);
        }

        let video = self.engine.default_video();
        match self.engine.join_conference(&conference_id, video, options).await {
            Ok(info) => self.responder.ok_with(callback, info.to_payload()),
            Err(err) => self.responder.error(callback, err.to_string()),
        }
    }

    async fn leave(&mut self, callback: &CallbackRef) {
        match self.engine.leave_conference().await {
            Ok(()) => self.responder.ok(callback),
            Err(err) if err.is_no_active_conference() => {
                debug!("Leave with no active conference, normalized to success");
                self.responder.ok(callback);
            }
            Err(err) => self.responder.error(callback, err.to_string()),
        }
    }

    async fn invite(&mut self, command: &Command, callback: &CallbackRef) {
        let Some(conference_id) = command.string_arg(0).map(str::to_string) else {
            self.drop_command(command, callback, "missing conference id");
            return;
        };
        let Some(Value::Array(participants)) = command.arg(1) else {
            self.drop_command(command, callback, "missing participant list");
            return;
        };
        let external_ids = external_ids(participants);

        let result = self.engine.invite(&conference_id, external_ids).await;
        self.complete(callback, result);
    }

    async fn broadcast_message(&mut self, command: &Command, callback: &CallbackRef) {
        let Some(message) = command.string_arg(0).map(str::to_string) else {
            self.drop_command(command, callback, "missing message");
            return;
        };
        let result = self.engine.broadcast(&message).await;
        self.complete(callback, result);
    }

    async fn start_video(&mut self, command: &Command, callback: &CallbackRef) {
        let Some(user_id) = self.engine.session_user_id() else {
            self.drop_command(command, callback, "no session user");
            return;
        };
        let result = self.engine.start_video(&user_id).await;
        self.complete(callback, result);
    }

    async fn stop_video(&mut self, command: &Command, callback: &CallbackRef) {
        let Some(user_id) = self.engine.session_user_id() else {
            self.drop_command(command, callback, "no session user");
            return;
        };
        let result = self.engine.stop_video(&user_id).await;
        self.complete(callback, result);
    }

    fn register_refresh(&mut self, callback: CallbackRef) {
        // No immediate reply: the identifier is resolved every time the
        // engine asks for a fresh token.
        if let Some(previous) = self.refresh_callback.replace(callback) {
            debug!(callback_id = previous.id(), "Replacing refresh callback");
            self.responder.discard(&previous);
        }
    }

    fn token_requested(&mut self, request: TokenRequest) {
        if self.pending_token.replace(request).is_some() {
            debug!("Superseding unanswered token request");
        }
        match &self.refresh_callback {
            Some(callback) => self.responder.ok(callback),
            None => warn!("Engine requested a token but no refresh callback is registered"),
        }
    }

    fn access_token_ok(&mut self, command: &Command, callback: &CallbackRef) {
        let Some(token) = command.string_arg(0) else {
            self.drop_command(command, callback, "missing access token");
            return;
        };
        let Some(pending) = self.pending_token.take() else {
            self.drop_command(command, callback, "no pending token request");
            return;
        };
        pending.resolve(Some(token.to_string()));
        self.responder.ok(callback);
    }

    fn access_token_ko(&mut self, command: &Command, callback: &CallbackRef) {
        let Some(pending) = self.pending_token.take() else {
            self.drop_command(command, callback, "no pending token request");
            return;
        };
        pending.resolve(None);
        self.responder.ok(callback);
    }

    async fn start_conference(&mut self, command: &Command, callback: &CallbackRef) {
        let Some(alias) = command.string_arg(0).map(str::to_string) else {
            self.drop_command(command, callback, "missing conference alias");
            return;
        };
        let Some(Value::Array(participants)) = command.arg(1) else {
            self.drop_command(command, callback, "missing participant list");
            return;
        };
        let invitees = external_ids(participants);

        let info = match self.engine.create_conference(CreateOptions::with_alias(alias)).await {
            Ok(info) => info,
            Err(err) => {
                self.responder.error(callback, err.to_string());
                return;
            }
        };

        let video = self.engine.default_video();
        let join_result = self
            .engine
            .join_conference(&info.conference_id, video, JoinOptions::default())
            .await;
        self.complete(callback, join_result.map(|_| ()));

        // Invites only go out for a conference this call created, and
        // their failure is not the command's failure.
        if info.is_new {
            if let Err(err) = self.engine.invite(&info.conference_id, invitees).await {
                warn!(conference_id = %info.conference_id, error = %err, "Auto-invite failed");
            }
        }
    }
}

/// External ids from a participant list, skipping malformed entries
fn external_ids(participants: &[Value]) -> Vec<String> {
    participants
        .iter()
        .filter_map(|participant| {
            participant
                .get("externalId")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect()
}
