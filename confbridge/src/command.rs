//! Inbound command model
//!
//! A command is one request from the embedding layer: a method name, a
//! list of positional untyped arguments, and the opaque callback id its
//! result is delivered through. Method names are the plugin action names
//! the embedding layer has always used, so they stay camelCase strings on
//! the wire.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// One inbound bridge request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Method name as received from the embedding layer
    pub method: String,
    /// Ordered positional arguments
    pub args: Vec<Value>,
    /// Opaque callback identifier the result is delivered through
    pub callback_id: String,
}

impl Command {
    /// Create a command with no arguments
    pub fn new(method: impl Into<String>, callback_id: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            args: Vec::new(),
            callback_id: callback_id.into(),
        }
    }

    /// Create a command with positional arguments
    pub fn with_args(
        method: impl Into<String>,
        args: Vec<Value>,
        callback_id: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            args,
            callback_id: callback_id.into(),
        }
    }

    /// Positional argument, if present
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Positional string argument
    pub fn string_arg(&self, index: usize) -> Option<&str> {
        self.arg(index).and_then(Value::as_str)
    }

    /// Positional boolean argument.
    ///
    /// Numbers are accepted as truthiness, matching how the embedding
    /// layer passes flags.
    pub fn bool_arg(&self, index: usize) -> Option<bool> {
        match self.arg(index) {
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::Number(n)) => Some(n.as_f64().map(|v| v != 0.0).unwrap_or(false)),
            _ => None,
        }
    }

    /// Positional argument deserialized into a typed shape.
    ///
    /// Returns `None` when the argument is absent or of the wrong shape;
    /// the dispatcher drops such commands without delivering a result.
    pub fn parse_arg<T: DeserializeOwned>(&self, index: usize) -> Option<T> {
        self.arg(index)
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

/// Methods the bridge dispatches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Initialize the engine with a consumer key/secret pair
    Initialize,
    /// Initialize the engine with an access token and renewal hook
    InitializeToken,
    /// Open a session
    Connect,
    /// Close the session
    Disconnect,
    /// Create a conference
    Create,
    /// Join a conference
    Join,
    /// Leave the current conference
    Leave,
    /// Invite participants into a conference
    Invite,
    /// Broadcast a message to the conference
    SendBroadcastMessage,
    /// Show the conference UI maximized
    AppearMaximized,
    /// Route audio to the built-in speaker by default
    DefaultBuiltInSpeaker,
    /// Enable video by default when joining
    DefaultVideo,
    /// Enable telecom-style call handling
    SetTelecomMode,
    /// Query whether spatial audio is enabled
    IsAudio3dEnabled,
    /// Query whether telecom-style call handling is enabled
    IsTelecomMode,
    /// Query whether a session is open
    IsUserLoggedIn,
    /// Start sending video for the session user
    StartVideo,
    /// Stop sending video for the session user
    StopVideo,
    /// Switch between front and back camera
    SwitchCamera,
    /// Start recording the conference
    StartRecording,
    /// Stop recording the conference
    StopRecording,
    /// Register the persistent access-token refresh callback
    RefreshAccessTokenCallback,
    /// Resolve a pending token refresh with a fresh token
    OnAccessTokenOk,
    /// Resolve a pending token refresh with a failure
    OnAccessTokenKo,
    /// Deprecated compound create-join-invite
    StartConference,
    /// Deprecated leave
    StopConference,
    /// Deprecated session open
    OpenSession,
    /// Deprecated session close
    CloseSession,
    /// Compatibility alias for [`Method::Join`]
    Broadcast,
    /// Compatibility no-op
    ScreenAutoLock,
    /// Compatibility no-op
    CheckForAwaitingConference,
}

impl Method {
    /// Resolve a wire method name
    pub fn parse(name: &str) -> Option<Method> {
        match name {
            "initialize" => Some(Method::Initialize),
            "initializeToken" => Some(Method::InitializeToken),
            "connect" => Some(Method::Connect),
            "disconnect" => Some(Method::Disconnect),
            "create" => Some(Method::Create),
            "join" => Some(Method::Join),
            "leave" => Some(Method::Leave),
            "invite" => Some(Method::Invite),
            "sendBroadcastMessage" => Some(Method::SendBroadcastMessage),
            "appearMaximized" => Some(Method::AppearMaximized),
            "defaultBuiltInSpeaker" => Some(Method::DefaultBuiltInSpeaker),
            "defaultVideo" => Some(Method::DefaultVideo),
            "setTelecomMode" => Some(Method::SetTelecomMode),
            "isAudio3DEnabled" => Some(Method::IsAudio3dEnabled),
            "isTelecomMode" => Some(Method::IsTelecomMode),
            "isUserLoggedIn" => Some(Method::IsUserLoggedIn),
            "startVideo" => Some(Method::StartVideo),
            "stopVideo" => Some(Method::StopVideo),
            "switchCamera" => Some(Method::SwitchCamera),
            "startRecording" => Some(Method::StartRecording),
            "stopRecording" => Some(Method::StopRecording),
            "refreshAccessTokenCallback" => Some(Method::RefreshAccessTokenCallback),
            "onAccessTokenOk" => Some(Method::OnAccessTokenOk),
            "onAccessTokenKo" => Some(Method::OnAccessTokenKo),
            "startConference" => Some(Method::StartConference),
            "stopConference" => Some(Method::StopConference),
            "openSession" => Some(Method::OpenSession),
            "closeSession" => Some(Method::CloseSession),
            "broadcast" => Some(Method::Broadcast),
            "screenAutoLock" => Some(Method::ScreenAutoLock),
            "checkForAwaitingConference" => Some(Method::CheckForAwaitingConference),
            _ => None,
        }
    }

    /// Wire name of this method
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Initialize => "initialize",
            Method::InitializeToken => "initializeToken",
            Method::Connect => "connect",
            Method::Disconnect => "disconnect",
            Method::Create => "create",
            Method::Join => "join",
            Method::Leave => "leave",
            Method::Invite => "invite",
            Method::SendBroadcastMessage => "sendBroadcastMessage",
            Method::AppearMaximized => "appearMaximized",
            Method::DefaultBuiltInSpeaker => "defaultBuiltInSpeaker",
            Method::DefaultVideo => "defaultVideo",
            Method::SetTelecomMode => "setTelecomMode",
            Method::IsAudio3dEnabled => "isAudio3DEnabled",
            Method::IsTelecomMode => "isTelecomMode",
            Method::IsUserLoggedIn => "isUserLoggedIn",
            Method::StartVideo => "startVideo",
            Method::StopVideo => "stopVideo",
            Method::SwitchCamera => "switchCamera",
            Method::StartRecording => "startRecording",
            Method::StopRecording => "stopRecording",
            Method::RefreshAccessTokenCallback => "refreshAccessTokenCallback",
            Method::OnAccessTokenOk => "onAccessTokenOk",
            Method::OnAccessTokenKo => "onAccessTokenKo",
            Method::StartConference => "startConference",
            Method::StopConference => "stopConference",
            Method::OpenSession => "openSession",
            Method::CloseSession => "closeSession",
            Method::Broadcast => "broadcast",
            Method::ScreenAutoLock => "screenAutoLock",
            Method::CheckForAwaitingConference => "checkForAwaitingConference",
        }
    }

    /// Whether this method is kept only for callers of the old API
    pub fn is_deprecated(&self) -> bool {
        matches!(
            self,
            Method::StartConference
                | Method::StopConference
                | Method::OpenSession
                | Method::CloseSession
        )
    }
}

/// Wire shape of the `create` options argument
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CreateArgs {
    pub alias: Option<String>,
    pub params: Option<CreateParamsArgs>,
}

/// Wire shape of `create` tuning parameters; `liveRecording` rides along
/// here and is split off into conference metadata
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CreateParamsArgs {
    pub ttl: Option<u64>,
    pub rtcp_mode: Option<String>,
    pub mode: Option<String>,
    pub video_codec: Option<String>,
    pub live_recording: Option<bool>,
}

/// Wire shape of the `join` options argument
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct JoinArgs {
    pub alias: Option<String>,
    pub user: Option<JoinUserArgs>,
}

/// Wire shape of the `join` user descriptor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct JoinUserArgs {
    #[serde(rename = "type")]
    pub user_type: Option<String>,
}
