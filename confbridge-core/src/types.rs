//! Typed shapes crossing the bridge
//!
//! Inbound argument mappings keep the caller's camelCase field names;
//! payloads serialize back out the same way.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Participant identity used to open a session or address an invite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    /// Caller-assigned external id
    pub external_id: String,
    /// Display name
    pub name: String,
    /// Avatar URL
    pub avatar_url: String,
}

/// Conference tuning parameters forwarded to the engine untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceParams {
    /// Conference time-to-live in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    /// RTCP mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtcp_mode: Option<String>,
    /// Conference mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Preferred video codec
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
}

/// Options for creating a conference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateOptions {
    /// Conference alias
    pub alias: Option<String>,
    /// Tuning parameters
    pub params: Option<ConferenceParams>,
    /// Free-form metadata attached to the conference (live recording flag
    /// lands here)
    pub metadata: HashMap<String, Value>,
}

impl CreateOptions {
    /// Options carrying only an alias
    pub fn with_alias(alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..Self::default()
        }
    }
}

/// Options for joining a conference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOptions {
    /// Conference alias, when the caller supplied one
    pub conference_alias: Option<String>,
    /// Participant type (user, listener, ...)
    pub participant_type: Option<String>,
}

/// Conference metadata returned by create and join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceInfo {
    /// Engine-assigned conference id
    pub conference_id: String,
    /// Whether the conference was newly created
    pub is_new: bool,
    /// Alias the conference is known by, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ConferenceInfo {
    /// Serialize into the payload delivered back to the caller
    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
