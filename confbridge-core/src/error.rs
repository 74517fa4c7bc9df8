//! Error types for the command bridge

use thiserror::Error;

use crate::engine::EngineError;

/// Main error type for bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Bridge worker is no longer running
    #[error("Bridge closed: {reason}")]
    Closed {
        /// Reason the bridge is closed
        reason: String,
    },

    /// Initialization error
    #[error("Initialization failed: {reason}")]
    Initialization {
        /// Reason for initialization failure
        reason: String,
    },

    /// Inbound command named an unknown method
    #[error("Unknown method: {name}")]
    UnknownMethod {
        /// Method name that could not be resolved
        name: String,
    },

    /// Inbound command was missing a required argument or carried one of the wrong shape
    #[error("Malformed command {method}: {reason}")]
    MalformedCommand {
        /// Method the command named
        method: String,
        /// What was missing or mistyped
        reason: String,
    },

    /// Engine-reported failure
    #[error("Engine error: {source}")]
    Engine {
        /// The engine's error, surfaced verbatim
        #[from]
        source: EngineError,
    },
}

impl BridgeError {
    /// Get error code for programmatic handling
    pub fn error_code(&self) -> String {
        match self {
            BridgeError::Closed { .. } => "BRIDGE_CLOSED".to_string(),
            BridgeError::Initialization { .. } => "INITIALIZATION_FAILED".to_string(),
            BridgeError::UnknownMethod { .. } => "UNKNOWN_METHOD".to_string(),
            BridgeError::MalformedCommand { .. } => "MALFORMED_COMMAND".to_string(),
            BridgeError::Engine { .. } => "ENGINE_ERROR".to_string(),
        }
    }
}
