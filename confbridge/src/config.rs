//! Bridge configuration and credential resolution
//!
//! Credentials can come from two places at startup, typically the
//! application manifest and the embedding layer's preferences. A
//! source only counts when both fields are present,
//! non-empty, and not the literal string "null" that templating leaves
//! behind; the primary source wins whenever it is usable.

/// Consumer key/secret pair used to initialize the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Consumer key
    pub consumer_key: String,
    /// Consumer secret
    pub consumer_secret: String,
}

/// One place credentials may be read from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSource {
    /// Consumer key, if the source defines one
    pub consumer_key: Option<String>,
    /// Consumer secret, if the source defines one
    pub consumer_secret: Option<String>,
}

impl CredentialSource {
    /// Source carrying both fields
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: Some(consumer_key.into()),
            consumer_secret: Some(consumer_secret.into()),
        }
    }

    /// Source defining nothing
    pub fn empty() -> Self {
        Self::default()
    }

    fn usable(&self) -> Option<Credentials> {
        let key = self.consumer_key.as_deref().filter(|v| is_set(v))?;
        let secret = self.consumer_secret.as_deref().filter(|v| is_set(v))?;
        Some(Credentials {
            consumer_key: key.to_string(),
            consumer_secret: secret.to_string(),
        })
    }
}

fn is_set(value: &str) -> bool {
    !value.is_empty() && value != "null"
}

impl Credentials {
    /// Resolve credentials from two sources, primary first
    pub fn resolve(primary: &CredentialSource, fallback: &CredentialSource) -> Option<Credentials> {
        primary.usable().or_else(|| fallback.usable())
    }
}

/// Configuration owned by one bridge instance
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    /// Credentials to initialize the engine with at construction, if any
    pub credentials: Option<Credentials>,
}

impl BridgeConfig {
    /// Configuration with no startup credentials
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve startup credentials from two sources
    pub fn from_sources(primary: &CredentialSource, fallback: &CredentialSource) -> Self {
        Self {
            credentials: Credentials::resolve(primary, fallback),
        }
    }

    /// Configuration with explicit credentials
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
        }
    }
}
