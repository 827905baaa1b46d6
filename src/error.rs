//! Unified error types for sortbot.
//!
//! User-facing conditions like "session already active" are not errors; they
//! are [`crate::engine::EventOutcome`] variants surfaced as replies. The
//! types here cover real faults: transport failures, bad configuration, IO.

/// The main error type for sortbot operations.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Transport error.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    /// Configuration error.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal error.
    #[error("{0}")]
    Internal(String),
}

impl BotError {
    /// Create a config error from a string.
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(ConfigError::Invalid(msg.into()))
    }

    /// Create an internal error.
    #[inline]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias for sortbot operations.
pub type Result<T> = std::result::Result<T, BotError>;

// ============================================================================
// Transport Errors
// ============================================================================

/// Error type for the outbound transport boundary.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to send a status reply.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Failed to replay a previously received message.
    #[error("replay failed: {0}")]
    ReplayFailed(String),

    /// A message reference could not be mapped onto the transport.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Transport is not connected.
    #[error("not connected")]
    NotConnected,
}

impl TransportError {
    /// Create a send failed error.
    #[inline]
    pub fn send(msg: impl Into<String>) -> Self {
        Self::SendFailed(msg.into())
    }

    /// Create a replay failed error.
    #[inline]
    pub fn replay(msg: impl Into<String>) -> Self {
        Self::ReplayFailed(msg.into())
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),

    /// Missing required field.
    #[error("missing: {0}")]
    Missing(String),

    /// Invalid value.
    #[error("invalid: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create a missing field error.
    #[inline]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }

    /// Create an invalid value error.
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
