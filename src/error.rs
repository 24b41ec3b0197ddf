//! Error types for the relay

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the relay
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing or malformed credential)
    #[error("configuration error: {0}")]
    Config(String),

    /// LINE Messaging API error
    #[error("LINE API error: {0}")]
    Line(String),

    /// Webhook signature missing or invalid
    #[error("signature error: {0}")]
    Signature(String),

    /// The reply token for this event was already used
    #[error("reply token already spent")]
    ReplyTokenSpent,

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Google Sheets error
    #[error("sheets error: {0}")]
    Sheets(String),

    /// Authentication/authorization error
    #[error("auth error: {0}")]
    Auth(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
