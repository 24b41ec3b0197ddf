//! Log records handed to the log store

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Transcript placeholder when transcription is not configured
pub const TRANSCRIPT_DISABLED: &str = "feature not enabled";

/// Transcript placeholder when transcription was attempted and failed
pub const TRANSCRIPT_FAILED: &str = "transcription failed";

/// Display name used when the profile has none
pub const UNKNOWN_USER: &str = "Unknown user";

/// Kind of message being logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Audio,
}

impl MessageKind {
    /// Label written to the message type column
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "💬 Text",
            Self::Audio => "🎤 Voice",
        }
    }

    /// Short error text sent when handling fails unexpectedly
    #[must_use]
    pub const fn failure_notice(self) -> &'static str {
        match self {
            Self::Text => "❌ Sorry, your message could not be processed. Please try again later.",
            Self::Audio => {
                "❌ Sorry, your voice message could not be processed. Please try again later."
            }
        }
    }
}

/// Resolved message sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub user_id: String,
    pub display_name: String,
}

impl Sender {
    /// Build a sender, substituting a placeholder for a blank display name
    #[must_use]
    pub fn new(user_id: impl Into<String>, display_name: &str) -> Self {
        let display_name = display_name.trim();
        Self {
            user_id: user_id.into(),
            display_name: if display_name.is_empty() {
                UNKNOWN_USER.to_string()
            } else {
                display_name.to_string()
            },
        }
    }
}

/// One row for the log store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// When the record was produced, in the configured zone
    pub timestamp: DateTime<FixedOffset>,
    pub user_id: String,
    pub user_name: String,
    pub kind: MessageKind,
    /// Message text, transcript, or a sentinel
    pub content: String,
    /// Audio length in milliseconds
    pub duration_ms: Option<u64>,
}

impl LogRecord {
    /// Record for a text message
    #[must_use]
    pub fn text(sender: &Sender, text: &str, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            timestamp,
            user_id: sender.user_id.clone(),
            user_name: sender.display_name.clone(),
            kind: MessageKind::Text,
            content: text.to_string(),
            duration_ms: None,
        }
    }

    /// Record for an audio message
    #[must_use]
    pub fn audio(
        sender: &Sender,
        transcript: &str,
        duration_ms: Option<u64>,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            timestamp,
            user_id: sender.user_id.clone(),
            user_name: sender.display_name.clone(),
            kind: MessageKind::Audio,
            content: transcript.to_string(),
            duration_ms,
        }
    }

    /// Timestamp as written to the sheet
    #[must_use]
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format("%Y/%m/%d %H:%M:%S").to_string()
    }

    /// Duration as written to the sheet (`"12.3s"`), empty when unknown
    #[must_use]
    pub fn formatted_duration(&self) -> String {
        self.duration_ms.map_or_else(String::new, |ms| {
            format!("{}.{}s", ms / 1000, (ms % 1000) / 100)
        })
    }
}
