//! Inbound events and classification

use std::fmt;

/// Single-use reply token issued with an inbound event
///
/// Deliberately not `Clone`: sending a reply consumes the token.
pub struct ReplyToken(String);

impl ReplyToken {
    /// Wrap a raw token string
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value for the transport request body
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ReplyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReplyToken(..)")
    }
}

/// An event from one webhook delivery
#[derive(Debug)]
pub enum InboundEvent {
    /// A user message
    Message(MessageEvent),
    /// Anything else (follow, unfollow, postback, incomplete messages, ...)
    Other {
        /// Platform event type
        event_type: String,
    },
}

/// A user message event
#[derive(Debug)]
pub struct MessageEvent {
    /// Platform message ID (dedup key)
    pub message_id: String,
    /// Sender's user ID
    pub user_id: String,
    /// Reply token for this event
    pub reply_token: ReplyToken,
    /// Kind-specific payload
    pub content: MessageContent,
    /// Whether the platform flagged this delivery as a retry
    pub redelivery: bool,
}

/// Message payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Plain text
    Text {
        /// Message body
        text: String,
    },
    /// Voice/audio clip
    Audio {
        /// Clip length in milliseconds, if the platform reported it
        duration_ms: Option<u64>,
    },
    /// Image, sticker, video, location, ...
    Unsupported {
        /// Platform message type
        kind: String,
    },
}

/// What the dispatcher should do with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Not actionable; produces no side effects
    Ignore,
    /// Log the text and confirm
    ProcessText,
    /// Transcribe (if enabled), log, and report back
    ProcessAudio,
}

/// Decide whether an event is actionable
#[must_use]
pub const fn classify(event: &InboundEvent) -> Classification {
    match event {
        InboundEvent::Message(MessageEvent {
            content: MessageContent::Text { .. },
            ..
        }) => Classification::ProcessText,
        InboundEvent::Message(MessageEvent {
            content: MessageContent::Audio { .. },
            ..
        }) => Classification::ProcessAudio,
        InboundEvent::Message(MessageEvent {
            content: MessageContent::Unsupported { .. },
            ..
        })
        | InboundEvent::Other { .. } => Classification::Ignore,
    }
}
