//! LINE webhook payload types

use serde::{Deserialize, Serialize};

use crate::relay::{InboundEvent, MessageContent, MessageEvent, ReplyToken};

/// Webhook request body
#[derive(Debug, Deserialize, Serialize)]
pub struct WebhookBody {
    /// Bot user ID that received the events
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// One webhook event (simplified)
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub reply_token: Option<String>,
    pub source: Option<EventSource>,
    #[serde(default)]
    pub timestamp: i64,
    pub webhook_event_id: Option<String>,
    pub delivery_context: Option<DeliveryContext>,
    pub message: Option<WebhookMessage>,
}

/// Event source
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    /// `user`, `group` or `room`
    #[serde(rename = "type")]
    pub source_type: String,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
    pub room_id: Option<String>,
}

/// Delivery metadata
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryContext {
    #[serde(default)]
    pub is_redelivery: bool,
}

/// Message object of a `message` event
#[derive(Debug, Deserialize, Serialize)]
pub struct WebhookMessage {
    pub id: String,
    /// `text`, `audio`, `image`, `sticker`, ...
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: Option<String>,
    /// Audio length in milliseconds
    pub duration: Option<u64>,
}

impl From<WebhookEvent> for InboundEvent {
    fn from(event: WebhookEvent) -> Self {
        if event.event_type != "message" {
            return Self::Other {
                event_type: event.event_type,
            };
        }

        let user_id = event.source.and_then(|s| s.user_id);
        let (Some(message), Some(user_id), Some(reply_token)) =
            (event.message, user_id, event.reply_token)
        else {
            return Self::Other {
                event_type: "message (incomplete)".to_string(),
            };
        };

        let content = match message.message_type.as_str() {
            "text" => MessageContent::Text {
                text: message.text.unwrap_or_default(),
            },
            "audio" => MessageContent::Audio {
                duration_ms: message.duration,
            },
            _ => MessageContent::Unsupported {
                kind: message.message_type,
            },
        };

        Self::Message(MessageEvent {
            message_id: message.id,
            user_id,
            reply_token: ReplyToken::new(reply_token),
            content,
            redelivery: event.delivery_context.is_some_and(|c| c.is_redelivery),
        })
    }
}

impl WebhookBody {
    /// Convert every event into the relay's event model
    #[must_use]
    pub fn into_events(self) -> Vec<InboundEvent> {
        self.events.into_iter().map(InboundEvent::from).collect()
    }
}
