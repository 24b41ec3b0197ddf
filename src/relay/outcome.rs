//! Per-event result reported in the webhook response

use serde::Serialize;

use crate::relay::record::MessageKind;

/// Which path an event ended on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomePath {
    /// Text logged and confirmed
    Text,
    /// Audio transcribed and pushed
    Transcribed,
    /// Audio transcription attempted and failed
    TranscriptionFailed,
    /// Audio received while transcription is off
    TranscriptionDisabled,
    /// Unexpected failure (profile lookup, transport)
    Failed,
}

/// Result of handling one actionable, non-duplicate event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOutcome {
    pub message_id: String,
    pub kind: MessageKind,
    pub path: OutcomePath,
    /// Log row appended
    pub logged: bool,
    /// Reply-token message delivered
    pub replied: bool,
    /// Push message delivered
    pub pushed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EventOutcome {
    pub(crate) fn new(message_id: String, kind: MessageKind) -> Self {
        let path = match kind {
            MessageKind::Text => OutcomePath::Text,
            MessageKind::Audio => OutcomePath::TranscriptionDisabled,
        };
        Self {
            message_id,
            kind,
            path,
            logged: false,
            replied: false,
            pushed: false,
            error: None,
        }
    }

    pub(crate) fn fail(&mut self, error: &crate::Error) {
        self.path = OutcomePath::Failed;
        self.error = Some(error.to_string());
    }
}
