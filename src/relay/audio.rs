//! Audio message path
//!
//! Transcription usually outlives the reply token, so when it is enabled the
//! token is spent on an acknowledgment and the result goes out as a push.
//!
//! ```text
//! FeatureDisabled (terminal)
//! Acknowledging ─▶ Transcribing ─┬▶ Delivering (terminal)
//!                                └▶ Failed     (terminal)
//! ```

use chrono::{DateTime, FixedOffset};

use crate::Result;
use crate::relay::commit;
use crate::relay::outcome::{EventOutcome, OutcomePath};
use crate::relay::record::{LogRecord, Sender, TRANSCRIPT_DISABLED, TRANSCRIPT_FAILED};
use crate::relay::reply::{
    AUDIO_ACK, AUDIO_DISABLED, ReplyIntent, Responder, transcript_message,
    transcription_failure_message,
};
use crate::sheets::LogStore;
use crate::voice::Transcriber;

/// Audio handling state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioState {
    /// No transcription provider configured
    FeatureDisabled,
    /// About to spend the reply token on an acknowledgment
    Acknowledging,
    /// Waiting on the provider
    Transcribing,
    /// Transcript ready
    Delivering { transcript: String },
    /// Provider failed
    Failed { reason: String },
}

impl AudioState {
    /// Initial state for an audio event
    #[must_use]
    pub const fn start(transcription_enabled: bool) -> Self {
        if transcription_enabled {
            Self::Acknowledging
        } else {
            Self::FeatureDisabled
        }
    }

    /// Acknowledgment delivered
    #[must_use]
    pub fn acknowledged(self) -> Self {
        match self {
            Self::Acknowledging => Self::Transcribing,
            other => other,
        }
    }

    /// Provider returned
    #[must_use]
    pub fn transcribed(self, result: Result<String>) -> Self {
        match (self, result) {
            (Self::Transcribing, Ok(transcript)) => Self::Delivering { transcript },
            (Self::Transcribing, Err(e)) => Self::Failed {
                reason: e.to_string(),
            },
            (other, _) => other,
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::FeatureDisabled | Self::Delivering { .. } | Self::Failed { .. }
        )
    }

    /// Message this state sends
    #[must_use]
    pub fn intent(&self) -> ReplyIntent {
        match self {
            Self::FeatureDisabled => ReplyIntent::Reply(AUDIO_DISABLED.to_string()),
            Self::Acknowledging => ReplyIntent::Reply(AUDIO_ACK.to_string()),
            Self::Transcribing => ReplyIntent::None,
            Self::Delivering { transcript } => ReplyIntent::Push(transcript_message(transcript)),
            Self::Failed { reason } => ReplyIntent::Push(transcription_failure_message(reason)),
        }
    }

    /// Log row for a terminal state
    #[must_use]
    pub fn record(
        &self,
        sender: &Sender,
        duration_ms: Option<u64>,
        timestamp: DateTime<FixedOffset>,
    ) -> Option<LogRecord> {
        let transcript = match self {
            Self::FeatureDisabled => TRANSCRIPT_DISABLED,
            Self::Delivering { transcript } => transcript.as_str(),
            Self::Failed { .. } => TRANSCRIPT_FAILED,
            Self::Acknowledging | Self::Transcribing => return None,
        };
        Some(LogRecord::audio(sender, transcript, duration_ms, timestamp))
    }

    /// Outcome path for a terminal state, `None` while still in flight
    #[must_use]
    pub const fn path(&self) -> Option<OutcomePath> {
        match self {
            Self::FeatureDisabled => Some(OutcomePath::TranscriptionDisabled),
            Self::Delivering { .. } => Some(OutcomePath::Transcribed),
            Self::Failed { .. } => Some(OutcomePath::TranscriptionFailed),
            Self::Acknowledging | Self::Transcribing => None,
        }
    }
}

/// Inputs for one audio event
pub(crate) struct AudioJob<'a> {
    pub message_id: &'a str,
    pub sender: &'a Sender,
    pub duration_ms: Option<u64>,
    pub transcriber: Option<&'a dyn Transcriber>,
    pub access_token: &'a str,
    pub store: &'a dyn LogStore,
    pub utc_offset: FixedOffset,
}

/// Drive an audio event to a terminal state, logging and notifying the user
///
/// # Errors
///
/// Returns transport errors from the acknowledgment or final delivery
pub(crate) async fn handle_audio(
    job: AudioJob<'_>,
    responder: &mut Responder<'_>,
    outcome: &mut EventOutcome,
) -> Result<()> {
    let mut state = AudioState::start(job.transcriber.is_some());

    while !state.is_terminal() {
        state = match (state, job.transcriber) {
            (state @ AudioState::Acknowledging, _) => {
                responder.deliver(&state.intent()).await?;
                tracing::debug!(message_id = job.message_id, "audio acknowledged");
                state.acknowledged()
            }
            (state @ AudioState::Transcribing, Some(transcriber)) => {
                let result = transcriber
                    .transcribe(job.message_id, job.access_token)
                    .await;
                match &result {
                    Ok(text) => tracing::info!(
                        message_id = job.message_id,
                        preview = %preview(text),
                        "transcription complete"
                    ),
                    Err(e) => tracing::error!(
                        message_id = job.message_id,
                        error = %e,
                        "transcription failed"
                    ),
                }
                state.transcribed(result)
            }
            // Only reachable without a transcriber, which starts disabled
            (_, None) => AudioState::FeatureDisabled,
            (terminal, Some(_)) => terminal,
        };
    }

    if let Some(path) = state.path() {
        outcome.path = path;
    }
    if let AudioState::Failed { reason } = &state {
        outcome.error = Some(reason.clone());
    }

    let timestamp = chrono::Utc::now().with_timezone(&job.utc_offset);
    if let Some(record) = state.record(job.sender, job.duration_ms, timestamp) {
        outcome.logged = commit::append_record(job.store, job.message_id, &record).await;
    }

    responder.deliver(&state.intent()).await
}

/// First 100 characters of a transcript, for logs
fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(100).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn disabled_is_terminal_with_single_reply() {
        let state = AudioState::start(false);

        assert!(state.is_terminal());
        assert_eq!(
            state.intent(),
            ReplyIntent::Reply(AUDIO_DISABLED.to_string())
        );
        assert_eq!(state.path(), Some(OutcomePath::TranscriptionDisabled));
    }

    #[test]
    fn enabled_walks_ack_then_transcribe_then_push() {
        let state = AudioState::start(true);
        assert_eq!(state, AudioState::Acknowledging);
        assert!(matches!(state.intent(), ReplyIntent::Reply(_)));
        assert_eq!(state.path(), None);

        let state = state.acknowledged();
        assert_eq!(state, AudioState::Transcribing);
        assert_eq!(state.intent(), ReplyIntent::None);
        assert_eq!(state.path(), None);

        let state = state.transcribed(Ok("hi there".to_string()));
        assert!(state.is_terminal());
        assert_eq!(
            state.intent(),
            ReplyIntent::Push(transcript_message("hi there"))
        );
        assert_eq!(state.path(), Some(OutcomePath::Transcribed));
    }

    #[test]
    fn provider_error_moves_to_failed() {
        let state = AudioState::Transcribing.transcribed(Err(Error::Stt("quota".into())));

        let AudioState::Failed { reason } = &state else {
            panic!("expected Failed, got {state:?}");
        };
        assert!(reason.contains("quota"));
        assert!(matches!(state.intent(), ReplyIntent::Push(ref t) if t.contains("quota")));
        assert_eq!(state.path(), Some(OutcomePath::TranscriptionFailed));
    }

    #[test]
    fn in_flight_states_have_no_path() {
        for state in [AudioState::Acknowledging, AudioState::Transcribing] {
            assert!(!state.is_terminal());
            assert_eq!(state.path(), None, "{state:?}");
        }
    }

    #[test]
    fn out_of_order_transitions_are_ignored() {
        assert_eq!(
            AudioState::FeatureDisabled.acknowledged(),
            AudioState::FeatureDisabled
        );
        assert_eq!(
            AudioState::Acknowledging.transcribed(Ok("x".into())),
            AudioState::Acknowledging
        );
    }

    #[test]
    fn terminal_records_carry_the_right_transcript() {
        let now = chrono::Utc::now().fixed_offset();
        let sender = Sender::new("u1", "Alice");

        let disabled = AudioState::FeatureDisabled
            .record(&sender, Some(3000), now)
            .unwrap();
        assert_eq!(disabled.content, TRANSCRIPT_DISABLED);
        assert_eq!(disabled.duration_ms, Some(3000));

        let failed = AudioState::Failed { reason: "x".into() }
            .record(&sender, None, now)
            .unwrap();
        assert_eq!(failed.content, TRANSCRIPT_FAILED);

        let done = AudioState::Delivering {
            transcript: "你好".into(),
        }
        .record(&sender, None, now)
        .unwrap();
        assert_eq!(done.content, "你好");

        assert!(AudioState::Transcribing.record(&sender, None, now).is_none());
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "a".repeat(150);
        assert_eq!(preview(&long).len(), 103);
        assert_eq!(preview("short"), "short");
    }
}
