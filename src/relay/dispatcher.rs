//! Batch dispatcher for webhook deliveries

use std::sync::{Arc, Mutex, PoisonError};

use chrono::FixedOffset;
use secrecy::{ExposeSecret, SecretString};

use crate::Result;
use crate::config::RelaySettings;
use crate::line::{MessageTransport, ProfileResolver};
use crate::relay::audio::{AudioJob, handle_audio};
use crate::relay::commit::append_record;
use crate::relay::event::{Classification, InboundEvent, MessageContent, MessageEvent, classify};
use crate::relay::ledger::DedupLedger;
use crate::relay::outcome::{EventOutcome, OutcomePath};
use crate::relay::record::{MessageKind, Sender};
use crate::relay::reply::Responder;
use crate::relay::text::handle_text;
use crate::sheets::LogStore;
use crate::voice::Transcriber;

/// Routes webhook events to the text and audio paths
///
/// Events in a batch run concurrently on the calling task. The dedup ledger
/// is the only state shared between them; its check-and-mark happens under
/// one lock with no await in between.
pub struct Dispatcher {
    ledger: Mutex<DedupLedger>,
    profiles: Arc<dyn ProfileResolver>,
    transport: Arc<dyn MessageTransport>,
    store: Arc<dyn LogStore>,
    transcriber: Option<Arc<dyn Transcriber>>,
    access_token: SecretString,
    utc_offset: FixedOffset,
}

impl Dispatcher {
    /// Create a dispatcher with default settings and transcription disabled
    #[must_use]
    pub fn new(
        profiles: Arc<dyn ProfileResolver>,
        transport: Arc<dyn MessageTransport>,
        store: Arc<dyn LogStore>,
    ) -> Self {
        let settings = RelaySettings::default();
        Self {
            ledger: Mutex::new(DedupLedger::new(settings.dedup_capacity)),
            profiles,
            transport,
            store,
            transcriber: None,
            access_token: SecretString::from(String::new()),
            utc_offset: settings.utc_offset,
        }
    }

    /// Enable transcription; `access_token` authorises the audio download
    #[must_use]
    pub fn with_transcriber(
        mut self,
        transcriber: Arc<dyn Transcriber>,
        access_token: SecretString,
    ) -> Self {
        self.transcriber = Some(transcriber);
        self.access_token = access_token;
        self
    }

    /// Apply ledger capacity and time zone
    #[must_use]
    pub fn with_settings(mut self, settings: &RelaySettings) -> Self {
        self.ledger = Mutex::new(DedupLedger::new(settings.dedup_capacity));
        self.utc_offset = settings.utc_offset;
        self
    }

    /// Whether audio events get transcribed
    #[must_use]
    pub const fn transcription_enabled(&self) -> bool {
        self.transcriber.is_some()
    }

    /// Handle every event of one delivery.
    ///
    /// Returns one entry per input in input order; `None` for ignored and
    /// duplicate events. A failing event never affects the others.
    pub async fn handle_batch(&self, events: Vec<InboundEvent>) -> Vec<Option<EventOutcome>> {
        tracing::debug!(count = events.len(), "dispatching webhook batch");
        futures::future::join_all(events.into_iter().map(|event| self.handle_event(event))).await
    }

    /// Handle a single event
    pub async fn handle_event(&self, event: InboundEvent) -> Option<EventOutcome> {
        let classification = classify(&event);
        let message = match event {
            InboundEvent::Other { event_type } => {
                tracing::debug!(event_type = %event_type, "ignoring non-message event");
                return None;
            }
            InboundEvent::Message(message) => message,
        };

        let kind = match classification {
            Classification::ProcessText => MessageKind::Text,
            Classification::ProcessAudio => MessageKind::Audio,
            Classification::Ignore => {
                tracing::debug!(
                    message_id = %message.message_id,
                    "ignoring unsupported message kind"
                );
                return None;
            }
        };

        if !self.claim(&message.message_id) {
            if message.redelivery {
                tracing::warn!(
                    message_id = %message.message_id,
                    "redelivered message already handled, skipping"
                );
            } else {
                tracing::info!(message_id = %message.message_id, "duplicate message, skipping");
            }
            return None;
        }

        Some(self.process(message, kind).await)
    }

    /// Atomic check-and-mark against the ledger
    fn claim(&self, message_id: &str) -> bool {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .claim(message_id)
    }

    async fn process(&self, message: MessageEvent, kind: MessageKind) -> EventOutcome {
        let MessageEvent {
            message_id,
            user_id,
            reply_token,
            content,
            redelivery,
        } = message;

        tracing::info!(
            message_id = %message_id,
            user_id = %user_id,
            kind = ?kind,
            redelivery,
            "handling message"
        );

        let mut outcome = EventOutcome::new(message_id, kind);
        let mut responder = Responder::new(self.transport.as_ref(), reply_token, user_id.clone());

        if let Err(e) = self
            .run_handler(&user_id, content, &mut responder, &mut outcome)
            .await
        {
            tracing::error!(
                message_id = %outcome.message_id,
                error = %e,
                "failed to handle message"
            );
            outcome.fail(&e);

            if let Err(notify_err) = responder.notify_failure(kind.failure_notice()).await {
                tracing::warn!(
                    message_id = %outcome.message_id,
                    error = %notify_err,
                    "failed to send error notice"
                );
            }
        }

        outcome.replied = responder.replies() > 0;
        outcome.pushed = responder.pushes() > 0;
        outcome
    }

    async fn run_handler(
        &self,
        user_id: &str,
        content: MessageContent,
        responder: &mut Responder<'_>,
        outcome: &mut EventOutcome,
    ) -> Result<()> {
        let profile = self.profiles.get_profile(user_id).await?;
        let sender = Sender::new(user_id, &profile.display_name);

        match content {
            MessageContent::Text { text } => {
                let now = chrono::Utc::now().with_timezone(&self.utc_offset);
                let (record, intent) = handle_text(&sender, &text, now);
                outcome.path = OutcomePath::Text;
                outcome.logged =
                    append_record(self.store.as_ref(), &outcome.message_id, &record).await;
                responder.deliver(&intent).await
            }
            MessageContent::Audio { duration_ms } => {
                let message_id = outcome.message_id.clone();
                let job = AudioJob {
                    message_id: &message_id,
                    sender: &sender,
                    duration_ms,
                    transcriber: self.transcriber.as_deref(),
                    access_token: self.access_token.expose_secret(),
                    store: self.store.as_ref(),
                    utc_offset: self.utc_offset,
                };
                handle_audio(job, responder, outcome).await
            }
            // Filtered out by classification before the ledger is touched
            MessageContent::Unsupported { .. } => Ok(()),
        }
    }
}
