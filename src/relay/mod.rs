//! Webhook event intake: dedup, classification and the text/audio paths
//!
//! ```text
//! delivery ─▶ Dispatcher ─┬▶ classify ─▶ ledger ─▶ text path  ─▶ log + reply
//!                         └▶ ... (one future per event) audio path ─▶ ack, transcribe, log + push
//! ```

mod audio;
mod commit;
mod dispatcher;
mod event;
mod ledger;
mod outcome;
mod record;
mod reply;
mod text;

pub use audio::AudioState;
pub use dispatcher::Dispatcher;
pub use event::{Classification, InboundEvent, MessageContent, MessageEvent, ReplyToken, classify};
pub use ledger::DedupLedger;
pub use outcome::{EventOutcome, OutcomePath};
pub use record::{
    LogRecord, MessageKind, Sender, TRANSCRIPT_DISABLED, TRANSCRIPT_FAILED, UNKNOWN_USER,
};
pub use reply::{
    AUDIO_ACK, AUDIO_DISABLED, ReplyIntent, Responder, text_confirmation, transcript_message,
    transcription_failure_message,
};
pub use text::handle_text;
