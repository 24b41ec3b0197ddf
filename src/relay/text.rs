//! Text message path

use chrono::{DateTime, FixedOffset};

use crate::relay::record::{LogRecord, Sender};
use crate::relay::reply::{ReplyIntent, text_confirmation};

/// Build the log row and confirmation for a text message
#[must_use]
pub fn handle_text(
    sender: &Sender,
    text: &str,
    timestamp: DateTime<FixedOffset>,
) -> (LogRecord, ReplyIntent) {
    let record = LogRecord::text(sender, text, timestamp);
    let intent = ReplyIntent::Reply(text_confirmation(text, &sender.display_name));
    (record, intent)
}
