//! Google Sheets message log
//!
//! Every processed message becomes one row:
//!
//! | A    | B       | C         | D            | E                    | F              |
//! |------|---------|-----------|--------------|----------------------|----------------|
//! | Time | User ID | User Name | Message Type | Content / Transcript | Audio Duration |

mod auth;
mod client;

use async_trait::async_trait;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use client::SheetsStore;

use crate::Result;
use crate::relay::LogRecord;

/// Column headers written to the first row
pub const HEADER: [&str; 6] = [
    "Time",
    "User ID",
    "User Name",
    "Message Type",
    "Content / Transcript",
    "Audio Duration",
];

/// Append-only destination for log records
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Append one record as a new row
    async fn append(&self, record: &LogRecord) -> Result<()>;

    /// Write the header row if the sheet is empty
    ///
    /// Failures are logged, never returned.
    async fn ensure_header(&self);
}

/// Cell values for a record, in column order
#[must_use]
pub fn record_row(record: &LogRecord) -> Vec<String> {
    vec![
        record.formatted_timestamp(),
        record.user_id.clone(),
        record.user_name.clone(),
        record.kind.label().to_string(),
        record.content.clone(),
        record.formatted_duration(),
    ]
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone as _};

    use super::*;
    use crate::relay::{Sender, TRANSCRIPT_DISABLED};

    fn at() -> chrono::DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 6, 7, 8, 9)
            .unwrap()
    }

    #[test]
    fn text_row_layout() {
        let record = LogRecord::text(&Sender::new("U1", "Alice"), "hello", at());
        assert_eq!(
            record_row(&record),
            vec![
                "2024/05/06 07:08:09",
                "U1",
                "Alice",
                "💬 Text",
                "hello",
                ""
            ]
        );
    }

    #[test]
    fn audio_row_carries_duration() {
        let record = LogRecord::audio(
            &Sender::new("U2", ""),
            TRANSCRIPT_DISABLED,
            Some(4_000),
            at(),
        );
        let row = record_row(&record);
        assert_eq!(row.len(), HEADER.len());
        assert_eq!(row[2], "Unknown user");
        assert_eq!(row[3], "🎤 Voice");
        assert_eq!(row[4], TRANSCRIPT_DISABLED);
        assert_eq!(row[5], "4.0s");
    }
}
