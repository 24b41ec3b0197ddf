//! Log append that never blocks user-facing delivery

use crate::relay::record::LogRecord;
use crate::sheets::LogStore;

/// Append a record, reporting failure only through logs.
///
/// The user is not told when persistence fails; replies and pushes are sent
/// regardless. Returns whether the row was written.
pub(crate) async fn append_record(
    store: &dyn LogStore,
    message_id: &str,
    record: &LogRecord,
) -> bool {
    match store.append(record).await {
        Ok(()) => {
            tracing::info!(message_id, kind = ?record.kind, "log row appended");
            true
        }
        Err(e) => {
            tracing::error!(message_id, error = %e, "log append failed, continuing with delivery");
            false
        }
    }
}
