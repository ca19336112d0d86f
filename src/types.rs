//! Shared primitive IDs and small helpers.

use std::time::{SystemTime, UNIX_EPOCH};

/// Entry identifier (UUID v4 text).
pub type EntryId = String;
/// Challenge score.
pub type Score = u64;
/// Elapsed time in whole seconds.
pub type Seconds = u64;
/// Milliseconds since the Unix epoch.
pub type TimestampMs = u64;
/// Monotonic mutation revision assigned by the store.
pub type Revision = u64;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> TimestampMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Generates a fresh random entry identifier.
pub fn new_entry_id() -> EntryId {
    uuid::Uuid::new_v4().to_string()
}
