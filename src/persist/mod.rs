//! Persistent key-value slots and typed load/save helpers.

/// In-memory slot backend.
pub mod memory;
/// SQLite slot backend.
pub mod sqlite;

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    auth::SessionRecord,
    core::store::{EntryStore, StoreError},
    entry::LeaderboardEntry,
    settings::ConferenceSettings,
};

/// Slot holding the JSON array of entries.
pub const ENTRIES_KEY: &str = "whitehat_leaderboard";
/// Slot holding the JSON settings object.
pub const SETTINGS_KEY: &str = "whitehat_conference_settings";
/// Slot holding the admin session record.
pub const SESSION_KEY: &str = "admin_authenticated";

/// Persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Backend failure.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Encoding failure while writing.
    #[error("serialize: {0}")]
    Serde(#[from] serde_json::Error),
    /// Stored payload does not match the expected schema.
    #[error("slot {key} holds malformed data: {reason}")]
    Corrupt {
        /// Slot key.
        key: String,
        /// What was wrong.
        reason: String,
    },
    /// Any other failure.
    #[error("{0}")]
    Message(String),
}

/// Result alias for persistence calls.
pub type PersistResult<T> = Result<T, PersistError>;

/// String-keyed persistent byte slots.
///
/// Each `put` replaces the slot wholesale.
pub trait SlotStore: Send {
    /// Reads a slot; `None` when it was never written or was removed.
    fn get(&self, key: &str) -> PersistResult<Option<Vec<u8>>>;
    /// Writes a slot, replacing any previous value.
    fn put(&mut self, key: &str, value: &[u8]) -> PersistResult<()>;
    /// Deletes a slot. Removing an absent slot is not an error.
    fn remove(&mut self, key: &str) -> PersistResult<()>;
    /// Forces buffered writes to durable storage.
    fn flush(&mut self) -> PersistResult<()> {
        Ok(())
    }
}

impl<T: SlotStore + ?Sized> SlotStore for Box<T> {
    fn get(&self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> PersistResult<()> {
        (**self).put(key, value)
    }

    fn remove(&mut self, key: &str) -> PersistResult<()> {
        (**self).remove(key)
    }

    fn flush(&mut self) -> PersistResult<()> {
        (**self).flush()
    }
}

fn read_json<T: DeserializeOwned>(slots: &dyn SlotStore, key: &str) -> PersistResult<Option<T>> {
    let Some(bytes) = slots.get(key)? else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|err| PersistError::Corrupt {
            key: key.to_string(),
            reason: err.to_string(),
        })
}

fn write_json<T: Serialize + ?Sized>(
    slots: &mut dyn SlotStore,
    key: &str,
    value: &T,
) -> PersistResult<()> {
    let bytes = serde_json::to_vec(value)?;
    slots.put(key, &bytes)
}

/// Loads the entry collection; an absent slot is an empty collection.
pub fn load_entries(slots: &dyn SlotStore) -> PersistResult<Vec<LeaderboardEntry>> {
    Ok(read_json(slots, ENTRIES_KEY)?.unwrap_or_default())
}

/// Loads the entry collection into a fresh [`EntryStore`].
pub fn load_store(slots: &dyn SlotStore) -> PersistResult<EntryStore> {
    let entries = load_entries(slots)?;
    EntryStore::from_entries(entries).map_err(|err| match err {
        StoreError::DuplicateId(id) => PersistError::Corrupt {
            key: ENTRIES_KEY.to_string(),
            reason: format!("duplicate entry id {id}"),
        },
        other => PersistError::Message(other.to_string()),
    })
}

/// Rewrites the whole entry collection.
pub fn save_entries(slots: &mut dyn SlotStore, entries: &[LeaderboardEntry]) -> PersistResult<()> {
    write_json(slots, ENTRIES_KEY, entries)
}

/// Loads settings, falling back to defaults when never saved.
pub fn load_settings(slots: &dyn SlotStore) -> PersistResult<ConferenceSettings> {
    Ok(read_json(slots, SETTINGS_KEY)?.unwrap_or_default())
}

/// Overwrites the settings record.
pub fn save_settings(slots: &mut dyn SlotStore, settings: &ConferenceSettings) -> PersistResult<()> {
    write_json(slots, SETTINGS_KEY, settings)
}

/// Loads the admin session record, if any.
pub fn load_session(slots: &dyn SlotStore) -> PersistResult<Option<SessionRecord>> {
    read_json(slots, SESSION_KEY)
}

/// Stores the admin session record.
pub fn save_session(slots: &mut dyn SlotStore, record: &SessionRecord) -> PersistResult<()> {
    write_json(slots, SESSION_KEY, record)
}

/// Removes the admin session record.
pub fn clear_session(slots: &mut dyn SlotStore) -> PersistResult<()> {
    slots.remove(SESSION_KEY)
}
