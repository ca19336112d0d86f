//! Runtime event stream payloads.

use crate::types::{EntryId, Revision};

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardEvent {
    /// A new entry was added.
    EntryAdded {
        /// Added entry id.
        id: EntryId,
    },
    /// An existing entry was patched.
    EntryUpdated {
        /// Updated entry id.
        id: EntryId,
    },
    /// An entry was deleted.
    EntryDeleted {
        /// Deleted entry id.
        id: EntryId,
    },
    /// Conference settings were replaced.
    SettingsSaved,
    /// Entries or settings written by another process were loaded.
    Reloaded,
    /// Storage has caught up with at least this store revision.
    DurableUpTo {
        /// Highest revision known durable.
        revision: Revision,
    },
}

impl LeaderboardEvent {
    /// True for events that change what a leaderboard view shows.
    pub fn changes_view(&self) -> bool {
        !matches!(self, Self::DurableUpTo { .. })
    }
}
