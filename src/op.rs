//! Mutation records produced by the entry store.

use serde::{Deserialize, Serialize};

use crate::{
    entry::{EntryPatch, LeaderboardEntry},
    types::{EntryId, Revision, TimestampMs},
};

/// Single applied change to the entry collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    /// A new entry was appended.
    Added {
        /// Appended record.
        entry: LeaderboardEntry,
    },
    /// An entry was patched.
    Updated {
        /// Entry id that changed.
        id: EntryId,
        /// Forward patch that was applied.
        patch: EntryPatch,
    },
    /// An entry was removed.
    Deleted {
        /// Removed record.
        entry: LeaderboardEntry,
    },
}

impl Mutation {
    /// Id of the entry this mutation touched.
    pub fn entry_id(&self) -> &str {
        match self {
            Self::Added { entry } | Self::Deleted { entry } => &entry.id,
            Self::Updated { id, .. } => id,
        }
    }
}

/// Mutation plus the store revision and wall-clock time it was applied at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMutation {
    /// Store revision after this mutation.
    pub revision: Revision,
    /// Time of application in milliseconds.
    pub ts_ms: TimestampMs,
    /// What changed.
    pub mutation: Mutation,
}
