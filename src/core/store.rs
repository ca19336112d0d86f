use crate::{
    core::indices::PosIndex,
    entry::{EntryForm, EntryPatch, LeaderboardEntry, NewEntry, ValidationError},
    op::{AppliedMutation, Mutation},
    types::{EntryId, Revision, new_entry_id, now_ms},
};

/// Errors raised by [`EntryStore`] mutations and loads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Form input was rejected; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Two records share one id.
    #[error("duplicate entry id {0}")]
    DuplicateId(EntryId),
}

/// Authoritative, insertion-ordered entry collection.
///
/// Every successful mutation bumps the revision and queues an
/// [`AppliedMutation`]; callers persist [`EntryStore::export_snapshot`] as a
/// whole after each one.
#[derive(Debug, Default)]
pub struct EntryStore {
    entries: Vec<LeaderboardEntry>,
    pos: PosIndex,
    revision: Revision,
    pending: Vec<AppliedMutation>,
}

impl EntryStore {
    /// Creates an empty store at revision 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a persisted collection, keeping its order.
    pub fn from_entries(entries: Vec<LeaderboardEntry>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for entry in entries {
            if store.pos.contains_key(&entry.id) {
                return Err(StoreError::DuplicateId(entry.id));
            }
            store.pos.insert(entry.id.clone(), store.entries.len());
            store.entries.push(entry);
        }
        Ok(store)
    }

    /// Swaps in a collection read back from storage.
    ///
    /// Queues no mutation and leaves the revision alone; on a duplicate id
    /// the store is unchanged.
    pub fn replace_all(&mut self, entries: Vec<LeaderboardEntry>) -> Result<(), StoreError> {
        let fresh = Self::from_entries(entries)?;
        self.entries = fresh.entries;
        self.pos = fresh.pos;
        Ok(())
    }

    /// All entries in insertion order.
    pub fn list(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Owned copy of every entry, ready to be written to storage.
    pub fn export_snapshot(&self) -> Vec<LeaderboardEntry> {
        self.entries.clone()
    }

    /// Looks up one entry by id.
    pub fn get(&self, id: &str) -> Option<&LeaderboardEntry> {
        self.pos.get(id).and_then(|idx| self.entries.get(*idx))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Revision of the latest applied mutation; 0 for a freshly loaded store.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Validates admin form input and appends a new entry with a fresh id
    /// and the current time.
    pub fn add(
        &mut self,
        form: &EntryForm,
    ) -> Result<(LeaderboardEntry, AppliedMutation), StoreError> {
        let new = form.validate()?;
        Ok(self.add_validated(new))
    }

    /// Appends an already validated entry.
    pub fn add_validated(&mut self, new: NewEntry) -> (LeaderboardEntry, AppliedMutation) {
        let mut id = new_entry_id();
        while self.pos.contains_key(&id) {
            id = new_entry_id();
        }

        let entry = LeaderboardEntry {
            id,
            name: new.name,
            organization: new.organization,
            score: new.score,
            time: new.time,
            timestamp: now_ms(),
        };

        self.pos.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry.clone());
        let applied = self.record(Mutation::Added {
            entry: entry.clone(),
        });
        (entry, applied)
    }

    /// Merges `patch` into the matching entry.
    ///
    /// Returns `None` without touching the revision when the id is unknown
    /// or the patch is empty.
    pub fn update(&mut self, id: &str, patch: EntryPatch) -> Option<AppliedMutation> {
        if patch.is_empty() {
            return None;
        }
        let idx = *self.pos.get(id)?;
        let rec = self.entries.get_mut(idx)?;
        patch.apply_to(rec);
        Some(self.record(Mutation::Updated {
            id: id.to_string(),
            patch,
        }))
    }

    /// Removes the matching entry. Unknown ids are a no-op returning `None`.
    pub fn delete(&mut self, id: &str) -> Option<AppliedMutation> {
        let idx = self.pos.remove(id)?;
        let entry = self.entries.remove(idx);
        for moved in &self.entries[idx..] {
            if let Some(p) = self.pos.get_mut(&moved.id) {
                *p -= 1;
            }
        }
        Some(self.record(Mutation::Deleted { entry }))
    }

    /// Takes every mutation applied since the last drain.
    pub fn drain_pending(&mut self) -> Vec<AppliedMutation> {
        std::mem::take(&mut self.pending)
    }

    fn record(&mut self, mutation: Mutation) -> AppliedMutation {
        self.revision += 1;
        let applied = AppliedMutation {
            revision: self.revision,
            ts_ms: now_ms(),
            mutation,
        };
        self.pending.push(applied.clone());
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::InvalidField;

    fn form(name: &str, score: u64) -> EntryForm {
        EntryForm::new(name, "ACME", score.to_string(), "30")
    }

    #[test]
    fn delete_reindexes_following_entries() {
        let mut store = EntryStore::new();
        let (a, _) = store.add(&form("A", 1)).expect("a");
        let (b, _) = store.add(&form("B", 2)).expect("b");
        let (c, _) = store.add(&form("C", 3)).expect("c");

        assert!(store.delete(&b.id).is_some());
        assert_eq!(store.get(&a.id).map(|e| e.score), Some(1));
        assert_eq!(store.get(&c.id).map(|e| e.score), Some(3));
        assert!(store.get(&b.id).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn replace_all_keeps_revision_and_rejects_duplicates() {
        let mut store = EntryStore::new();
        let (a, _) = store.add(&form("A", 1)).expect("a");
        store.drain_pending();

        let mut outside = EntryStore::new();
        let (b, _) = outside.add(&form("B", 2)).expect("b");
        store.replace_all(outside.export_snapshot()).expect("replace");
        assert_eq!(store.revision(), 1);
        assert!(store.get(&a.id).is_none());
        assert_eq!(store.get(&b.id).map(|e| e.score), Some(2));
        assert!(store.drain_pending().is_empty());

        let err = store
            .replace_all(vec![b.clone(), b.clone()])
            .expect_err("duplicate");
        assert_eq!(err, StoreError::DuplicateId(b.id.clone()));
        assert_eq!(store.list(), &[b][..]);
    }

    #[test]
    fn rejected_form_writes_nothing() {
        let mut store = EntryStore::new();
        let err = store
            .add(&EntryForm::new("X", "", "1", "1"))
            .expect_err("invalid");
        assert_eq!(
            err,
            StoreError::Validation(ValidationError {
                fields: vec![InvalidField::Organization]
            })
        );
        assert!(store.is_empty());
        assert_eq!(store.revision(), 0);
        assert!(store.drain_pending().is_empty());
    }

    #[test]
    fn from_entries_rejects_duplicate_ids() {
        let entry = LeaderboardEntry {
            id: "dup".to_string(),
            name: "A".to_string(),
            organization: "B".to_string(),
            score: 1,
            time: 1,
            timestamp: 1,
        };
        let err = EntryStore::from_entries(vec![entry.clone(), entry]).expect_err("dup");
        assert_eq!(err, StoreError::DuplicateId("dup".to_string()));
    }

    #[test]
    fn update_and_delete_of_unknown_id_are_noops() {
        let mut store = EntryStore::new();
        store.add(&form("A", 1)).expect("a");
        let before = store.export_snapshot();

        let patch = EntryPatch {
            score: Some(9),
            ..EntryPatch::default()
        };
        assert!(store.update("missing", patch).is_none());
        assert!(store.delete("missing").is_none());
        assert_eq!(store.export_snapshot(), before);
        assert_eq!(store.revision(), 1);
    }
}
