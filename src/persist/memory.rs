//! Process-local slot backend used by tests and throwaway sessions.

use hashbrown::HashMap;

use super::{PersistResult, SlotStore};

/// [`SlotStore`] held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySlots {
    slots: HashMap<String, Vec<u8>>,
}

impl MemorySlots {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlots {
    fn get(&self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        Ok(self.slots.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> PersistResult<()> {
        self.slots.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> PersistResult<()> {
        self.slots.remove(key);
        Ok(())
    }
}
