use hashbrown::HashMap;

use crate::types::EntryId;

/// Entry id to position in the insertion-ordered collection.
pub type PosIndex = HashMap<EntryId, usize>;
