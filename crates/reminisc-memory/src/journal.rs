//! Memory journal store.
//!
//! Holds every [`Memory`] newest-first and writes the whole list back as a
//! JSON blob after each change. Like the anchor index, saving is
//! best-effort.
//!
//! On a fresh install (no blob, or a blob that no longer decodes) the store
//! can be seeded with [`Memory::examples`] so the journal is not empty on
//! first launch.

use reminisc_types::{Memory, MemoryResponse};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::kv::{KeyValueStore, StoreError, load_json, save_json};

/// Storage key of the memory collection.
pub const MEMORIES_KEY: &str = "saved_memories";

/// The user's memories.
pub struct MemoryStore {
    memories: Vec<Memory>,
    kv: Box<dyn KeyValueStore>,
}

impl MemoryStore {
    /// Load the journal from `kv`.
    ///
    /// When nothing usable is stored, the journal starts with the example
    /// memories if `seed_examples` is set, otherwise empty.
    pub fn load(kv: Box<dyn KeyValueStore>, seed_examples: bool) -> Self {
        let stored = match load_json::<Vec<Memory>, _>(kv.as_ref(), MEMORIES_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "failed to decode saved memories");
                None
            }
        };
        let memories = match stored {
            Some(memories) => {
                info!(count = memories.len(), "loaded memories");
                memories
            }
            None if seed_examples => {
                info!("no saved memories; seeding examples");
                Memory::examples()
            }
            None => Vec::new(),
        };
        Self { memories, kv }
    }

    /// Insert `memory` at the front of the journal.
    pub fn add(&mut self, memory: Memory) {
        debug!(memory = %memory.id, title = %memory.title, "adding memory");
        self.memories.insert(0, memory);
        self.persist_best_effort();
    }

    /// Replace the stored memory with the same id. Returns `false` when no
    /// such memory exists.
    pub fn update(&mut self, memory: Memory) -> bool {
        match self.memories.iter_mut().find(|m| m.id == memory.id) {
            Some(slot) => {
                *slot = memory;
                self.persist_best_effort();
                true
            }
            None => false,
        }
    }

    /// Remove the memory with `id`. Returns the removed memory, if any.
    ///
    /// Anchors pointing at the memory are left alone; see
    /// `AppServices::delete_memory` for the cascading variant.
    pub fn delete(&mut self, id: Uuid) -> Option<Memory> {
        let pos = self.memories.iter().position(|m| m.id == id)?;
        let removed = self.memories.remove(pos);
        self.persist_best_effort();
        Some(removed)
    }

    /// Append `response` to the memory with `memory_id`. Returns `false` when
    /// no such memory exists.
    pub fn add_response(&mut self, memory_id: Uuid, response: MemoryResponse) -> bool {
        match self.memories.iter_mut().find(|m| m.id == memory_id) {
            Some(memory) => {
                memory.responses.push(response);
                self.persist_best_effort();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Memory> {
        self.memories.iter().find(|m| m.id == id)
    }

    /// All memories, newest first.
    pub fn memories(&self) -> &[Memory] {
        &self.memories
    }

    pub fn len(&self) -> usize {
        self.memories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memories.is_empty()
    }

    /// Write the whole journal to storage.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        save_json(self.kv.as_mut(), MEMORIES_KEY, &self.memories)
    }

    fn persist_best_effort(&mut self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, count = self.memories.len(), "failed to persist memories");
        }
    }
}
