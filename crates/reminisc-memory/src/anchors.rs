//! Spatial Anchor Index.
//!
//! Binds memories to world poses and answers "which anchors lie within
//! distance `d` of point `p`". The whole collection lives in memory and is
//! written back as one JSON blob after every mutation.
//!
//! Persistence is best-effort: a failed save is logged and the in-memory
//! collection stays authoritative; a failed load starts from an empty
//! collection. Callers that need to know whether data reached disk can call
//! [`AnchorIndex::persist`] themselves.
//!
//! Proximity search is a linear scan; the collection is expected to hold at
//! most a few hundred anchors.
//!
//! # Example
//!
//! ```rust
//! use reminisc_memory::anchors::{AnchorIndex, MemoryAnchor};
//! use reminisc_memory::kv::MemoryKv;
//! use reminisc_spatial::{Mat4, Vec3};
//! use uuid::Uuid;
//!
//! let mut index = AnchorIndex::load(Box::new(MemoryKv::new()));
//! let pose = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
//! index.add(MemoryAnchor::new(Uuid::new_v4(), pose, "Mug"));
//!
//! assert!(index.find_nearby(Vec3::zero(), 1.0).is_empty()); // exactly 1.0 away
//! assert_eq!(index.find_nearby(Vec3::zero(), 1.01).len(), 1);
//! ```

use chrono::{DateTime, Utc};
use reminisc_spatial::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::kv::{KeyValueStore, StoreError, load_json, save_json};

/// Storage key of the anchor collection.
pub const ANCHORS_KEY: &str = "memory_anchors";

/// Radius used by [`AnchorIndex::find_nearby_default`].
pub const DEFAULT_NEARBY_DISTANCE: f32 = 0.5;

// ─────────────────────────────────────────────────────────────────────────────
// MemoryAnchor
// ─────────────────────────────────────────────────────────────────────────────

/// A memory pinned to a world pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryAnchor {
    pub id: Uuid,
    /// The memory this anchor belongs to.
    pub memory_id: Uuid,
    /// Column-major world pose; its translation is the queryable position.
    pub world_transform: Mat4,
    /// Label of the object the anchor was created on.
    pub detected_object_type: String,
    pub created_date: DateTime<Utc>,
}

impl MemoryAnchor {
    /// Construct a new [`MemoryAnchor`] with a freshly generated UUID and the
    /// current UTC timestamp.
    pub fn new(memory_id: Uuid, world_transform: Mat4, object_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            memory_id,
            world_transform,
            detected_object_type: object_type.into(),
            created_date: Utc::now(),
        }
    }

    /// World position of the anchor.
    pub fn position(&self) -> Vec3 {
        self.world_transform.translation()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AnchorIndex
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory anchor collection with write-through persistence.
pub struct AnchorIndex {
    anchors: Vec<MemoryAnchor>,
    kv: Box<dyn KeyValueStore>,
}

impl AnchorIndex {
    /// Load the collection from `kv`, falling back to an empty index when the
    /// blob is missing or unreadable.
    pub fn load(kv: Box<dyn KeyValueStore>) -> Self {
        let anchors = match load_json::<Vec<MemoryAnchor>, _>(kv.as_ref(), ANCHORS_KEY) {
            Ok(Some(anchors)) => {
                info!(count = anchors.len(), "loaded memory anchors");
                anchors
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to load memory anchors; starting empty");
                Vec::new()
            }
        };
        Self { anchors, kv }
    }

    /// Append `anchor` and persist. Duplicate positions are allowed.
    pub fn add(&mut self, anchor: MemoryAnchor) {
        debug!(anchor = %anchor.id, memory = %anchor.memory_id, "adding anchor");
        self.anchors.push(anchor);
        self.persist_best_effort();
    }

    /// Remove the anchor with `id` and persist. Absent ids are a no-op.
    pub fn remove(&mut self, id: Uuid) {
        self.anchors.retain(|a| a.id != id);
        self.persist_best_effort();
    }

    /// Remove every anchor owned by `memory_id`, returning how many went.
    pub fn remove_for_memory(&mut self, memory_id: Uuid) -> usize {
        let before = self.anchors.len();
        self.anchors.retain(|a| a.memory_id != memory_id);
        let removed = before - self.anchors.len();
        if removed > 0 {
            self.persist_best_effort();
        }
        removed
    }

    /// Every anchor strictly closer than `max_distance` to `position`.
    ///
    /// An anchor exactly `max_distance` away is excluded.
    pub fn find_nearby(&self, position: Vec3, max_distance: f32) -> Vec<&MemoryAnchor> {
        self.anchors
            .iter()
            .filter(|a| a.position().distance(position) < max_distance)
            .collect()
    }

    /// [`find_nearby`](Self::find_nearby) with [`DEFAULT_NEARBY_DISTANCE`].
    pub fn find_nearby_default(&self, position: Vec3) -> Vec<&MemoryAnchor> {
        self.find_nearby(position, DEFAULT_NEARBY_DISTANCE)
    }

    /// All anchors in insertion order.
    pub fn anchors(&self) -> &[MemoryAnchor] {
        &self.anchors
    }

    pub fn get(&self, id: Uuid) -> Option<&MemoryAnchor> {
        self.anchors.iter().find(|a| a.id == id)
    }

    pub fn for_memory(&self, memory_id: Uuid) -> Vec<&MemoryAnchor> {
        self.anchors
            .iter()
            .filter(|a| a.memory_id == memory_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Write the whole collection to storage.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        save_json(self.kv.as_mut(), ANCHORS_KEY, &self.anchors)
    }

    fn persist_best_effort(&mut self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, count = self.anchors.len(), "failed to persist memory anchors");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
