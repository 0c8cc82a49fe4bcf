//! Application services.
//!
//! One [`AppServices`] value is built at startup and handed to whichever
//! component needs the anchor index, the journal or the media library. There
//! are no process-wide singletons.

use std::fs;

use reminisc_memory::{AnchorIndex, MediaLibrary, MemoryStore, MemoryKv, SqliteKv, StoreError};
use reminisc_types::Memory;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;

/// File name of the key-value database inside the data directory.
pub const DATABASE_FILE: &str = "reminisc.db";

/// Directory, inside the data directory, holding audio and photo files.
pub const DOCUMENTS_DIR: &str = "documents";

/// Everything the app keeps between launches.
pub struct AppServices {
    pub anchors: AnchorIndex,
    pub memories: MemoryStore,
    pub media: MediaLibrary,
    config: Config,
}

impl AppServices {
    /// Open the on-disk stores under `config.data_dir`.
    pub fn open(config: Config) -> Result<Self, StoreError> {
        fs::create_dir_all(&config.data_dir)?;
        let db = config.data_dir.join(DATABASE_FILE);
        let anchors = AnchorIndex::load(Box::new(SqliteKv::open(&db)?));
        let memories = MemoryStore::load(Box::new(SqliteKv::open(&db)?), config.seed_examples);
        let media = MediaLibrary::new(config.data_dir.join(DOCUMENTS_DIR));
        info!(
            data_dir = %config.data_dir.display(),
            anchors = anchors.len(),
            memories = memories.len(),
            "services ready"
        );
        Ok(Self {
            anchors,
            memories,
            media,
            config,
        })
    }

    /// Services backed by process memory only. Media still goes to
    /// `config.data_dir`.
    pub fn in_memory(config: Config) -> Self {
        Self {
            anchors: AnchorIndex::load(Box::new(MemoryKv::new())),
            memories: MemoryStore::load(Box::new(MemoryKv::new()), config.seed_examples),
            media: MediaLibrary::new(config.data_dir.join(DOCUMENTS_DIR)),
            config,
        }
    }

    /// [`open`](Self::open), degrading to [`in_memory`](Self::in_memory)
    /// when the database cannot be opened.
    pub fn open_or_in_memory(config: Config) -> Self {
        match Self::open(config.clone()) {
            Ok(services) => services,
            Err(e) => {
                warn!(error = %e, "persistent storage unavailable; nothing will be saved");
                Self::in_memory(config)
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Delete a memory.
    ///
    /// Its anchors are removed too only when `cascade_anchor_delete` is set;
    /// otherwise they stay in the index.
    pub fn delete_memory(&mut self, id: Uuid) -> Option<Memory> {
        let removed = self.memories.delete(id)?;
        if self.config.cascade_anchor_delete {
            let anchors = self.anchors.remove_for_memory(id);
            info!(memory = %id, anchors, "deleted memory with its anchors");
        } else if !self.anchors.for_memory(id).is_empty() {
            warn!(memory = %id, "deleted memory still has anchors");
        }
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reminisc_memory::MemoryAnchor;
    use reminisc_spatial::Mat4;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            data_dir: dir.to_path_buf(),
            seed_examples: false,
            ..Config::default()
        }
    }

    fn with_anchored_memory(services: &mut AppServices) -> Uuid {
        let memory = Memory::new("Mug", "Mug", "☕️", "", 0.0, "Me");
        let id = memory.id;
        services.memories.add(memory);
        services
            .anchors
            .add(MemoryAnchor::new(id, Mat4::identity(), "Mug"));
        id
    }

    #[test]
    fn delete_keeps_anchors_by_default() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut services = AppServices::in_memory(config_in(dir.path()));
        let id = with_anchored_memory(&mut services);
        assert!(services.delete_memory(id).is_some());
        assert!(services.memories.get(id).is_none());
        assert_eq!(services.anchors.for_memory(id).len(), 1);
    }

    #[test]
    fn delete_cascades_when_enabled() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut cfg = config_in(dir.path());
        cfg.cascade_anchor_delete = true;
        let mut services = AppServices::in_memory(cfg);
        let id = with_anchored_memory(&mut services);
        services.delete_memory(id);
        assert!(services.anchors.is_empty());
    }

    #[test]
    fn delete_unknown_memory_is_none() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut services = AppServices::in_memory(config_in(dir.path()));
        assert!(services.delete_memory(Uuid::new_v4()).is_none());
    }

    #[test]
    fn open_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let id = {
            let mut services = AppServices::open(config_in(dir.path())).unwrap();
            with_anchored_memory(&mut services)
        };
        let services = AppServices::open(config_in(dir.path())).unwrap();
        assert!(services.memories.get(id).is_some());
        assert_eq!(services.anchors.for_memory(id).len(), 1);
        assert!(dir.path().join(DATABASE_FILE).exists());
    }

    #[test]
    fn open_seeds_examples_on_first_launch() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let cfg = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let services = AppServices::open_or_in_memory(cfg);
        assert_eq!(services.memories.len(), 3);
        assert!(services.anchors.is_empty());
    }
}
