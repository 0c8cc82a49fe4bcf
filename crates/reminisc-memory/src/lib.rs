//! `reminisc-memory` – what the app remembers between launches.
//!
//! Every collection is a JSON blob in a small key-value store backed by
//! SQLite.
//!
//! # Modules
//!
//! - [`kv`] – [`KeyValueStore`][kv::KeyValueStore] with the
//!   [`SqliteKv`][kv::SqliteKv] and [`MemoryKv`][kv::MemoryKv] backends.
//! - [`anchors`] – [`AnchorIndex`][anchors::AnchorIndex]: memory-to-pose
//!   bindings and the strict-radius proximity query used for rediscovery.
//! - [`journal`] – [`MemoryStore`][journal::MemoryStore]: the memories
//!   themselves and their responses.
//! - [`media`] – [`MediaLibrary`][media::MediaLibrary]: audio and photo
//!   payloads referenced by file name.

pub mod anchors;
pub mod journal;
pub mod kv;
pub mod media;

pub use anchors::{AnchorIndex, MemoryAnchor};
pub use journal::MemoryStore;
pub use kv::{KeyValueStore, MemoryKv, SqliteKv, StoreError};
pub use media::{MediaKind, MediaLibrary};
