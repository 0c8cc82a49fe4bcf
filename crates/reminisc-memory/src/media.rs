//! Audio and photo payloads referenced by memories.
//!
//! Memories store only a file name; the bytes live in a per-install
//! documents directory. Names are generated as `prefix_<unix-millis>.<ext>`
//! and are never taken from user input, so no further sanitisation is done.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::kv::StoreError;

/// The kinds of payload a memory can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Recording,
    Photo,
}

impl MediaKind {
    pub fn prefix(self) -> &'static str {
        match self {
            MediaKind::Recording => "recording",
            MediaKind::Photo => "photo",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Recording => "m4a",
            MediaKind::Photo => "jpg",
        }
    }
}

/// Generate the file name for a payload created at `at`.
pub fn file_name(kind: MediaKind, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{}",
        kind.prefix(),
        at.timestamp_millis(),
        kind.extension()
    )
}

/// Format a duration in seconds as `m:ss`.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Directory holding every media payload.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    root: PathBuf,
}

impl MediaLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A fresh file name for `kind`, stamped with the current time.
    pub fn new_file_name(&self, kind: MediaKind) -> String {
        file_name(kind, Utc::now())
    }

    /// Absolute path of `name` inside the library.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write `bytes` under `name`, creating the directory on first use.
    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(name);
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), len = bytes.len(), "media written");
        Ok(path)
    }

    /// Read the payload called `name`.
    ///
    /// A missing or unreadable file yields `None`; the caller shows an empty
    /// state.
    pub fn read(&self, name: &str) -> Option<Vec<u8>> {
        let path = self.path_for(name);
        match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "media file missing");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read media file");
                None
            }
        }
    }

    /// Delete the payload called `name`. A missing file is not an error.
    pub fn remove(&self, name: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
