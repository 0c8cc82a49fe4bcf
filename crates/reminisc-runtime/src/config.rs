//! Configuration Vault – reads/writes `~/.reminisc/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Errors raised while reading or writing the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Persisted user configuration stored in `~/.reminisc/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the database and the media documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Minimum spacing between two classified frames, in milliseconds.
    #[serde(default = "default_detection_interval_ms")]
    pub detection_interval_ms: u64,

    /// Classifier results at or below this confidence are discarded.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// How many classifier results are placed in the scene per frame.
    #[serde(default = "default_max_detections")]
    pub max_detections: usize,

    /// A detection closer than this to an anchor (metres) already has a
    /// memory.
    #[serde(default = "default_has_memory_radius")]
    pub has_memory_radius: f32,

    /// Anchors closer than this to the camera (metres) count as nearby.
    #[serde(default = "default_nearby_radius")]
    pub nearby_radius: f32,

    /// Seed the journal with example memories on first launch.
    #[serde(default = "default_true")]
    pub seed_examples: bool,

    /// Also delete a memory's anchors when the memory is deleted.
    #[serde(default)]
    pub cascade_anchor_delete: bool,
}

fn home_dir() -> String {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string())
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(home_dir()).join(".reminisc").join("data")
}
fn default_detection_interval_ms() -> u64 {
    1000
}
fn default_confidence_threshold() -> f32 {
    0.4
}
fn default_max_detections() -> usize {
    5
}
fn default_has_memory_radius() -> f32 {
    0.3
}
fn default_nearby_radius() -> f32 {
    2.0
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            detection_interval_ms: default_detection_interval_ms(),
            confidence_threshold: default_confidence_threshold(),
            max_detections: default_max_detections(),
            has_memory_radius: default_has_memory_radius(),
            nearby_radius: default_nearby_radius(),
            seed_examples: true,
            cascade_anchor_delete: false,
        }
    }
}

impl Config {
    pub fn detection_interval(&self) -> Duration {
        Duration::from_millis(self.detection_interval_ms)
    }
}

/// Return the path to `~/.reminisc/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(&home_dir())
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".reminisc").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, ConfigError> {
    load_from(&config_path())
}

/// Load the config, falling back to defaults (plus environment overrides)
/// when the file is missing or broken.
pub fn load_or_default() -> Config {
    match load() {
        Ok(Some(cfg)) => cfg,
        Ok(None) => {
            let mut cfg = Config::default();
            apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            warn!(error = %e, "config unreadable; using defaults");
            let mut cfg = Config::default();
            apply_env_overrides(&mut cfg);
            cfg
        }
    }
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: Config = toml::from_str(&raw)?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `REMINISC_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `REMINISC_DATA_DIR` | `data_dir` |
/// | `REMINISC_DETECTION_INTERVAL_MS` | `detection_interval_ms` |
/// | `REMINISC_CONFIDENCE_THRESHOLD` | `confidence_threshold` |
/// | `REMINISC_CASCADE_ANCHOR_DELETE` | `cascade_anchor_delete` |
///
/// Values that fail to parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("REMINISC_DATA_DIR") {
        cfg.data_dir = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("REMINISC_DETECTION_INTERVAL_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.detection_interval_ms = ms;
    }
    if let Ok(v) = std::env::var("REMINISC_CONFIDENCE_THRESHOLD")
        && let Ok(threshold) = v.parse::<f32>()
    {
        cfg.confidence_threshold = threshold;
    }
    if let Ok(v) = std::env::var("REMINISC_CASCADE_ANCHOR_DELETE")
        && let Ok(flag) = v.parse::<bool>()
    {
        cfg.cascade_anchor_delete = flag;
    }
}

/// Save the config to disk, creating `~/.reminisc/` if necessary.
pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let write_err = |source: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(write_err)?;
        }
    }
    let raw = toml::to_string_pretty(cfg)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(write_err)?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(write_err)?;
    Ok(())
}
