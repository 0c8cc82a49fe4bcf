//! `reminisc-runtime` – the app's view-state logic, wired to its services.
//!
//! # Modules
//!
//! - [`config`] – [`Config`][config::Config]: `~/.reminisc/config.toml`
//!   with `REMINISC_*` environment overrides.
//! - [`services`] – [`AppServices`][services::AppServices]: the anchor
//!   index, the journal and the media library, built once at startup and
//!   passed around explicitly.
//! - [`experience`] – [`MemoryExperience`][experience::MemoryExperience]:
//!   throttled classification of camera frames, placement of the detected
//!   objects in the scene and matching them against stored anchors.
//! - [`scanning`] – [`ScanSession`][scanning::ScanSession]: tap, pan and
//!   pinch handling around the bounding-box editor, ending in an object
//!   scan.
//! - [`recorder`] – [`ProgressTicker`][recorder::ProgressTicker] and
//!   [`Recorder`][recorder::Recorder]: elapsed-time reporting for voice
//!   recordings.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: the global
//!   `tracing` subscriber.
//!
//! Everything except the recorder is synchronous and mutated through
//! `&mut self` from a single context.

pub mod config;
pub mod experience;
pub mod recorder;
pub mod scanning;
pub mod services;
pub mod telemetry;

pub use config::{Config, ConfigError};
pub use experience::{DetectedObject, DetectionSettings, FrameReport, MemoryExperience};
pub use recorder::{ProgressTicker, Recorder, Recording};
pub use scanning::ScanSession;
pub use services::AppServices;
