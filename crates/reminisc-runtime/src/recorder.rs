//! Recording progress.
//!
//! [`ProgressTicker`] accumulates elapsed time on a fixed tick and publishes
//! it over a `tokio::sync::watch` channel so a UI can show `0:07` while the
//! user speaks. [`Recorder`] pairs a ticker with the media file the audio
//! will be stored under.
//!
//! Audio capture itself belongs to the platform; the finished bytes are
//! handed to [`Recorder::finish`].

use std::time::Duration;

use reminisc_memory::media::format_duration;
use reminisc_memory::{MediaKind, MediaLibrary, StoreError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Default ticker resolution.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

// ─────────────────────────────────────────────────────────────────────────────
// ProgressTicker
// ─────────────────────────────────────────────────────────────────────────────

/// A repeating timer publishing the elapsed time.
///
/// Must be started inside a tokio runtime. Dropping the ticker cancels it.
pub struct ProgressTicker {
    task: JoinHandle<()>,
    elapsed: watch::Receiver<Duration>,
}

impl ProgressTicker {
    pub fn start(tick: Duration) -> Self {
        let (tx, rx) = watch::channel(Duration::ZERO);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // The first tick completes immediately.
            interval.tick().await;
            let mut elapsed = Duration::ZERO;
            loop {
                interval.tick().await;
                elapsed += tick;
                if tx.send(elapsed).is_err() {
                    break;
                }
            }
        });
        Self { task, elapsed: rx }
    }

    pub fn elapsed(&self) -> Duration {
        *self.elapsed.borrow()
    }

    /// A receiver that sees every published value.
    pub fn subscribe(&self) -> watch::Receiver<Duration> {
        self.elapsed.clone()
    }

    /// Cancel the timer immediately and return the elapsed time.
    pub fn stop(self) -> Duration {
        self.task.abort();
        self.elapsed()
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recorder
// ─────────────────────────────────────────────────────────────────────────────

/// A finished recording, ready to be attached to a memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub file_name: String,
    /// Seconds.
    pub duration: f64,
}

/// An in-progress voice recording.
pub struct Recorder {
    file_name: String,
    ticker: ProgressTicker,
}

impl Recorder {
    /// Start timing a recording that will be stored in `library`.
    pub fn start(library: &MediaLibrary, tick: Duration) -> Self {
        let file_name = library.new_file_name(MediaKind::Recording);
        debug!(file = %file_name, "recording started");
        Self {
            file_name,
            ticker: ProgressTicker::start(tick),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn elapsed(&self) -> Duration {
        self.ticker.elapsed()
    }

    /// Elapsed time as `m:ss`.
    pub fn elapsed_label(&self) -> String {
        format_duration(self.elapsed().as_secs_f64())
    }

    pub fn subscribe(&self) -> watch::Receiver<Duration> {
        self.ticker.subscribe()
    }

    /// Stop timing and store `audio` in `library`.
    pub fn finish(self, library: &MediaLibrary, audio: &[u8]) -> Result<Recording, StoreError> {
        let duration = self.ticker.stop().as_secs_f64();
        library.write(&self.file_name, audio)?;
        info!(file = %self.file_name, duration, "recording saved");
        Ok(Recording {
            file_name: self.file_name,
            duration,
        })
    }

    /// Stop timing and discard the recording.
    pub fn cancel(self) {
        let elapsed = self.ticker.stop();
        debug!(file = %self.file_name, ?elapsed, "recording cancelled");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
