//! Frame throttle.
//!
//! Classification is expensive, so only one frame per interval is let
//! through. This is a rate limiter, not a queue: frames arriving inside the
//! window are dropped.

use std::time::Duration;

/// Admits at most one frame per `interval` of frame time.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval: Duration,
    last_processed: Option<Duration>,
}

impl FrameThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_processed: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Decide whether the frame captured at `timestamp` should be processed.
    ///
    /// The first frame is always admitted. A frame is admitted when at least
    /// `interval` has passed since the last admitted frame; admitting it
    /// restarts the window.
    pub fn admit(&mut self, timestamp: Duration) -> bool {
        let due = match self.last_processed {
            None => true,
            Some(last) => timestamp.saturating_sub(last) >= self.interval,
        };
        if due {
            self.last_processed = Some(timestamp);
        }
        due
    }

    /// Forget the last admitted frame.
    pub fn reset(&mut self) {
        self.last_processed = None;
    }
}
