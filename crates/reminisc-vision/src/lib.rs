//! `reminisc-vision` – the camera side of rediscovery.
//!
//! Wraps the platform capture and classification services behind small
//! traits so the matching logic can be driven by test doubles.
//!
//! # Modules
//!
//! - [`camera`] – [`Camera`][camera::Camera] and the tracked
//!   [`CameraFrame`][camera::CameraFrame].
//! - [`oracle`] – [`LabelingOracle`][oracle::LabelingOracle], confidence
//!   filtering and label clean-up.
//! - [`throttle`] – [`FrameThrottle`][throttle::FrameThrottle]: drops frames
//!   that arrive before the detection interval has elapsed.
//! - [`scanner`] – [`ObjectScanner`][scanner::ObjectScanner]: consumes the
//!   region of a finished bounding box.

pub mod camera;
pub mod oracle;
pub mod scanner;
pub mod throttle;

pub use camera::{Camera, CameraFrame, TrackingState};
pub use oracle::{Classification, LabelingOracle};
pub use scanner::ObjectScanner;
pub use throttle::FrameThrottle;
