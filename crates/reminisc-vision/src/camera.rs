//! Generic `Camera` trait and supporting types for the tracked camera feed.

use std::time::Duration;

use reminisc_spatial::Mat4;
use reminisc_types::ReminiscError;

/// Quality of world tracking when a frame was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    /// Pose is reliable.
    Normal,
    /// Pose is available but degraded (fast motion, low light, …).
    Limited,
    /// No pose.
    NotAvailable,
}

/// A raw image frame plus the camera pose it was captured from.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Raw pixel data (e.g. BGRA32).
    pub data: Vec<u8>,
    /// Capture time, relative to the start of the session.
    pub timestamp: Duration,
    /// World pose of the camera.
    pub camera_transform: Mat4,
    pub tracking: TrackingState,
}

impl CameraFrame {
    pub fn is_tracking(&self) -> bool {
        self.tracking == TrackingState::Normal
    }
}

/// A tracked camera.
pub trait Camera: Send {
    /// Stable identifier for this camera, e.g. `"back_wide"`.
    fn id(&self) -> &str;

    /// Capture and return the next available frame.
    ///
    /// # Errors
    ///
    /// Returns [`ReminiscError::PermissionDenied`] when camera access was not
    /// granted and [`ReminiscError::Capture`] when no frame is available.
    fn capture(&mut self) -> Result<CameraFrame, ReminiscError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use reminisc_types::Permission;

    struct MockCamera {
        id: String,
        granted: bool,
    }

    impl Camera for MockCamera {
        fn id(&self) -> &str {
            &self.id
        }

        fn capture(&mut self) -> Result<CameraFrame, ReminiscError> {
            if !self.granted {
                return Err(ReminiscError::PermissionDenied(Permission::Camera));
            }
            Ok(CameraFrame {
                width: 2,
                height: 2,
                data: vec![0u8; 2 * 2 * 4],
                timestamp: Duration::from_millis(16),
                camera_transform: Mat4::identity(),
                tracking: TrackingState::Limited,
            })
        }
    }

    #[test]
    fn mock_camera_capture() {
        let mut cam = MockCamera {
            id: "back_wide".to_string(),
            granted: true,
        };
        assert_eq!(cam.id(), "back_wide");
        let frame = cam.capture().unwrap();
        assert_eq!(frame.data.len(), 16);
        assert!(!frame.is_tracking());
    }

    #[test]
    fn denied_camera_reports_permission() {
        let mut cam = MockCamera {
            id: "back_wide".to_string(),
            granted: false,
        };
        assert!(matches!(
            cam.capture(),
            Err(ReminiscError::PermissionDenied(Permission::Camera))
        ));
    }
}
