//! [`ScanSession`] – gesture handling for the object-scanning screen.
//!
//! Gestures arrive already resolved to world space: a tap carries the
//! surface hit under the finger (if any), a pan carries the world point
//! under the finger. The session forwards them to a [`BoxEditor`] and, on
//! commit, hands the finished region to an [`ObjectScanner`].

use reminisc_spatial::{BoxEditor, EditorState, HandleIndex, Mat4, ScanRegion, Vec3};
use reminisc_types::ReminiscError;
use reminisc_vision::ObjectScanner;
use tracing::{info, warn};

/// How close (metres) a pan must start to a handle to grab it.
pub const DEFAULT_PICK_RADIUS: f32 = 0.05;

pub struct ScanSession<S: ObjectScanner> {
    editor: BoxEditor,
    scanner: S,
    pick_radius: f32,
}

impl<S: ObjectScanner> ScanSession<S> {
    pub fn new(scanner: S) -> Self {
        Self::with_pick_radius(scanner, DEFAULT_PICK_RADIUS)
    }

    pub fn with_pick_radius(scanner: S, pick_radius: f32) -> Self {
        Self {
            editor: BoxEditor::new(),
            scanner,
            pick_radius,
        }
    }

    pub fn editor(&self) -> &BoxEditor {
        &self.editor
    }

    pub fn state(&self) -> EditorState {
        self.editor.state()
    }

    /// A tap. `hit` is the surface pose under the finger; taps on empty
    /// space do nothing.
    pub fn tap(&mut self, hit: Option<Mat4>) -> bool {
        match hit {
            Some(pose) => self.editor.place(pose),
            None => false,
        }
    }

    /// A pan started at `point`. Grabs the handle under the finger, if any.
    pub fn pan_began(&mut self, point: Option<Vec3>) -> Option<HandleIndex> {
        self.editor.begin_drag_at(point?, self.pick_radius)
    }

    /// The pan moved. Frames where the finger is over nothing are skipped.
    pub fn pan_changed(&mut self, point: Option<Vec3>) -> bool {
        match point {
            Some(p) => self.editor.drag_to(p),
            None => false,
        }
    }

    pub fn pan_ended(&mut self) {
        self.editor.end_drag();
    }

    /// A pinch update. `factor` is the scale change since the previous
    /// update, not the gesture's cumulative scale; hosts reset the gesture
    /// scale to 1 after forwarding it.
    pub fn pinch(&mut self, factor: f32) -> bool {
        self.editor.scale(factor)
    }

    /// Scan the boxed object.
    ///
    /// The box is finalized only when the scanner succeeds; after a failure
    /// the user can adjust the box and try again.
    pub fn commit(&mut self) -> Result<S::Object, ReminiscError> {
        let region = self.pending_region()?;
        match self.scanner.scan(&region) {
            Ok(object) => {
                self.editor.finalize();
                info!(extent = ?region.extent, "object scanned");
                Ok(object)
            }
            Err(e) => {
                warn!(error = %e, "object scan failed");
                Err(e)
            }
        }
    }

    fn pending_region(&self) -> Result<ScanRegion, ReminiscError> {
        match self.editor.state() {
            EditorState::Placed | EditorState::Resizing { .. } => self
                .editor
                .bounding_box()
                .map(|b| b.region())
                .ok_or_else(|| ReminiscError::Scan("place a bounding box first".to_string())),
            EditorState::Unplaced => {
                Err(ReminiscError::Scan("place a bounding box first".to_string()))
            }
            EditorState::Finalized => Err(ReminiscError::Scan("object already scanned".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reminisc_spatial::bounding_box::MIN_SIDE;

    /// Scanner that records regions and fails while `fail` is set.
    #[derive(Default)]
    struct RecordingScanner {
        regions: Vec<ScanRegion>,
        fail: bool,
    }

    impl ObjectScanner for RecordingScanner {
        type Object = usize;

        fn scan(&mut self, region: &ScanRegion) -> Result<usize, ReminiscError> {
            if self.fail {
                return Err(ReminiscError::Scan("not enough features".to_string()));
            }
            self.regions.push(*region);
            Ok(self.regions.len())
        }
    }

    fn placed_session() -> ScanSession<RecordingScanner> {
        let mut s = ScanSession::new(RecordingScanner::default());
        assert!(s.tap(Some(Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0)))));
        s
    }

    #[test]
    fn tap_on_nothing_does_not_place() {
        let mut s = ScanSession::new(RecordingScanner::default());
        assert!(!s.tap(None));
        assert_eq!(s.state(), EditorState::Unplaced);
    }

    #[test]
    fn second_tap_is_ignored() {
        let mut s = placed_session();
        assert!(!s.tap(Some(Mat4::identity())));
        let center = s.editor().bounding_box().unwrap().center();
        assert!((center.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn pan_drags_grabbed_handle() {
        let mut s = placed_session();
        let corner = s
            .editor()
            .bounding_box()
            .unwrap()
            .handle_position(HandleIndex::new(7).unwrap());
        let handle = s.pan_began(Some(corner.add(Vec3::splat(0.01)))).unwrap();
        assert_eq!(handle.index(), 7);

        assert!(!s.pan_changed(None));
        assert!(s.pan_changed(Some(Vec3::new(0.15, 0.15, -0.85))));
        s.pan_ended();
        assert_eq!(s.state(), EditorState::Placed);

        let extent = s.editor().bounding_box().unwrap().extent();
        assert!((extent.x - 0.2).abs() < 1e-5);
        assert!((extent.z - 0.2).abs() < 1e-5);
    }

    #[test]
    fn pan_away_from_handles_grabs_nothing() {
        let mut s = placed_session();
        assert!(s.pan_began(Some(Vec3::new(5.0, 5.0, 5.0))).is_none());
        assert!(s.pan_began(None).is_none());
        assert!(!s.pan_changed(Some(Vec3::zero())));
    }

    #[test]
    fn pinch_is_floored() {
        let mut s = placed_session();
        assert!(s.pinch(0.0001));
        let extent = s.editor().bounding_box().unwrap().extent();
        assert!((extent.y - MIN_SIDE).abs() < 1e-6);
    }

    #[test]
    fn successive_pinches_compose() {
        let mut s = placed_session();
        assert!(s.pinch(1.5));
        assert!(s.pinch(1.5));
        let extent = s.editor().bounding_box().unwrap().extent();
        assert!((extent.x - 0.225).abs() < 1e-6);
    }

    #[test]
    fn commit_without_box_fails() {
        let mut s = ScanSession::new(RecordingScanner::default());
        assert!(matches!(s.commit(), Err(ReminiscError::Scan(_))));
        assert!(s.scanner.regions.is_empty());
    }

    #[test]
    fn failed_scan_keeps_box_editable() {
        let mut s = placed_session();
        s.scanner.fail = true;
        assert!(s.commit().is_err());
        assert_eq!(s.state(), EditorState::Placed);
        assert!(s.pinch(2.0));

        s.scanner.fail = false;
        assert_eq!(s.commit().unwrap(), 1);
        assert_eq!(s.state(), EditorState::Finalized);
        let extent = s.scanner.regions[0].extent;
        assert!((extent.x - 0.2).abs() < 1e-6);
    }

    #[test]
    fn commit_twice_is_rejected() {
        let mut s = placed_session();
        s.commit().unwrap();
        assert!(s.commit().is_err());
        assert!(!s.pinch(2.0));
        assert_eq!(s.scanner.regions.len(), 1);
    }
}
