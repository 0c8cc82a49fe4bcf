//! [`MemoryExperience`] – rediscovering memories through the camera.
//!
//! Each admitted frame goes through the same steps:
//!
//! 1. **Throttle** – frames closer than the detection interval to the last
//!    processed one are dropped. Tracking status is still recorded.
//! 2. **Classify** – the [`LabelingOracle`] ranks labels for the frame;
//!    weak results are discarded and at most `max_detections` are kept.
//! 3. **Place** – rank `i` is placed `0.5 + 0.2·i` metres in front of the
//!    camera, fanned out by `0.3·(i − 2)` radians, so the labels do not
//!    overlap.
//! 4. **Match** – every placed detection is checked against the
//!    [`AnchorIndex`] with the tight `has_memory_radius`; the camera itself
//!    is checked with the wider `nearby_radius`.
//!
//! A failed classification keeps the previous detections; the next admitted
//! frame simply tries again.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use reminisc_memory::{AnchorIndex, MemoryKv};
//! use reminisc_runtime::experience::{DetectionSettings, MemoryExperience};
//! use reminisc_spatial::Mat4;
//! use reminisc_types::ReminiscError;
//! use reminisc_vision::{CameraFrame, Classification, LabelingOracle, TrackingState};
//!
//! struct AlwaysMug;
//! impl LabelingOracle for AlwaysMug {
//!     fn classify(&mut self, _: &CameraFrame) -> Result<Vec<Classification>, ReminiscError> {
//!         Ok(vec![Classification::new("n03063599_coffee_mug", 0.9)])
//!     }
//! }
//!
//! let anchors = AnchorIndex::load(Box::new(MemoryKv::new()));
//! let mut experience = MemoryExperience::new(AlwaysMug, DetectionSettings::default());
//! let frame = CameraFrame {
//!     width: 1, height: 1, data: vec![0; 4],
//!     timestamp: Duration::ZERO,
//!     camera_transform: Mat4::identity(),
//!     tracking: TrackingState::Normal,
//! };
//! let report = experience.process_frame(&frame, &anchors).unwrap();
//! assert_eq!(report.detected[0].label, "Mug");
//! assert!(!report.detected[0].has_memory);
//! ```

use std::time::Duration;

use reminisc_memory::{AnchorIndex, MemoryAnchor};
use reminisc_spatial::{Mat4, Vec3};
use reminisc_types::{Memory, Permission, ReminiscError};
use reminisc_vision::oracle::{clean_label, confident, emoji_for_label};
use reminisc_vision::{Camera, CameraFrame, FrameThrottle, LabelingOracle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::services::AppServices;

/// Distance of the first-ranked detection in front of the camera, metres.
const BASE_DISTANCE: f32 = 0.5;
/// Extra distance per rank, metres.
const DISTANCE_STEP: f32 = 0.2;
/// Angular spread per rank, radians.
const ANGLE_STEP: f32 = 0.3;
/// Rank that sits straight ahead.
const CENTER_RANK: f32 = 2.0;

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Tunables for [`MemoryExperience`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSettings {
    pub interval: Duration,
    pub confidence_threshold: f32,
    pub max_detections: usize,
    pub has_memory_radius: f32,
    pub nearby_radius: f32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for DetectionSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            interval: cfg.detection_interval(),
            confidence_threshold: cfg.confidence_threshold,
            max_detections: cfg.max_detections,
            has_memory_radius: cfg.has_memory_radius,
            nearby_radius: cfg.nearby_radius,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Detection output
// ─────────────────────────────────────────────────────────────────────────────

/// A classified object placed in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObject {
    pub id: Uuid,
    pub label: String,
    pub emoji: &'static str,
    pub confidence: f32,
    /// World pose of the placed label.
    pub transform: Mat4,
    /// An anchor lies within `has_memory_radius` of this object.
    pub has_memory: bool,
}

impl DetectedObject {
    pub fn position(&self) -> Vec3 {
        self.transform.translation()
    }
}

/// What one processed frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Current detections (the previous ones if classification failed).
    pub detected: Vec<DetectedObject>,
    /// `false` when the oracle failed on this frame.
    pub classified: bool,
    /// Memories anchored within `nearby_radius` of the camera.
    pub nearby_memories: Vec<Uuid>,
}

/// Camera-relative pose of the detection ranked `rank`.
pub fn detection_offset(rank: usize) -> Mat4 {
    let distance = BASE_DISTANCE + rank as f32 * DISTANCE_STEP;
    let angle = (rank as f32 - CENTER_RANK) * ANGLE_STEP;
    Mat4::from_translation(Vec3::new(angle.sin() * distance, 0.0, -distance))
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryExperience
// ─────────────────────────────────────────────────────────────────────────────

/// State behind the "point your camera at things" screen.
pub struct MemoryExperience<O: LabelingOracle> {
    oracle: O,
    settings: DetectionSettings,
    throttle: FrameThrottle,
    is_tracking: bool,
    /// Set once the camera reports that access was denied.
    camera_denied: bool,
    detected: Vec<DetectedObject>,
    selected: Option<DetectedObject>,
    nearby_memories: Vec<Uuid>,
}

impl<O: LabelingOracle> MemoryExperience<O> {
    pub fn new(oracle: O, settings: DetectionSettings) -> Self {
        Self {
            oracle,
            throttle: FrameThrottle::new(settings.interval),
            settings,
            is_tracking: false,
            camera_denied: false,
            detected: Vec::new(),
            selected: None,
            nearby_memories: Vec::new(),
        }
    }

    pub fn settings(&self) -> &DetectionSettings {
        &self.settings
    }

    /// Whether the last frame had normal tracking.
    pub fn is_tracking(&self) -> bool {
        self.is_tracking
    }

    /// `false` once camera access was denied; the screen shows the feature
    /// as unavailable.
    pub fn camera_available(&self) -> bool {
        !self.camera_denied
    }

    pub fn detected(&self) -> &[DetectedObject] {
        &self.detected
    }

    pub fn selected(&self) -> Option<&DetectedObject> {
        self.selected.as_ref()
    }

    /// Number of memories anchored near the camera at the last processed
    /// frame.
    pub fn memories_nearby(&self) -> usize {
        self.nearby_memories.len()
    }

    /// Capture a frame from `camera` and process it.
    ///
    /// Capture failures are logged and yield `None`. A permission denial
    /// also marks the camera unavailable; later polls do not touch the
    /// camera again.
    pub fn poll<C: Camera + ?Sized>(
        &mut self,
        camera: &mut C,
        anchors: &AnchorIndex,
    ) -> Option<FrameReport> {
        if self.camera_denied {
            return None;
        }
        match camera.capture() {
            Ok(frame) => self.process_frame(&frame, anchors),
            Err(ReminiscError::PermissionDenied(permission)) => {
                warn!(camera = camera.id(), ?permission, "camera access denied; detection unavailable");
                if permission == Permission::Camera {
                    self.camera_denied = true;
                    self.is_tracking = false;
                }
                None
            }
            Err(e) => {
                warn!(camera = camera.id(), error = %e, "frame capture failed");
                None
            }
        }
    }

    /// Feed one camera frame. Returns `None` when the frame was throttled.
    pub fn process_frame(
        &mut self,
        frame: &CameraFrame,
        anchors: &AnchorIndex,
    ) -> Option<FrameReport> {
        self.is_tracking = frame.is_tracking();
        if !self.throttle.admit(frame.timestamp) {
            return None;
        }

        let classified = match self.oracle.classify(frame) {
            Ok(results) => {
                self.detected = self.place(results, frame.camera_transform, anchors);
                true
            }
            Err(e) => {
                warn!(error = %e, "classification failed; keeping previous detections");
                false
            }
        };

        let camera = frame.camera_transform.translation();
        self.nearby_memories = anchors
            .find_nearby(camera, self.settings.nearby_radius)
            .into_iter()
            .map(|a| a.memory_id)
            .collect();

        debug!(
            detected = self.detected.len(),
            nearby = self.nearby_memories.len(),
            classified,
            "frame processed"
        );

        Some(FrameReport {
            detected: self.detected.clone(),
            classified,
            nearby_memories: self.nearby_memories.clone(),
        })
    }

    fn place(
        &self,
        results: Vec<reminisc_vision::Classification>,
        camera: Mat4,
        anchors: &AnchorIndex,
    ) -> Vec<DetectedObject> {
        confident(
            results,
            self.settings.confidence_threshold,
            self.settings.max_detections,
        )
        .into_iter()
        .enumerate()
        .map(|(rank, c)| {
            let transform = camera.mul(detection_offset(rank));
            let label = clean_label(&c.label);
            DetectedObject {
                id: Uuid::new_v4(),
                emoji: emoji_for_label(&label),
                label,
                confidence: c.confidence,
                has_memory: self.has_memory_at(transform.translation(), anchors),
                transform,
            }
        })
        .collect()
    }

    /// Whether an anchor lies within `has_memory_radius` of `position`.
    pub fn has_memory_at(&self, position: Vec3, anchors: &AnchorIndex) -> bool {
        !anchors
            .find_nearby(position, self.settings.has_memory_radius)
            .is_empty()
    }

    /// Select one of the current detections by id.
    pub fn select(&mut self, id: Uuid) -> Option<&DetectedObject> {
        self.selected = self.detected.iter().find(|d| d.id == id).cloned();
        self.selected.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Pin `memory` to the selected detection.
    ///
    /// Adds the memory to the journal and an anchor at the detection's pose
    /// to the index, linking the two. Returns the new anchor's id, or `None`
    /// when nothing is selected.
    pub fn create_memory_for_selected(
        &mut self,
        mut memory: Memory,
        services: &mut AppServices,
    ) -> Option<Uuid> {
        let object = self.selected.take()?;
        let anchor = MemoryAnchor::new(memory.id, object.transform, object.label.clone());
        let anchor_id = anchor.id;

        memory.anchor_identifier = Some(anchor_id);
        if memory.object_name.is_empty() {
            memory.object_name = object.label.clone();
        }
        if memory.object_emoji.is_empty() {
            memory.object_emoji = object.emoji.to_string();
        }

        info!(memory = %memory.id, anchor = %anchor_id, label = %object.label, "memory anchored");
        services.memories.add(memory);
        services.anchors.add(anchor);

        if let Some(d) = self.detected.iter_mut().find(|d| d.id == object.id) {
            d.has_memory = true;
        }
        Some(anchor_id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use reminisc_memory::MemoryKv;
    use reminisc_vision::{Classification, TrackingState};
    use std::collections::VecDeque;

    /// Oracle that replays scripted answers and counts calls.
    struct ScriptedOracle {
        answers: VecDeque<Result<Vec<Classification>, ReminiscError>>,
        calls: usize,
    }

    impl ScriptedOracle {
        fn new(answers: Vec<Result<Vec<Classification>, ReminiscError>>) -> Self {
            Self {
                answers: answers.into(),
                calls: 0,
            }
        }
    }

    impl LabelingOracle for ScriptedOracle {
        fn classify(&mut self, _: &CameraFrame) -> Result<Vec<Classification>, ReminiscError> {
            self.calls += 1;
            self.answers.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn frame_at(ms: u64, camera: Mat4) -> CameraFrame {
        CameraFrame {
            width: 1,
            height: 1,
            data: vec![0; 4],
            timestamp: Duration::from_millis(ms),
            camera_transform: camera,
            tracking: TrackingState::Normal,
        }
    }

    /// Camera that replays scripted captures.
    struct ScriptedCamera {
        captures: VecDeque<Result<CameraFrame, ReminiscError>>,
        calls: usize,
    }

    impl Camera for ScriptedCamera {
        fn id(&self) -> &str {
            "back_wide"
        }

        fn capture(&mut self) -> Result<CameraFrame, ReminiscError> {
            self.calls += 1;
            self.captures.pop_front().unwrap_or_else(|| {
                Err(ReminiscError::Capture {
                    device: "back_wide".to_string(),
                    details: "no frame".to_string(),
                })
            })
        }
    }

    fn labels(raw: &[(&str, f32)]) -> Result<Vec<Classification>, ReminiscError> {
        Ok(raw.iter().map(|(l, c)| Classification::new(*l, *c)).collect())
    }

    fn empty_index() -> AnchorIndex {
        AnchorIndex::load(Box::new(MemoryKv::new()))
    }

    fn services() -> (tempfile::TempDir, AppServices) {
        let dir = tempfile::tempdir().expect("tmp dir");
        let cfg = Config {
            data_dir: dir.path().to_path_buf(),
            seed_examples: false,
            ..Config::default()
        };
        (dir, AppServices::in_memory(cfg))
    }

    #[test]
    fn offsets_spread_by_rank() {
        let first = detection_offset(0).translation();
        assert!((first.z + 0.5).abs() < 1e-6);
        assert!((first.x - (-0.6f32).sin() * 0.5).abs() < 1e-6);

        let center = detection_offset(2).translation();
        assert!(center.x.abs() < 1e-6);
        assert!((center.z + 0.9).abs() < 1e-6);

        let last = detection_offset(4).translation();
        assert!((last.z + 1.3).abs() < 1e-6);
        assert!(last.x > 0.0);
    }

    #[test]
    fn throttled_frames_skip_the_oracle() {
        let oracle = ScriptedOracle::new(vec![]);
        let mut exp = MemoryExperience::new(oracle, DetectionSettings::default());
        let anchors = empty_index();
        assert!(exp.process_frame(&frame_at(0, Mat4::identity()), &anchors).is_some());
        assert!(exp.process_frame(&frame_at(500, Mat4::identity()), &anchors).is_none());
        assert!(exp.process_frame(&frame_at(1000, Mat4::identity()), &anchors).is_some());
        assert_eq!(exp.oracle.calls, 2);
    }

    #[test]
    fn tracking_is_recorded_even_when_throttled() {
        let mut exp = MemoryExperience::new(ScriptedOracle::new(vec![]), DetectionSettings::default());
        let anchors = empty_index();
        exp.process_frame(&frame_at(0, Mat4::identity()), &anchors);
        assert!(exp.is_tracking());
        let mut limited = frame_at(10, Mat4::identity());
        limited.tracking = TrackingState::Limited;
        assert!(exp.process_frame(&limited, &anchors).is_none());
        assert!(!exp.is_tracking());
    }

    #[test]
    fn weak_results_are_dropped_and_top_five_kept() {
        let oracle = ScriptedOracle::new(vec![labels(&[
            ("n03063599_coffee_mug", 0.95),
            ("rocking_chair, rocker", 0.8),
            ("table_lamp", 0.7),
            ("n02769748_backpack", 0.6),
            ("notebook", 0.5),
            ("laptop", 0.45),
            ("vase", 0.4),
        ])]);
        let mut exp = MemoryExperience::new(oracle, DetectionSettings::default());
        let report = exp
            .process_frame(&frame_at(0, Mat4::identity()), &empty_index())
            .unwrap();
        let got: Vec<(&str, &str)> = report
            .detected
            .iter()
            .map(|d| (d.label.as_str(), d.emoji))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Mug", "☕️"),
                ("Chair", "🪑"),
                ("Lamp", "💡"),
                ("Backpack", "🎒"),
                ("Notebook", "📓"),
            ]
        );
    }

    #[test]
    fn detections_follow_camera_pose() {
        let oracle = ScriptedOracle::new(vec![labels(&[("mug", 0.9)])]);
        let mut exp = MemoryExperience::new(oracle, DetectionSettings::default());
        let camera = Mat4::from_translation(Vec3::new(1.0, 1.5, 0.0));
        let report = exp.process_frame(&frame_at(0, camera), &empty_index()).unwrap();
        let expected = Vec3::new(1.0 + (-0.6f32).sin() * 0.5, 1.5, -0.5);
        assert!(report.detected[0].position().distance(expected) < 1e-5);
    }

    #[test]
    fn has_memory_uses_tight_radius() {
        let mut anchors = empty_index();
        let camera = Mat4::identity();
        let first = camera.mul(detection_offset(0)).translation();
        // 0.25 m from the first detection: inside 0.3.
        anchors.add(MemoryAnchor::new(
            Uuid::new_v4(),
            Mat4::from_translation(first.add(Vec3::new(0.0, 0.25, 0.0))),
            "Mug",
        ));
        let oracle = ScriptedOracle::new(vec![labels(&[("mug", 0.9), ("lamp", 0.8)])]);
        let mut exp = MemoryExperience::new(oracle, DetectionSettings::default());
        let report = exp.process_frame(&frame_at(0, camera), &anchors).unwrap();
        assert!(report.detected[0].has_memory);
        assert!(!report.detected[1].has_memory);
    }

    #[test]
    fn nearby_memories_use_wide_radius_around_camera() {
        let mut anchors = empty_index();
        let near = Uuid::new_v4();
        let far = Uuid::new_v4();
        anchors.add(MemoryAnchor::new(
            near,
            Mat4::from_translation(Vec3::new(0.0, 0.0, -1.9)),
            "Chair",
        ));
        anchors.add(MemoryAnchor::new(
            far,
            Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0)),
            "Clock",
        ));
        let mut exp = MemoryExperience::new(ScriptedOracle::new(vec![]), DetectionSettings::default());
        let report = exp.process_frame(&frame_at(0, Mat4::identity()), &anchors).unwrap();
        assert_eq!(report.nearby_memories, vec![near]);
        assert_eq!(exp.memories_nearby(), 1);
    }

    #[test]
    fn oracle_failure_keeps_previous_detections() {
        let oracle = ScriptedOracle::new(vec![
            labels(&[("mug", 0.9)]),
            Err(ReminiscError::Oracle("model unavailable".to_string())),
        ]);
        let mut exp = MemoryExperience::new(oracle, DetectionSettings::default());
        let anchors = empty_index();
        let first = exp.process_frame(&frame_at(0, Mat4::identity()), &anchors).unwrap();
        let second = exp.process_frame(&frame_at(1000, Mat4::identity()), &anchors).unwrap();
        assert!(first.classified);
        assert!(!second.classified);
        assert_eq!(second.detected, first.detected);
    }

    #[test]
    fn poll_processes_captured_frames() {
        let mut camera = ScriptedCamera {
            captures: vec![Ok(frame_at(0, Mat4::identity()))].into(),
            calls: 0,
        };
        let oracle = ScriptedOracle::new(vec![labels(&[("mug", 0.9)])]);
        let mut exp = MemoryExperience::new(oracle, DetectionSettings::default());
        let anchors = empty_index();

        let report = exp.poll(&mut camera, &anchors).unwrap();
        assert_eq!(report.detected[0].label, "Mug");

        // Capture failure: nothing processed, camera still usable.
        assert!(exp.poll(&mut camera, &anchors).is_none());
        assert!(exp.camera_available());
        assert_eq!(exp.detected().len(), 1);
    }

    #[test]
    fn denied_camera_disables_detection() {
        let mut camera = ScriptedCamera {
            captures: vec![Err(ReminiscError::PermissionDenied(Permission::Camera))].into(),
            calls: 0,
        };
        let mut exp = MemoryExperience::new(ScriptedOracle::new(vec![]), DetectionSettings::default());
        let anchors = empty_index();

        assert!(exp.poll(&mut camera, &anchors).is_none());
        assert!(!exp.camera_available());
        assert!(!exp.is_tracking());

        assert!(exp.poll(&mut camera, &anchors).is_none());
        assert_eq!(camera.calls, 1);
        assert_eq!(exp.oracle.calls, 0);
    }

    #[test]
    fn creating_a_memory_anchors_it_at_the_detection() {
        let (_dir, mut services) = services();
        let oracle = ScriptedOracle::new(vec![labels(&[("mug", 0.9)])]);
        let mut exp = MemoryExperience::new(oracle, DetectionSettings::default());
        let report = exp
            .process_frame(&frame_at(0, Mat4::identity()), &services.anchors)
            .unwrap();
        let target = report.detected[0].clone();

        assert!(exp.select(target.id).is_some());
        let memory = Memory::new("Morning coffee", "", "", "transcript", 12.0, "Me");
        let memory_id = memory.id;
        let anchor_id = exp.create_memory_for_selected(memory, &mut services).unwrap();

        let stored = services.memories.get(memory_id).unwrap();
        assert_eq!(stored.anchor_identifier, Some(anchor_id));
        assert_eq!(stored.object_name, "Mug");
        assert_eq!(stored.object_emoji, "☕️");

        let anchor = services.anchors.get(anchor_id).unwrap();
        assert_eq!(anchor.memory_id, memory_id);
        assert_eq!(anchor.world_transform, target.transform);
        assert_eq!(anchor.detected_object_type, "Mug");

        assert!(exp.selected().is_none());
        assert!(exp.detected()[0].has_memory);
        assert!(exp.has_memory_at(target.position(), &services.anchors));
    }

    #[test]
    fn create_without_selection_is_none() {
        let (_dir, mut services) = services();
        let mut exp = MemoryExperience::new(ScriptedOracle::new(vec![]), DetectionSettings::default());
        let memory = Memory::new("Nothing", "", "", "", 0.0, "Me");
        assert!(exp.create_memory_for_selected(memory, &mut services).is_none());
        assert!(services.memories.is_empty());
        assert!(exp.select(Uuid::new_v4()).is_none());
    }
}
