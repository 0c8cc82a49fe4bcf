//! Interactive bounding box used to mark the extent of an object before it
//! is scanned.
//!
//! A [`BoundingBox`] is a pose plus a per-axis extent. Its eight corner
//! handles are never stored: they are re-derived from the extent every time
//! they are read, so a long drag cannot accumulate drift.
//!
//! [`BoxEditor`] drives the box through a scanning session:
//!
//! ```text
//! Unplaced ──place──▶ Placed ──begin_drag──▶ Resizing ─┐
//!                       ▲  │                   ▲  drag_to
//!                       │  └──finalize──▶ Finalized    │
//!                       └──────end_drag────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use reminisc_spatial::bounding_box::{BoxEditor, HandleIndex, MIN_SIDE};
//! use reminisc_spatial::transform::{Mat4, Vec3};
//!
//! let mut editor = BoxEditor::new();
//! assert!(editor.place(Mat4::identity()));
//!
//! // Drag corner 0 almost onto its opposite corner: the box clamps.
//! let handle = HandleIndex::new(0).unwrap();
//! editor.begin_drag(handle);
//! editor.drag_to(Vec3::new(0.049, -0.05, -0.05));
//! editor.end_drag();
//!
//! let extent = editor.bounding_box().unwrap().extent();
//! assert!((extent.x - MIN_SIDE).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::transform::{Mat4, Vec3};

/// Smallest allowed edge length, in metres (2 cm).
pub const MIN_SIDE: f32 = 0.02;

/// Edge length of a freshly placed box (10 cm cube).
pub const DEFAULT_SIDE: f32 = 0.1;

/// Radius of the corner handle spheres (≈7 mm), used for picking.
pub const HANDLE_RADIUS: f32 = 0.007;

/// Number of corner handles.
pub const HANDLE_COUNT: usize = 8;

// ────────────────────────────────────────────────────────────────────────────
// HandleIndex
// ────────────────────────────────────────────────────────────────────────────

/// One of the eight corners of a box.
///
/// Bit 0 selects the x sign, bit 1 the y sign and bit 2 the z sign (a set bit
/// is the positive side), so index 0 is `(-,-,-)` and index 7 is `(+,+,+)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleIndex(u8);

impl HandleIndex {
    /// Returns `None` for indices outside `0..8`.
    pub fn new(index: usize) -> Option<Self> {
        (index < HANDLE_COUNT).then_some(Self(index as u8))
    }

    /// All eight handles in index order.
    pub fn all() -> impl Iterator<Item = HandleIndex> {
        (0..HANDLE_COUNT as u8).map(HandleIndex)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The diagonally opposite corner (`i ^ 0b111`).
    pub fn opposite(self) -> Self {
        Self(self.0 ^ 0b111)
    }

    /// Unit sign per axis: `-1.0` or `+1.0`.
    pub fn signs(self) -> Vec3 {
        let sign = |bit: u8| if self.0 & bit != 0 { 1.0 } else { -1.0 };
        Vec3::new(sign(0b001), sign(0b010), sign(0b100))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// BoundingBox
// ────────────────────────────────────────────────────────────────────────────

/// Floor every component of `extent` at [`MIN_SIDE`].
fn clamp_extent(extent: Vec3) -> Vec3 {
    extent.max(Vec3::splat(MIN_SIDE))
}

/// A box defined by its world pose (whose translation is the centre) and a
/// per-axis extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pose: Mat4,
    extent: Vec3,
}

impl BoundingBox {
    /// Create a box at `pose`. The extent is clamped to [`MIN_SIDE`].
    pub fn new(pose: Mat4, extent: Vec3) -> Self {
        Self {
            pose,
            extent: clamp_extent(extent),
        }
    }

    /// A default-sized box placed at a surface hit.
    pub fn placed_at(pose: Mat4) -> Self {
        Self::new(pose, Vec3::splat(DEFAULT_SIDE))
    }

    pub fn pose(&self) -> Mat4 {
        self.pose
    }

    pub fn extent(&self) -> Vec3 {
        self.extent
    }

    pub fn center(&self) -> Vec3 {
        self.pose.translation()
    }

    /// Handle position in the box's own frame.
    pub fn local_handle_position(&self, handle: HandleIndex) -> Vec3 {
        self.extent.scale(0.5).mul_elem(handle.signs())
    }

    /// Handle position in world space.
    pub fn handle_position(&self, handle: HandleIndex) -> Vec3 {
        self.pose
            .transform_point(self.local_handle_position(handle))
    }

    /// World positions of all eight handles, in index order.
    pub fn handle_positions(&self) -> [Vec3; HANDLE_COUNT] {
        let mut out = [Vec3::zero(); HANDLE_COUNT];
        for handle in HandleIndex::all() {
            out[handle.index()] = self.handle_position(handle);
        }
        out
    }

    /// The handle closest to `point`, if it lies within `radius`.
    pub fn handle_near(&self, point: Vec3, radius: f32) -> Option<HandleIndex> {
        HandleIndex::all()
            .map(|h| (h, self.handle_position(h).distance(point)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(h, _)| h)
    }

    /// Rebuild the box from two opposite corners.
    ///
    /// The centre becomes their midpoint and the extent their per-axis
    /// absolute difference, floored at [`MIN_SIDE`]. Rotation is kept.
    pub fn span(&mut self, dragged: Vec3, opposite: Vec3) {
        let center = dragged.midpoint(opposite);
        self.extent = clamp_extent(dragged.sub(opposite).abs());
        self.pose = self.pose.with_translation(center);
        trace!(?center, extent = ?self.extent, "bounding box respanned");
    }

    /// Move `handle` to `world_pos`, keeping the opposite corner where it
    /// currently is.
    pub fn resize(&mut self, handle: HandleIndex, world_pos: Vec3) {
        let opposite = self.handle_position(handle.opposite());
        self.span(world_pos, opposite);
    }

    /// Multiply the extent by `factor`, floored at [`MIN_SIDE`]. The centre
    /// does not move.
    pub fn scale(&mut self, factor: f32) {
        self.extent = clamp_extent(self.extent.scale(factor));
    }

    /// The region handed to the object scanner.
    pub fn region(&self) -> ScanRegion {
        ScanRegion {
            transform: self.pose,
            extent: self.extent,
        }
    }
}

/// World transform and extent of a finished box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanRegion {
    pub transform: Mat4,
    pub extent: Vec3,
}

// ────────────────────────────────────────────────────────────────────────────
// BoxEditor
// ────────────────────────────────────────────────────────────────────────────

/// Where a [`BoxEditor`] is in its session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorState {
    /// No box yet; the next placement creates one.
    Unplaced,
    /// Box exists and is idle.
    Placed,
    /// A handle is being dragged. `anchor` is the world position of the
    /// opposite corner, fixed when the drag began.
    Resizing { handle: HandleIndex, anchor: Vec3 },
    /// The box was handed off to the scanner; further edits are ignored.
    Finalized,
}

/// Owns the single mutable box of a scanning session.
#[derive(Debug, Clone)]
pub struct BoxEditor {
    state: EditorState,
    bbox: Option<BoundingBox>,
}

impl Default for BoxEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxEditor {
    pub fn new() -> Self {
        Self {
            state: EditorState::Unplaced,
            bbox: None,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    /// Place the box at a surface hit.
    ///
    /// Only the first placement counts; later taps are ignored and return
    /// `false`. Re-placing requires a new session.
    pub fn place(&mut self, hit: Mat4) -> bool {
        if self.state != EditorState::Unplaced {
            debug!(state = ?self.state, "ignoring placement on an existing box");
            return false;
        }
        self.bbox = Some(BoundingBox::placed_at(hit));
        self.state = EditorState::Placed;
        debug!(center = ?hit.translation(), "bounding box placed");
        true
    }

    /// Start dragging `handle`. Returns `false` unless the box is placed and
    /// idle.
    pub fn begin_drag(&mut self, handle: HandleIndex) -> bool {
        match (self.state, self.bbox.as_ref()) {
            (EditorState::Placed, Some(bbox)) => {
                let anchor = bbox.handle_position(handle.opposite());
                self.state = EditorState::Resizing { handle, anchor };
                true
            }
            _ => false,
        }
    }

    /// Start dragging whichever handle lies within `radius` of `point`.
    pub fn begin_drag_at(&mut self, point: Vec3, radius: f32) -> Option<HandleIndex> {
        let handle = self.bbox.as_ref()?.handle_near(point, radius)?;
        self.begin_drag(handle).then_some(handle)
    }

    /// Move the dragged handle to `world_pos`.
    ///
    /// The box is recomputed from scratch against the fixed anchor, so
    /// repeated updates to the same position yield the same box.
    pub fn drag_to(&mut self, world_pos: Vec3) -> bool {
        let EditorState::Resizing { anchor, .. } = self.state else {
            return false;
        };
        match self.bbox.as_mut() {
            Some(bbox) => {
                bbox.span(world_pos, anchor);
                true
            }
            None => false,
        }
    }

    /// Finish the current drag; the box keeps its last geometry.
    pub fn end_drag(&mut self) {
        if matches!(self.state, EditorState::Resizing { .. }) {
            self.state = EditorState::Placed;
        }
    }

    /// Uniformly scale the box (pinch). Ignored unless placed or resizing.
    ///
    /// While resizing, the drag anchor moves to the scaled opposite corner so
    /// the next drag update keeps the new size.
    pub fn scale(&mut self, factor: f32) -> bool {
        let Some(bbox) = self.bbox.as_mut() else {
            return false;
        };
        match self.state {
            EditorState::Placed => {
                bbox.scale(factor);
                true
            }
            EditorState::Resizing { handle, .. } => {
                bbox.scale(factor);
                let anchor = bbox.handle_position(handle.opposite());
                self.state = EditorState::Resizing { handle, anchor };
                true
            }
            _ => false,
        }
    }

    /// Hand the box off. Returns its region, or `None` if nothing was placed
    /// or the session already finalized.
    pub fn finalize(&mut self) -> Option<ScanRegion> {
        match self.state {
            EditorState::Placed | EditorState::Resizing { .. } => {
                let region = self.bbox.as_ref()?.region();
                self.state = EditorState::Finalized;
                debug!(extent = ?region.extent, "bounding box finalized");
                Some(region)
            }
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
