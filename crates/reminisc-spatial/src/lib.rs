//! `reminisc-spatial` – geometry shared by anchoring and scanning.
//!
//! # Modules
//!
//! - [`transform`] – [`Vec3`][transform::Vec3], [`Quaternion`][transform::Quaternion],
//!   [`Transform3D`][transform::Transform3D] and the column-major
//!   [`Mat4`][transform::Mat4] world poses reported by the tracking session.
//! - [`bounding_box`] – [`BoundingBox`][bounding_box::BoundingBox] and the
//!   [`BoxEditor`][bounding_box::BoxEditor] state machine that lets a user
//!   size a box around an object by dragging its corner handles.

pub mod bounding_box;
pub mod transform;

pub use bounding_box::{BoundingBox, BoxEditor, EditorState, HandleIndex, ScanRegion};
pub use transform::{Mat4, Quaternion, Transform3D, Vec3};
