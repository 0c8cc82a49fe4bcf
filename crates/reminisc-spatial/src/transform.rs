//! Rigid-body transform primitives.
//!
//! World poses coming from the tracking session are 4×4 column-major
//! matrices ([`Mat4`]); the translation column of a pose is the position
//! used for every proximity query. [`Quaternion`] and [`Transform3D`] are the
//! compact form used to build poses in code.
//!
//! # Example
//!
//! ```rust
//! use reminisc_spatial::transform::{Mat4, Quaternion, Transform3D, Vec3};
//!
//! // Camera 1.5 m above the origin, looking down -Z.
//! let camera = Mat4::from(Transform3D::new(Vec3::new(0.0, 1.5, 0.0), Quaternion::identity()));
//!
//! // A point half a metre in front of the camera.
//! let ahead = camera.mul(Mat4::from_translation(Vec3::new(0.0, 0.0, -0.5)));
//! let p = ahead.translation();
//! assert!((p.y - 1.5).abs() < 1e-6);
//! assert!((p.z + 0.5).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Primitive types
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D vector or point, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Create a new vector.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// A vector with every component set to `v`.
    pub fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Component-wise product.
    pub fn mul_elem(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    /// Component-wise absolute value.
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Component-wise maximum.
    pub fn max(self, rhs: Self) -> Self {
        Self::new(self.x.max(rhs.x), self.y.max(rhs.y), self.z.max(rhs.z))
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Self) -> f32 {
        self.sub(other).length()
    }

    /// The point halfway between `self` and `other`.
    pub fn midpoint(self, other: Self) -> Self {
        self.add(other).scale(0.5)
    }
}

/// A unit quaternion representing a 3-D rotation (w, x, y, z convention).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    /// Create a quaternion.  The caller is responsible for providing a unit
    /// quaternion (|q| = 1).
    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation of `angle_rad` around the unit vector `axis`.
    pub fn from_axis_angle(axis: Vec3, angle_rad: f32) -> Self {
        let (s, c) = (angle_rad * 0.5).sin_cos();
        Self::new(c, axis.x * s, axis.y * s, axis.z * s)
    }

    /// Hamilton product: compose two rotations.
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Rotate a vector by this quaternion: p' = q * p * q*.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let p = Self::new(0.0, v.x, v.y, v.z);
        let rotated = self.mul(p).mul(self.conjugate());
        Vec3::new(rotated.x, rotated.y, rotated.z)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transform3D
// ────────────────────────────────────────────────────────────────────────────

/// A rigid-body 3-D transform: rotation followed by translation.
///
/// To convert a point expressed in the local frame into the parent frame,
/// rotate it by `rotation` then add `translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Quaternion,
}

impl Transform3D {
    /// Create a transform from a translation and rotation.
    pub fn new(translation: Vec3, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// The identity transform (no translation, no rotation).
    pub fn identity() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity())
    }

    /// Compose two transforms: if `self` = T_A_B and `other` = T_B_C, the
    /// result is T_A_C.
    pub fn compose(self, other: Self) -> Self {
        let translated = self.translation.add(self.rotation.rotate(other.translation));
        let rotated = self.rotation.mul(other.rotation);
        Self::new(translated, rotated)
    }

    /// Map a point from the local frame into the parent frame.
    pub fn apply(self, point: Vec3) -> Vec3 {
        self.translation.add(self.rotation.rotate(point))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Mat4
// ────────────────────────────────────────────────────────────────────────────

/// A 4×4 affine transform stored column-major, as produced by the tracking
/// session.
///
/// Serialises as a flat array of 16 floats (column 0 first), which is the
/// layout persisted for every anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 16]", into = "[f32; 16]")]
pub struct Mat4 {
    /// `cols[c][r]`
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub fn from_cols(cols: [[f32; 4]; 4]) -> Self {
        Self { cols }
    }

    pub fn identity() -> Self {
        Self::from_cols([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// A pure translation.
    pub fn from_translation(t: Vec3) -> Self {
        Self::identity().with_translation(t)
    }

    /// The translation column, i.e. the position of this pose.
    pub fn translation(&self) -> Vec3 {
        let c = self.cols[3];
        Vec3::new(c[0], c[1], c[2])
    }

    /// Copy of `self` with its translation column replaced; rotation and
    /// scale are kept.
    pub fn with_translation(mut self, t: Vec3) -> Self {
        self.cols[3] = [t.x, t.y, t.z, 1.0];
        self
    }

    /// Matrix product `self × rhs`.
    pub fn mul(self, rhs: Self) -> Self {
        let mut out = [[0.0f32; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, cell) in col.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.cols[k][i] * rhs.cols[j][k]).sum();
            }
        }
        Self::from_cols(out)
    }

    /// Map a point (w = 1) through this transform.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let [c0, c1, c2, c3] = self.cols;
        Vec3::new(
            c0[0] * p.x + c1[0] * p.y + c2[0] * p.z + c3[0],
            c0[1] * p.x + c1[1] * p.y + c2[1] * p.z + c3[1],
            c0[2] * p.x + c1[2] * p.y + c2[2] * p.z + c3[2],
        )
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f32; 16]> for Mat4 {
    fn from(a: [f32; 16]) -> Self {
        Self::from_cols([
            [a[0], a[1], a[2], a[3]],
            [a[4], a[5], a[6], a[7]],
            [a[8], a[9], a[10], a[11]],
            [a[12], a[13], a[14], a[15]],
        ])
    }
}

impl From<Mat4> for [f32; 16] {
    fn from(m: Mat4) -> Self {
        let mut out = [0.0f32; 16];
        for (c, col) in m.cols.iter().enumerate() {
            out[c * 4..c * 4 + 4].copy_from_slice(col);
        }
        out
    }
}

impl From<Transform3D> for Mat4 {
    fn from(t: Transform3D) -> Self {
        let Quaternion { w, x, y, z } = t.rotation;
        let p = t.translation;
        Self::from_cols([
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y + w * z),
                2.0 * (x * z - w * y),
                0.0,
            ],
            [
                2.0 * (x * y - w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z + w * x),
                0.0,
            ],
            [
                2.0 * (x * z + w * y),
                2.0 * (y * z - w * x),
                1.0 - 2.0 * (x * x + y * y),
                0.0,
            ],
            [p.x, p.y, p.z, 1.0],
        ])
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!(a.distance(b) < 1e-5, "{a:?} != {b:?}");
    }

    // ── Vec3 ────────────────────────────────────────────────────────────────

    #[test]
    fn distance_is_euclidean() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 6.0, 3.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn midpoint_and_abs() {
        let a = Vec3::new(-1.0, 2.0, 0.0);
        let b = Vec3::new(3.0, -2.0, 1.0);
        assert_vec_eq(a.midpoint(b), Vec3::new(1.0, 0.0, 0.5));
        assert_vec_eq(a.sub(b).abs(), Vec3::new(4.0, 4.0, 1.0));
    }

    // ── Quaternion ──────────────────────────────────────────────────────────

    #[test]
    fn quaternion_90deg_yaw_rotates_x_to_y() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        assert_vec_eq(q.rotate(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn axis_angle_matches_explicit_quaternion() {
        let q = Quaternion::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), FRAC_PI_2);
        assert!((q.w - FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((q.z - FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn quaternion_conjugate_is_inverse() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let prod = q.mul(q.conjugate());
        assert!((prod.w - 1.0).abs() < 1e-5);
        assert!(prod.x.abs() < 1e-5);
        assert!(prod.y.abs() < 1e-5);
        assert!(prod.z.abs() < 1e-5);
    }

    // ── Transform3D ─────────────────────────────────────────────────────────

    #[test]
    fn transform_compose_respects_rotation() {
        let q90z = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let base = Transform3D::new(Vec3::zero(), q90z);
        let camera = Transform3D::new(Vec3::new(1.0, 0.0, 0.0), Quaternion::identity());
        let t = base.compose(camera);
        assert_vec_eq(t.translation, Vec3::new(0.0, 1.0, 0.0));
    }

    // ── Mat4 ────────────────────────────────────────────────────────────────

    #[test]
    fn mat4_from_transform_agrees_with_transform_apply() {
        let t = Transform3D::new(
            Vec3::new(0.5, -1.0, 2.0),
            Quaternion::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), 0.7),
        );
        let m = Mat4::from(t);
        let p = Vec3::new(0.3, 0.2, -0.1);
        assert_vec_eq(m.transform_point(p), t.apply(p));
        assert_vec_eq(m.translation(), t.translation);
    }

    #[test]
    fn mat4_mul_composes_like_transform() {
        let a = Transform3D::new(
            Vec3::new(1.0, 0.0, 0.0),
            Quaternion::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), FRAC_PI_2),
        );
        let b = Transform3D::new(Vec3::new(0.0, 2.0, 0.0), Quaternion::identity());
        let composed = Mat4::from(a).mul(Mat4::from(b));
        assert_vec_eq(composed.translation(), a.compose(b).translation);
    }

    #[test]
    fn mat4_identity_mul_is_noop() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Mat4::identity().mul(m), m);
        assert_eq!(m.mul(Mat4::identity()), m);
    }

    #[test]
    fn with_translation_keeps_rotation() {
        let rotated = Mat4::from(Transform3D::new(
            Vec3::zero(),
            Quaternion::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), 0.4),
        ));
        let moved = rotated.with_translation(Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(moved.cols[0], rotated.cols[0]);
        assert_eq!(moved.cols[2], rotated.cols[2]);
        assert_vec_eq(moved.translation(), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn mat4_serialises_as_flat_column_major_array() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(
            json,
            "[1.0,0.0,0.0,0.0,0.0,1.0,0.0,0.0,0.0,0.0,1.0,0.0,1.0,2.0,3.0,1.0]"
        );
        let back: Mat4 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
