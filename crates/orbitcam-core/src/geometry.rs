#![forbid(unsafe_code)]

//! Geometric primitives shared by the resolvers.

use glam::{Vec2, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Relative tolerance used by [`approximately`].
const RELATIVE_EPSILON: f32 = 1e-6;

/// Absolute floor used by [`approximately`] near zero.
const ABSOLUTE_EPSILON: f32 = f32::MIN_POSITIVE * 8.0;

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Direction. Not required to be unit length.
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersect with the horizontal plane `y = height`.
    ///
    /// Returns `None` when the ray is parallel to the plane or the plane lies
    /// behind the origin.
    #[must_use]
    pub fn intersect_horizontal_plane(&self, height: f32) -> Option<Vec3> {
        let denom = self.direction.y;
        if denom.abs() <= f32::EPSILON || !denom.is_finite() {
            return None;
        }
        let t = (height - self.origin.y) / denom;
        if !t.is_finite() || t < 0.0 {
            return None;
        }
        Some(self.point_at(t))
    }
}

/// Unity-style fuzzy float equality.
///
/// Relative to the operands' magnitude, with a tiny absolute floor so values
/// near zero compare sensibly.
#[inline]
#[must_use]
pub fn approximately(a: f32, b: f32) -> bool {
    (b - a).abs() < (RELATIVE_EPSILON * a.abs().max(b.abs())).max(ABSOLUTE_EPSILON)
}

/// Force a ray direction to point downward by at least `threshold`.
///
/// Directions at or above the horizon would miss the ground plane (or hit it
/// at a distance that is effectively infinite). `threshold` must be negative.
#[inline]
#[must_use]
pub fn clamp_dir_to_ground(mut dir: Vec3, threshold: f32) -> Vec3 {
    if dir.y > -f32::EPSILON {
        dir.y = threshold;
    }
    dir
}

/// Signed turn, in degrees, from `from` to `to`.
///
/// `determinant` is the 2D cross product of the two directions in the plane of
/// rotation and only contributes its sign. Returns `None` when either vector
/// is degenerate or when the directions are already aligned, which keeps
/// `acos` away from the edges of its domain.
#[must_use]
pub fn turn_degrees(from: Vec3, to: Vec3, determinant: f32) -> Option<f32> {
    if approximately(from.length(), 0.0) || approximately(to.length(), 0.0) {
        return None;
    }

    let dot = from.dot(to);
    if !dot.is_finite() || approximately(1.0, dot) {
        return None;
    }

    let angle = dot.clamp(-1.0, 1.0).acos().to_degrees();
    Some(if determinant < 0.0 { -angle } else { angle })
}

/// 2D cross product `a.x * b.y - a.y * b.x`.
#[inline]
#[must_use]
pub fn cross_2d(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Cross product of two vectors projected onto the ground (XZ) plane.
#[inline]
#[must_use]
pub fn cross_ground(a: Vec3, b: Vec3) -> f32 {
    a.x * b.z - a.z * b.x
}

/// Clamp to `[0, 1]`, mapping NaN to zero.
#[inline]
#[must_use]
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Project onto the horizontal plane and normalize (zero if vertical).
#[inline]
#[must_use]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z).normalize_or_zero()
}
