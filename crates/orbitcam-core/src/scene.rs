#![forbid(unsafe_code)]

//! Host collaborators consumed by the resolvers.
//!
//! The tracker never owns a camera. It asks a [`SceneView`] for the handful of
//! facts it needs each frame (where the camera is, how a viewport point maps to
//! a world ray, whether a point is covered by UI) and leaves everything else,
//! including applying the outputs, to the host.
//!
//! [`PerspectiveScene`] is a small self-contained pinhole camera used by tests
//! and trace replay.

use glam::{EulerRot, Quat, Vec2, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Ray;

/// Answers whether a normalized viewport position is covered by UI.
pub trait UiOcclusion {
    /// True when `position` lies over a UI element.
    fn is_over_ui(&self, position: Vec2) -> bool;
}

impl<F> UiOcclusion for F
where
    F: Fn(Vec2) -> bool,
{
    #[inline]
    fn is_over_ui(&self, position: Vec2) -> bool {
        self(position)
    }
}

/// Camera and screen facts the resolvers read during a frame.
pub trait SceneView: UiOcclusion {
    /// Physical width of the screen in inches.
    fn screen_width_inches(&self) -> f32;

    /// World ray from the camera through a normalized viewport position.
    fn viewport_ray(&self, position: Vec2) -> Ray;

    /// Camera position in world space.
    fn camera_position(&self) -> Vec3;

    /// Camera forward axis in world space.
    fn camera_forward(&self) -> Vec3;

    /// Camera right axis in world space.
    fn camera_right(&self) -> Vec3;

    /// Point the camera orbits around.
    fn focus_position(&self) -> Vec3;

    /// Intersect `ray` with the horizontal plane at `height`.
    fn raycast_ground_plane(&self, ray: &Ray, height: f32) -> Option<Vec3> {
        ray.intersect_horizontal_plane(height)
    }
}

/// Axis-aligned rectangle in normalized viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UiRegion {
    /// Bottom-left corner.
    pub min: Vec2,
    /// Top-right corner.
    pub max: Vec2,
}

impl UiRegion {
    /// Create a region from two corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Whether `position` lies inside the region (edges included).
    #[inline]
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        position.cmpge(self.min).all() && position.cmple(self.max).all()
    }
}

/// Pinhole perspective camera with rectangular UI overlays.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PerspectiveScene {
    /// Camera position.
    pub camera_position: Vec3,
    /// Heading in degrees, clockwise from +Z when seen from above.
    pub yaw_degrees: f32,
    /// Pitch in degrees, positive looks down.
    pub pitch_degrees: f32,
    /// Vertical field of view in degrees.
    pub vertical_fov_degrees: f32,
    /// Viewport width over height.
    pub aspect: f32,
    /// Orbit focus.
    pub focus: Vec3,
    /// Physical screen width.
    pub screen_width_inches: f32,
    /// Viewport areas covered by UI.
    pub ui_regions: Vec<UiRegion>,
}

impl Default for PerspectiveScene {
    fn default() -> Self {
        Self {
            camera_position: Vec3::new(0.0, 100.0, -100.0),
            yaw_degrees: 0.0,
            pitch_degrees: 45.0,
            vertical_fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            focus: Vec3::ZERO,
            screen_width_inches: 6.0,
            ui_regions: Vec::new(),
        }
    }
}

impl PerspectiveScene {
    /// Camera orientation.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw_degrees.to_radians(),
            self.pitch_degrees.to_radians(),
            0.0,
        )
    }

    /// Camera up axis.
    #[must_use]
    pub fn camera_up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }

    /// Add a UI rectangle.
    #[must_use]
    pub fn with_ui_region(mut self, region: UiRegion) -> Self {
        self.ui_regions.push(region);
        self
    }
}

impl UiOcclusion for PerspectiveScene {
    fn is_over_ui(&self, position: Vec2) -> bool {
        self.ui_regions.iter().any(|r| r.contains(position))
    }
}

impl SceneView for PerspectiveScene {
    fn screen_width_inches(&self) -> f32 {
        self.screen_width_inches
    }

    fn viewport_ray(&self, position: Vec2) -> Ray {
        let ndc = position * 2.0 - Vec2::ONE;
        let half_height = (self.vertical_fov_degrees.to_radians() * 0.5).tan();
        let half_width = half_height * self.aspect;
        let rotation = self.rotation();
        let direction = rotation * Vec3::Z
            + rotation * Vec3::X * (ndc.x * half_width)
            + rotation * Vec3::Y * (ndc.y * half_height);
        Ray::new(self.camera_position, direction.normalize_or_zero())
    }

    fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    fn camera_forward(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    fn camera_right(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    fn focus_position(&self) -> Vec3 {
        self.focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_occlusion_oracles() {
        let left_half = |p: Vec2| p.x < 0.5;
        assert!(left_half.is_over_ui(Vec2::new(0.1, 0.5)));
        assert!(!left_half.is_over_ui(Vec2::new(0.9, 0.5)));
    }

    #[test]
    fn ui_regions_include_edges() {
        let scene = PerspectiveScene::default()
            .with_ui_region(UiRegion::new(Vec2::ZERO, Vec2::new(0.2, 0.1)));
        assert!(scene.is_over_ui(Vec2::new(0.2, 0.1)));
        assert!(scene.is_over_ui(Vec2::new(0.05, 0.05)));
        assert!(!scene.is_over_ui(Vec2::new(0.5, 0.5)));
    }

    #[test]
    fn level_camera_axes() {
        let scene = PerspectiveScene {
            pitch_degrees: 0.0,
            ..PerspectiveScene::default()
        };
        assert!(scene.camera_forward().abs_diff_eq(Vec3::Z, 1e-6));
        assert!(scene.camera_right().abs_diff_eq(Vec3::X, 1e-6));
        assert!(scene.camera_up().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn centre_ray_follows_forward() {
        let scene = PerspectiveScene::default();
        let ray = scene.viewport_ray(Vec2::splat(0.5));
        assert!(ray.direction.abs_diff_eq(scene.camera_forward(), 1e-5));
        assert!(ray.direction.y < 0.0);
    }

    #[test]
    fn pitched_camera_hits_ground_near_focus() {
        // 45 degrees down from (0, 100, -100) lands on the origin.
        let scene = PerspectiveScene::default();
        let ray = scene.viewport_ray(Vec2::splat(0.5));
        let hit = scene.raycast_ground_plane(&ray, 0.0).expect("hit");
        assert!(hit.abs_diff_eq(Vec3::ZERO, 1e-3), "{hit:?}");
    }

    #[test]
    fn right_of_centre_ray_bends_right() {
        let scene = PerspectiveScene::default();
        let centre = scene.viewport_ray(Vec2::splat(0.5)).direction;
        let right = scene.viewport_ray(Vec2::new(0.9, 0.5)).direction;
        assert!(right.dot(scene.camera_right()) > centre.dot(scene.camera_right()));
    }
}
