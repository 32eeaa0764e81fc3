#![forbid(unsafe_code)]

//! Camera control signals produced by gesture resolution.

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The continuous signals a tracker accumulates across frames.
///
/// Resolvers mutate these in place. The host reads them after each frame and
/// may write them back (for example when an animated transition moves the
/// camera).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CameraSignals {
    /// Normalized zoom level, always within `[0, 1]`.
    pub zoom_fraction: f32,
    /// Accumulated rotation. Not wrapped.
    pub rotation_angle_degrees: f32,
    /// Accumulated camera translation in world units.
    pub camera_movement: Vec3,
    /// Per-axis ceiling applied to `camera_movement` while pinch zooming out.
    pub max_camera_movement: Vec3,
}

impl CameraSignals {
    /// Signals at rest with the given zoom.
    #[must_use]
    pub fn with_zoom(zoom_fraction: f32) -> Self {
        Self {
            zoom_fraction: crate::geometry::clamp01(zoom_fraction),
            rotation_angle_degrees: 0.0,
            camera_movement: Vec3::ZERO,
            max_camera_movement: Vec3::splat(f32::MAX),
        }
    }
}

/// Which interpretation won the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ResolvedGesture {
    /// Nothing changed the signals.
    #[default]
    Idle,
    /// Mouse wheel or trackpad scroll.
    WheelZoom,
    /// Two-pointer pinch and twist.
    Pinch,
    /// Tap, tap, drag.
    DoubleTapZoom,
    /// Single pointer rotating around the focus.
    Orbit,
    /// Single pointer translating the camera.
    Pan,
}

impl ResolvedGesture {
    /// Short lowercase name for logs and traces.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::WheelZoom => "wheel_zoom",
            Self::Pinch => "pinch",
            Self::DoubleTapZoom => "double_tap_zoom",
            Self::Orbit => "orbit",
            Self::Pan => "pan",
        }
    }

    /// True for the zoom gestures.
    #[must_use]
    pub const fn is_zoom(self) -> bool {
        matches!(self, Self::WheelZoom | Self::Pinch | Self::DoubleTapZoom)
    }
}

/// Result of one [`GestureTracker::resolve`](crate::GestureTracker::resolve).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GestureOutput {
    /// Zoom fraction after this frame.
    pub zoom_fraction: f32,
    /// Rotation accumulator after this frame.
    pub rotation_angle_degrees: f32,
    /// Camera translation after this frame.
    pub camera_movement: Vec3,
    /// A zoom gesture owned the frame.
    pub is_zooming: bool,
    /// Winning interpretation.
    pub gesture: ResolvedGesture,
}

impl GestureOutput {
    pub(crate) fn new(signals: &CameraSignals, is_zooming: bool, gesture: ResolvedGesture) -> Self {
        Self {
            zoom_fraction: signals.zoom_fraction,
            rotation_angle_degrees: signals.rotation_angle_degrees,
            camera_movement: signals.camera_movement,
            is_zooming,
            gesture,
        }
    }
}
