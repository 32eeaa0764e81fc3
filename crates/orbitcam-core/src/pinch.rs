#![forbid(unsafe_code)]

//! Two-pointer pinch zoom and twist rotation.
//!
//! Up to two pointers are tracked by identity across frames. A frame resolves
//! only when both tracked pointers reported this frame; a lone pointer falls
//! through to the pan/orbit resolver.
//!
//! Per resolved frame:
//!
//! 1. The change in pointer separation, scaled by the physical screen width,
//!    becomes `pinch_delta` and drives the zoom fraction.
//! 2. Inside the pinch-point zoom window (and outside navigation mode) the
//!    camera also travels along the line to the world point under the pinch
//!    midpoint, captured once per pinch.
//! 3. The turn of the pointer-pair direction adds to the rotation angle.

use glam::{Vec2, Vec3};

use crate::event::{FrameBatch, PointerId, PointerPhase};
use crate::geometry::{clamp01, cross_2d, turn_degrees};
use crate::output::CameraSignals;
use crate::scene::SceneView;
use crate::settings::GestureSettings;

/// A pointer held in one of the two pinch slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPointer {
    /// Pointer identity.
    pub id: PointerId,
    /// Position reported this frame (or the most recent one).
    pub position: Vec2,
    /// Position at the end of the last resolved pinch frame.
    pub last_position: Vec2,
    seen_this_frame: bool,
}

impl TrackedPointer {
    fn new(id: PointerId, position: Vec2) -> Self {
        Self {
            id,
            position,
            last_position: position,
            seen_this_frame: true,
        }
    }
}

/// What the pinch resolver did this frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PinchOutcome {
    /// Both pointers were tracked and the frame was resolved as a pinch.
    pub zooming: bool,
    /// Scaled separation change. Positive when the pointers moved together.
    pub pinch_delta: f32,
}

/// Pinch zoom and twist resolver.
#[derive(Debug, Clone, Default)]
pub struct PinchResolver {
    slots: [Option<TrackedPointer>; 2],
    is_pinching: bool,
    anchor: Option<Vec3>,
}

impl PinchResolver {
    /// Create a resolver with empty slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Occupied slots, slot 0 first.
    pub fn tracked(&self) -> impl Iterator<Item = &TrackedPointer> {
        self.slots.iter().flatten()
    }

    /// Whether a pinch has been resolved since the slots last changed hands.
    #[inline]
    #[must_use]
    pub fn is_pinching(&self) -> bool {
        self.is_pinching
    }

    /// World point the camera travels toward during this pinch, once captured.
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> Option<Vec3> {
        self.anchor
    }

    /// Forget both tracked pointers.
    pub fn clear_slots(&mut self) {
        if self.tracked_count() > 0 {
            tracing::debug!(tracked = self.tracked_count(), "pinch.clear_slots");
        }
        *self = Self::default();
    }

    /// Resolve one frame.
    pub fn update(
        &mut self,
        batch: &FrameBatch,
        scene: &impl SceneView,
        settings: &GestureSettings,
        navigating: bool,
        signals: &mut CameraSignals,
    ) -> PinchOutcome {
        self.associate(batch);

        let (Some(p0), Some(p1)) = (self.slots[0], self.slots[1]) else {
            return PinchOutcome::default();
        };
        if !(p0.seen_this_frame && p1.seen_this_frame) {
            return PinchOutcome::default();
        }
        if scene.is_over_ui(p0.position) && scene.is_over_ui(p1.position) {
            return PinchOutcome::default();
        }

        let starting = !self.is_pinching;
        self.is_pinching = true;
        if starting {
            self.anchor = None;
        }

        let current = p1.position - p0.position;
        let previous = p1.last_position - p0.last_position;
        let pinch_delta = (previous.length() - current.length()) * scene.screen_width_inches();
        signals.zoom_fraction =
            clamp01(signals.zoom_fraction + pinch_delta * settings.touch_pinch_zoom_speed);

        if !navigating && settings.pinch_point_window_contains(signals.zoom_fraction) {
            let midpoint = (p0.position + p1.position) * 0.5;
            self.move_toward_anchor(scene, settings, pinch_delta, midpoint, signals);
        }

        let last_dir = previous.normalize_or_zero();
        let cur_dir = current.normalize_or_zero();
        if let Some(turn) = turn_degrees(
            last_dir.extend(0.0),
            cur_dir.extend(0.0),
            cross_2d(last_dir, cur_dir),
        ) {
            signals.rotation_angle_degrees += turn;
        }

        for slot in self.slots.iter_mut().flatten() {
            slot.last_position = slot.position;
        }

        PinchOutcome {
            zooming: true,
            pinch_delta,
        }
    }

    /// Match this frame's events to the slots by pointer identity.
    fn associate(&mut self, batch: &FrameBatch) {
        for slot in self.slots.iter_mut().flatten() {
            slot.seen_this_frame = false;
        }

        for event in batch.events() {
            let matching = self
                .slots
                .iter()
                .position(|s| s.is_some_and(|s| s.id == event.id));
            match event.phase {
                PointerPhase::Began => {
                    if matching.is_some() {
                        continue;
                    }
                    if let Some(empty) = self.slots.iter_mut().find(|s| s.is_none()) {
                        *empty = Some(TrackedPointer::new(event.id, event.position));
                    }
                }
                PointerPhase::Held => {
                    if let Some(slot) = matching.and_then(|i| self.slots[i].as_mut()) {
                        slot.position = event.position;
                        slot.seen_this_frame = true;
                    }
                }
                PointerPhase::Ended | PointerPhase::Canceled => {
                    if let Some(i) = matching {
                        self.slots[i] = None;
                        self.is_pinching = false;
                        self.anchor = None;
                    }
                }
                PointerPhase::Hovered => {}
            }
        }
    }

    fn move_toward_anchor(
        &mut self,
        scene: &impl SceneView,
        settings: &GestureSettings,
        pinch_delta: f32,
        midpoint: Vec2,
        signals: &mut CameraSignals,
    ) {
        if self.anchor.is_none() {
            let ray = scene.viewport_ray(midpoint);
            self.anchor = scene.raycast_ground_plane(&ray, scene.focus_position().y);
            if let Some(anchor) = self.anchor {
                tracing::debug!(x = anchor.x, y = anchor.y, z = anchor.z, "pinch.anchor");
            }
        }
        let Some(anchor) = self.anchor else {
            return;
        };

        let direction = (anchor - scene.camera_position()).normalize_or_zero();
        let magnitude =
            pinch_delta.abs() * settings.touch_pinch_zoom_speed * settings.pinch_travel_scale;
        if pinch_delta > 0.0 {
            signals.camera_movement += direction * magnitude;
        } else if pinch_delta < 0.0 {
            signals.camera_movement -= direction * magnitude;
            signals.camera_movement.y = signals
                .camera_movement
                .y
                .min(signals.max_camera_movement.y);
        }
    }
}
