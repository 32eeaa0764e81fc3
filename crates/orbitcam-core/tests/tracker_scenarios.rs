//! End-to-end gesture scenarios driven through `GestureTracker`.
//!
//! Each test feeds a short frame sequence and checks the resolved signals.

use orbitcam_core::geometry::Ray;
use orbitcam_core::glam::{Vec2, Vec3};
use orbitcam_core::{
    DoubleTapPhase, FrameTime, GestureOutput, GestureSettings, GestureTracker, PerspectiveScene,
    PointerEvent, ResolvedGesture, SceneView, UiOcclusion,
};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Camera looking straight down: viewport (x, y) maps to ground (x, 0, y).
///
/// Everything left of `ui_left_of` counts as UI.
struct VerticalRays {
    focus: Vec3,
    ui_left_of: f32,
}

impl UiOcclusion for VerticalRays {
    fn is_over_ui(&self, position: Vec2) -> bool {
        position.x < self.ui_left_of
    }
}

impl SceneView for VerticalRays {
    fn screen_width_inches(&self) -> f32 {
        4.0
    }

    fn viewport_ray(&self, position: Vec2) -> Ray {
        Ray::new(Vec3::new(position.x, 10.0, position.y), Vec3::NEG_Y)
    }

    fn camera_position(&self) -> Vec3 {
        Vec3::new(0.5, 10.0, 0.5)
    }

    fn camera_forward(&self) -> Vec3 {
        Vec3::NEG_Y
    }

    fn camera_right(&self) -> Vec3 {
        Vec3::X
    }

    fn focus_position(&self) -> Vec3 {
        self.focus
    }
}

struct Driver<S> {
    tracker: GestureTracker,
    scene: S,
    frame: u64,
}

impl<S: SceneView> Driver<S> {
    fn new(scene: S) -> Self {
        Self {
            tracker: GestureTracker::new(GestureSettings::default()),
            scene,
            frame: 0,
        }
    }

    /// Resolve one frame at host time `now`.
    fn frame(&mut self, now: f64, events: &[PointerEvent]) -> GestureOutput {
        self.frame += 1;
        for e in events {
            self.tracker.append_event(*e);
        }
        self.tracker
            .resolve(&self.scene, FrameTime::new(self.frame, now, 1.0 / 60.0))
    }
}

fn pinch_pair(driver: &mut Driver<VerticalRays>, now: f64, a: Vec2, b: Vec2) -> GestureOutput {
    driver.frame(now, &[PointerEvent::held(1, a, now), PointerEvent::held(2, b, now)])
}

fn start_pinch(driver: &mut Driver<VerticalRays>, a: Vec2, b: Vec2) {
    driver.frame(0.0, &[PointerEvent::began(1, a, 0.0), PointerEvent::began(2, b, 0.0)]);
}

fn overhead() -> Driver<VerticalRays> {
    overhead_with_ui(-1.0)
}

fn overhead_with_ui(ui_left_of: f32) -> Driver<VerticalRays> {
    Driver::new(VerticalRays {
        focus: Vec3::new(0.5, 0.0, 0.5),
        ui_left_of,
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Pinch
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn pinching_together_raises_zoom() {
    let mut d = overhead();
    d.tracker.set_navigating(true);
    start_pinch(&mut d, Vec2::new(0.2, 0.5), Vec2::new(0.8, 0.5));

    let before = d.tracker.zoom_fraction();
    let out = pinch_pair(&mut d, 0.02, Vec2::new(0.25, 0.5), Vec2::new(0.75, 0.5));
    assert!(out.is_zooming);
    assert_eq!(out.gesture, ResolvedGesture::Pinch);
    assert!(out.zoom_fraction > before);
    // 0.1 separation * 4 inches * 0.5 speed
    assert!((out.zoom_fraction - (before + 0.2)).abs() < 1e-5);
}

#[test]
fn pinching_apart_lowers_zoom() {
    let mut d = overhead();
    d.tracker.set_navigating(true);
    start_pinch(&mut d, Vec2::new(0.4, 0.5), Vec2::new(0.6, 0.5));

    let before = d.tracker.zoom_fraction();
    let out = pinch_pair(&mut d, 0.02, Vec2::new(0.35, 0.5), Vec2::new(0.65, 0.5));
    assert!(out.zoom_fraction < before);
}

#[test]
fn pinch_zoom_saturates_at_bounds() {
    let mut d = overhead();
    d.tracker.set_navigating(true);
    start_pinch(&mut d, Vec2::new(0.0, 0.5), Vec2::new(1.0, 0.5));
    let out = pinch_pair(&mut d, 0.02, Vec2::new(0.49, 0.5), Vec2::new(0.51, 0.5));
    assert_eq!(out.zoom_fraction, 1.0);

    let out = pinch_pair(&mut d, 0.04, Vec2::new(0.0, 0.5), Vec2::new(1.0, 0.5));
    assert_eq!(out.zoom_fraction, 0.0);
}

#[test]
fn lifting_one_finger_ends_pinch() {
    let mut d = overhead();
    start_pinch(&mut d, Vec2::new(0.3, 0.5), Vec2::new(0.7, 0.5));
    let out = d.frame(
        0.02,
        &[
            PointerEvent::held(1, Vec2::new(0.3, 0.5), 0.02),
            PointerEvent::ended(2, Vec2::new(0.7, 0.5), 0.02),
        ],
    );
    assert!(!out.is_zooming);
    assert_eq!(d.tracker.tracked_pointer_count(), 0);
}

#[test]
fn pinch_with_one_finger_over_ui_still_zooms() {
    let mut d = overhead_with_ui(0.25);
    d.tracker.set_navigating(true);
    start_pinch(&mut d, Vec2::new(0.1, 0.5), Vec2::new(0.8, 0.5));

    let out = pinch_pair(&mut d, 0.02, Vec2::new(0.2, 0.5), Vec2::new(0.7, 0.5));
    assert!(out.is_zooming);
    assert_eq!(out.gesture, ResolvedGesture::Pinch);
    // 0.2 separation * 4 inches * 0.5 speed
    assert!((out.zoom_fraction - 0.9).abs() < 1e-5, "zoom = {}", out.zoom_fraction);
}

#[test]
fn pinch_with_both_fingers_over_ui_is_ignored() {
    let mut d = overhead_with_ui(0.9);
    d.tracker.set_navigating(true);
    start_pinch(&mut d, Vec2::new(0.1, 0.5), Vec2::new(0.8, 0.5));

    let before = d.tracker.zoom_fraction();
    let out = pinch_pair(&mut d, 0.02, Vec2::new(0.2, 0.5), Vec2::new(0.7, 0.5));
    assert!(!out.is_zooming);
    assert_ne!(out.gesture, ResolvedGesture::Pinch);
    assert_eq!(out.zoom_fraction, before);
}

#[test]
fn pinch_wins_over_wheel() {
    let mut d = overhead();
    start_pinch(&mut d, Vec2::new(0.3, 0.5), Vec2::new(0.7, 0.5));
    d.tracker.append_scroll_delta(Vec2::new(0.0, 1.0));
    let out = pinch_pair(&mut d, 0.02, Vec2::new(0.3, 0.5), Vec2::new(0.7, 0.5));
    assert_eq!(out.gesture, ResolvedGesture::Pinch);
}

// ═══════════════════════════════════════════════════════════════════════
// Double tap
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn double_tap_drag_zooms() {
    let mut d = Driver::new(PerspectiveScene::default());
    let p = Vec2::new(0.5, 0.5);
    let q = Vec2::new(0.52, 0.48);

    d.frame(0.0, &[PointerEvent::began(1, p, 0.0)]);
    d.frame(0.1, &[PointerEvent::ended(1, p, 0.1)]);
    let out = d.frame(0.3, &[PointerEvent::began(2, q, 0.3)]);
    assert!(out.is_zooming);
    assert_eq!(out.gesture, ResolvedGesture::DoubleTapZoom);

    let before = d.tracker.zoom_fraction();
    let out = d.frame(0.35, &[PointerEvent::held(2, q + Vec2::new(0.0, -0.1), 0.35)]);
    assert!(out.is_zooming);
    assert!(d.tracker.is_currently_zooming());
    let expected = (before + 0.1 * d.tracker.settings().double_tap_zoom_speed).clamp(0.0, 1.0);
    assert!((out.zoom_fraction - expected).abs() < 1e-5, "{} vs {expected}", out.zoom_fraction);
}

#[test]
fn double_tap_drag_does_not_pan() {
    let mut d = Driver::new(PerspectiveScene::default());
    let p = Vec2::new(0.5, 0.5);
    d.frame(0.0, &[PointerEvent::began(1, p, 0.0)]);
    d.frame(0.1, &[PointerEvent::ended(1, p, 0.1)]);
    d.frame(0.2, &[PointerEvent::began(2, p, 0.2)]);
    let moved_before = d.tracker.camera_movement();
    d.frame(0.25, &[PointerEvent::held(2, Vec2::new(0.7, 0.3), 0.25)]);
    assert_eq!(d.tracker.camera_movement(), moved_before);
}

#[test]
fn lone_tap_times_out_without_zoom() {
    let mut d = Driver::new(PerspectiveScene::default());
    let p = Vec2::new(0.5, 0.5);
    let zoom = d.tracker.zoom_fraction();

    d.frame(0.0, &[PointerEvent::began(1, p, 0.0)]);
    d.frame(0.1, &[PointerEvent::ended(1, p, 0.1)]);
    assert_eq!(d.tracker.double_tap_phase(), DoubleTapPhase::AwaitingSecondPress);

    d.frame(0.3, &[]);
    let out = d.frame(0.6, &[]);
    assert!(!out.is_zooming);
    assert_eq!(d.tracker.double_tap_phase(), DoubleTapPhase::Idle);
    assert_eq!(d.tracker.zoom_fraction(), zoom);

    // A later press starts a new candidate instead of completing the old one.
    let out = d.frame(0.7, &[PointerEvent::began(2, p, 0.7)]);
    assert!(!out.is_zooming);
    assert_eq!(d.tracker.double_tap_phase(), DoubleTapPhase::AwaitingFirstRelease);
}

#[test]
fn pinch_resets_waiting_double_tap() {
    let mut d = overhead();
    let p = Vec2::new(0.5, 0.5);
    d.frame(0.0, &[PointerEvent::began(1, p, 0.0)]);
    d.frame(0.1, &[PointerEvent::ended(1, p, 0.1)]);
    assert_eq!(d.tracker.double_tap_phase(), DoubleTapPhase::AwaitingSecondPress);

    let out = d.frame(
        0.2,
        &[
            PointerEvent::began(2, Vec2::new(0.3, 0.5), 0.2),
            PointerEvent::began(3, Vec2::new(0.7, 0.5), 0.2),
        ],
    );
    assert_eq!(out.gesture, ResolvedGesture::Pinch);
    assert_eq!(d.tracker.double_tap_phase(), DoubleTapPhase::Idle);
}

#[test]
fn pinch_resets_dragging_double_tap() {
    let mut d = overhead();
    let p = Vec2::new(0.3, 0.5);
    d.frame(0.0, &[PointerEvent::began(1, p, 0.0)]);
    d.frame(0.1, &[PointerEvent::ended(1, p, 0.1)]);
    d.frame(0.2, &[PointerEvent::began(2, p, 0.2)]);
    assert_eq!(d.tracker.double_tap_phase(), DoubleTapPhase::Dragging);

    let zoom = d.tracker.zoom_fraction();
    let out = d.frame(
        0.25,
        &[
            PointerEvent::held(2, p, 0.25),
            PointerEvent::began(3, Vec2::new(0.7, 0.5), 0.25),
        ],
    );
    assert_eq!(out.gesture, ResolvedGesture::Pinch);
    assert_eq!(d.tracker.double_tap_phase(), DoubleTapPhase::Idle);
    // Pointers began this frame, so separation is unchanged.
    assert_eq!(out.zoom_fraction, zoom);
}

#[test]
fn late_second_finger_does_not_interrupt_double_tap_drag() {
    let mut d = overhead();
    let p = Vec2::new(0.3, 0.5);
    let q = Vec2::new(0.7, 0.5);
    d.frame(0.0, &[PointerEvent::began(1, p, 0.0)]);
    d.frame(0.1, &[PointerEvent::ended(1, p, 0.1)]);
    d.frame(0.2, &[PointerEvent::began(2, p, 0.2)]);
    d.frame(0.25, &[PointerEvent::held(2, p, 0.25)]);
    assert_eq!(d.tracker.double_tap_phase(), DoubleTapPhase::Dragging);

    // The drag frame above already emptied the pinch slots, so pointer 3
    // never pairs with pointer 2.
    let out = d.frame(
        0.3,
        &[PointerEvent::held(2, p, 0.3), PointerEvent::began(3, q, 0.3)],
    );
    assert_eq!(out.gesture, ResolvedGesture::DoubleTapZoom);

    let zoom = d.tracker.zoom_fraction();
    let out = d.frame(
        0.35,
        &[
            PointerEvent::held(2, p + Vec2::new(0.0, -0.05), 0.35),
            PointerEvent::held(3, q + Vec2::new(0.1, 0.0), 0.35),
        ],
    );
    assert_eq!(out.gesture, ResolvedGesture::DoubleTapZoom);
    assert_eq!(d.tracker.double_tap_phase(), DoubleTapPhase::Dragging);
    assert_eq!(d.tracker.tracked_pointer_count(), 0);
    // 0.05 * 2.0 speed
    assert!((out.zoom_fraction - (zoom + 0.1)).abs() < 1e-5);
}

// ═══════════════════════════════════════════════════════════════════════
// Pan and orbit
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn dragging_right_pans_camera_left() {
    let mut d = Driver::new(PerspectiveScene::default());
    let start = Vec2::new(0.4, 0.5);
    let dx = 0.1;

    d.frame(0.0, &[PointerEvent::began(1, start, 0.0)]);
    let out = d.frame(0.02, &[PointerEvent::held(1, start + Vec2::new(dx, 0.0), 0.02)]);
    assert_eq!(out.gesture, ResolvedGesture::Pan);

    let speed = d.tracker.settings().pan_speed(d.tracker.zoom_fraction());
    let right = d.scene.camera_right();
    let along_right = out.camera_movement.dot(right);
    assert!((along_right + dx * speed).abs() < 1e-2, "{along_right}");
    assert_eq!(out.rotation_angle_degrees, 0.0);
}

#[test]
fn true_north_lock_pans_while_navigating() {
    let mut d = overhead();
    d.tracker.set_navigating(true);
    d.tracker.set_true_north_facing(true);
    d.frame(0.0, &[PointerEvent::began(1, Vec2::new(0.8, 0.5), 0.0)]);
    let out = d.frame(0.02, &[PointerEvent::held(1, Vec2::new(0.5, 0.8), 0.02)]);
    assert_eq!(out.gesture, ResolvedGesture::Pan);
    assert_eq!(out.rotation_angle_degrees, 0.0);
}

#[test]
fn orbit_adds_focus_relative_turn() {
    let mut d = overhead();
    d.tracker.set_navigating(true);
    let radius = 0.3;
    let centre = Vec2::new(0.5, 0.5);
    let (s, c) = 10f32.to_radians().sin_cos();

    d.frame(0.0, &[PointerEvent::began(1, centre + Vec2::new(radius, 0.0), 0.0)]);
    let out = d.frame(
        0.02,
        &[PointerEvent::held(1, centre + Vec2::new(c, s) * radius, 0.02)],
    );
    assert_eq!(out.gesture, ResolvedGesture::Orbit);
    assert!((out.rotation_angle_degrees - 10.0).abs() < 1e-3, "{}", out.rotation_angle_degrees);

    // Reverse direction turns back.
    let out = d.frame(0.04, &[PointerEvent::held(1, centre + Vec2::new(radius, 0.0), 0.04)]);
    assert!(out.rotation_angle_degrees.abs() < 1e-3);
}

#[test]
fn orbit_without_motion_keeps_angle() {
    let mut d = overhead();
    d.tracker.set_navigating(true);
    let p = Vec2::new(0.8, 0.5);
    d.frame(0.0, &[PointerEvent::began(1, p, 0.0)]);
    let out = d.frame(0.02, &[PointerEvent::held(1, p, 0.02)]);
    assert_eq!(out.gesture, ResolvedGesture::Orbit);
    assert_eq!(out.rotation_angle_degrees, 0.0);
}

#[test]
fn drag_resumed_after_frame_drop_does_not_jump() {
    let mut d = Driver::new(PerspectiveScene::default());
    d.frame(0.0, &[PointerEvent::began(1, Vec2::new(0.2, 0.5), 0.0)]);
    d.frame(0.02, &[PointerEvent::held(1, Vec2::new(0.25, 0.5), 0.02)]);
    let before = d.tracker.camera_movement();

    // Skip three frame numbers.
    d.frame += 3;
    d.frame(0.1, &[PointerEvent::held(1, Vec2::new(0.9, 0.5), 0.1)]);
    assert_eq!(d.tracker.camera_movement(), before);
}

// ═══════════════════════════════════════════════════════════════════════
// Idempotence
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn empty_frames_change_nothing() {
    let mut d = overhead();
    start_pinch(&mut d, Vec2::new(0.3, 0.5), Vec2::new(0.7, 0.5));
    pinch_pair(&mut d, 0.02, Vec2::new(0.35, 0.45), Vec2::new(0.65, 0.6));

    let zoom = d.tracker.zoom_fraction();
    let angle = d.tracker.rotation_angle_degrees();
    let tracked: Vec<_> = d.tracker.pinch().tracked().map(|t| (t.id, t.position)).collect();
    assert_eq!(tracked.len(), 2);

    for i in 0..5 {
        let out = d.frame(0.04 + f64::from(i) * 0.02, &[]);
        assert!(!out.is_zooming);
    }

    assert_eq!(d.tracker.zoom_fraction(), zoom);
    assert_eq!(d.tracker.rotation_angle_degrees(), angle);
    let after: Vec<_> = d.tracker.pinch().tracked().map(|t| (t.id, t.position)).collect();
    assert_eq!(after, tracked);
}
