#![forbid(unsafe_code)]

//! Single-pointer orbit and pan.
//!
//! Runs on frames no zoom gesture claimed, when exactly one unclaimed pointer
//! is pressed. A drag has to start with a fresh press outside UI; a pointer
//! that is already down when the resolver first sees it is ignored until it
//! lifts.
//!
//! In navigation mode (unless locked to true north) the drag orbits the focus:
//! both the reference and current pointer positions are projected onto the
//! ground and the turn between their focus-relative directions is added to
//! the rotation angle. Otherwise the drag pans the camera across the ground
//! plane at a speed that grows with the zoom fraction.

use glam::{Vec2, Vec3};

use crate::event::{FrameBatch, PointerPhase};
use crate::geometry::{clamp_dir_to_ground, cross_ground, flatten, turn_degrees};
use crate::output::CameraSignals;
use crate::scene::SceneView;
use crate::settings::GestureSettings;

/// Interpretation applied to a single-pointer drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeMode {
    /// Rotate around the focus point.
    Orbit,
    /// Translate the camera.
    Pan,
}

impl SwipeMode {
    /// Mode for the given host flags.
    #[must_use]
    pub const fn select(navigating: bool, true_north_facing: bool) -> Self {
        if navigating && !true_north_facing {
            Self::Orbit
        } else {
            Self::Pan
        }
    }
}

/// Host flags read by the swipe resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwipeContext {
    /// Frame counter of the current frame.
    pub frame: u64,
    /// Whether a zoom gesture owned this frame.
    pub zooming: bool,
    /// Navigation mode flag.
    pub navigating: bool,
    /// Heading is locked to true north.
    pub true_north_facing: bool,
}

/// Orbit/pan resolver.
#[derive(Debug, Clone, Default)]
pub struct SwipeResolver {
    reference_position: Vec2,
    last_frame: Option<u64>,
    was_rotating: bool,
}

impl SwipeResolver {
    /// Create an idle resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last frame applied a drag.
    #[inline]
    #[must_use]
    pub fn was_rotating(&self) -> bool {
        self.was_rotating
    }

    /// Forget the current drag.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Resolve one frame. Returns the mode applied, if any.
    pub fn update(
        &mut self,
        batch: &FrameBatch,
        scene: &impl SceneView,
        settings: &GestureSettings,
        ctx: SwipeContext,
        signals: &mut CameraSignals,
    ) -> Option<SwipeMode> {
        let pointer = if ctx.zooming {
            None
        } else {
            sole_active_pointer(batch)
        };
        let Some((position, began)) = pointer else {
            self.was_rotating = false;
            return None;
        };

        if !self.was_rotating {
            if !began || scene.is_over_ui(position) {
                tracing::trace!(began, frame = ctx.frame, "swipe.start_rejected");
                return None;
            }
            self.reference_position = position;
        }

        let contiguous = self
            .last_frame
            .is_some_and(|last| last.wrapping_add(1) == ctx.frame);
        if !contiguous {
            self.reference_position = position;
        }

        let mode = SwipeMode::select(ctx.navigating, ctx.true_north_facing);
        match mode {
            SwipeMode::Orbit => self.orbit(scene, settings, position, signals),
            SwipeMode::Pan => self.pan(scene, settings, position, signals),
        }

        self.reference_position = position;
        self.last_frame = Some(ctx.frame);
        self.was_rotating = true;
        Some(mode)
    }

    fn orbit(
        &self,
        scene: &impl SceneView,
        settings: &GestureSettings,
        position: Vec2,
        signals: &mut CameraSignals,
    ) {
        let Some(current) = project_to_ground(scene, settings, position) else {
            return;
        };
        let Some(reference) = project_to_ground(scene, settings, self.reference_position) else {
            return;
        };

        let focus = scene.focus_position();
        let from = (reference - focus).normalize_or_zero();
        let to = (current - focus).normalize_or_zero();
        if let Some(turn) = turn_degrees(from, to, cross_ground(from, to)) {
            signals.rotation_angle_degrees += turn;
        }
    }

    fn pan(
        &self,
        scene: &impl SceneView,
        settings: &GestureSettings,
        position: Vec2,
        signals: &mut CameraSignals,
    ) {
        let delta = position - self.reference_position;
        let speed = settings.pan_speed(signals.zoom_fraction);
        let right = flatten(scene.camera_right());
        let forward = flatten(scene.camera_forward());
        signals.camera_movement += (right * -delta.x + forward * -delta.y) * speed;
    }
}

/// The single unclaimed `Began`/`Held` pointer, with whether it just began.
fn sole_active_pointer(batch: &FrameBatch) -> Option<(Vec2, bool)> {
    let mut active = batch.unclaimed().filter(|(_, e)| e.phase.is_active());
    let (_, event) = active.next()?;
    if active.next().is_some() {
        return None;
    }
    Some((event.position, event.phase == PointerPhase::Began))
}

fn project_to_ground(
    scene: &impl SceneView,
    settings: &GestureSettings,
    position: Vec2,
) -> Option<Vec3> {
    let mut ray = scene.viewport_ray(position);
    ray.direction = clamp_dir_to_ground(ray.direction, settings.ground_clamp_threshold);
    scene.raycast_ground_plane(&ray, settings.orbit_ground_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PointerEvent;
    use crate::geometry::Ray;
    use crate::scene::UiOcclusion;

    struct Overhead;

    impl UiOcclusion for Overhead {
        fn is_over_ui(&self, p: Vec2) -> bool {
            p.y > 0.95
        }
    }

    impl SceneView for Overhead {
        fn screen_width_inches(&self) -> f32 {
            5.0
        }
        fn viewport_ray(&self, p: Vec2) -> Ray {
            Ray::new(Vec3::new(p.x, 10.0, p.y), Vec3::NEG_Y)
        }
        fn camera_position(&self) -> Vec3 {
            Vec3::new(0.0, 10.0, 0.0)
        }
        fn camera_forward(&self) -> Vec3 {
            Vec3::new(0.0, -1.0, 1.0)
        }
        fn camera_right(&self) -> Vec3 {
            Vec3::X
        }
        fn focus_position(&self) -> Vec3 {
            Vec3::ZERO
        }
    }

    fn run(
        swipe: &mut SwipeResolver,
        event: PointerEvent,
        ctx: SwipeContext,
        signals: &mut CameraSignals,
    ) -> Option<SwipeMode> {
        let mut batch = FrameBatch::new();
        batch.push(event);
        swipe.update(&batch, &Overhead, &GestureSettings::default(), ctx, signals)
    }

    fn ctx(frame: u64, navigating: bool) -> SwipeContext {
        SwipeContext {
            frame,
            navigating,
            ..SwipeContext::default()
        }
    }

    #[test]
    fn mode_selection() {
        assert_eq!(SwipeMode::select(true, false), SwipeMode::Orbit);
        assert_eq!(SwipeMode::select(true, true), SwipeMode::Pan);
        assert_eq!(SwipeMode::select(false, false), SwipeMode::Pan);
    }

    #[test]
    fn pan_moves_against_drag() {
        let mut swipe = SwipeResolver::new();
        let mut signals = CameraSignals::with_zoom(0.5);
        let start = Vec2::new(0.4, 0.5);
        run(&mut swipe, PointerEvent::began(1, start, 0.0), ctx(1, false), &mut signals);
        assert_eq!(signals.camera_movement, Vec3::ZERO);

        let mode = run(
            &mut swipe,
            PointerEvent::held(1, start + Vec2::new(0.1, 0.0), 0.1),
            ctx(2, false),
            &mut signals,
        );
        assert_eq!(mode, Some(SwipeMode::Pan));
        // speed = clamp(0.5 * 1000, 200, 1000) = 500
        assert!((signals.camera_movement.x + 50.0).abs() < 1e-3);
        assert_eq!(signals.rotation_angle_degrees, 0.0);
    }

    #[test]
    fn vertical_drag_pans_along_flattened_forward() {
        let mut swipe = SwipeResolver::new();
        let mut signals = CameraSignals::with_zoom(1.0);
        run(&mut swipe, PointerEvent::began(1, Vec2::splat(0.5), 0.0), ctx(1, false), &mut signals);
        run(&mut swipe, PointerEvent::held(1, Vec2::new(0.5, 0.6), 0.1), ctx(2, false), &mut signals);
        assert!((signals.camera_movement.z + 100.0).abs() < 1e-2);
        assert_eq!(signals.camera_movement.y, 0.0);
    }

    #[test]
    fn held_without_begin_is_ignored() {
        let mut swipe = SwipeResolver::new();
        let mut signals = CameraSignals::with_zoom(0.5);
        let mode = run(&mut swipe, PointerEvent::held(1, Vec2::ZERO, 0.0), ctx(1, false), &mut signals);
        assert_eq!(mode, None);
        assert!(!swipe.was_rotating());
    }

    #[test]
    fn press_over_ui_is_ignored() {
        let mut swipe = SwipeResolver::new();
        let mut signals = CameraSignals::with_zoom(0.5);
        let mode = run(
            &mut swipe,
            PointerEvent::began(1, Vec2::new(0.5, 0.99), 0.0),
            ctx(1, false),
            &mut signals,
        );
        assert_eq!(mode, None);
    }

    #[test]
    fn frame_skip_resets_reference() {
        let mut swipe = SwipeResolver::new();
        let mut signals = CameraSignals::with_zoom(0.5);
        run(&mut swipe, PointerEvent::began(1, Vec2::ZERO, 0.0), ctx(1, false), &mut signals);
        run(&mut swipe, PointerEvent::held(1, Vec2::new(0.5, 0.0), 0.5), ctx(5, false), &mut signals);
        assert_eq!(signals.camera_movement, Vec3::ZERO);
    }

    #[test]
    fn orbit_turns_by_focus_relative_angle() {
        let mut swipe = SwipeResolver::new();
        let mut signals = CameraSignals::with_zoom(0.5);
        run(&mut swipe, PointerEvent::began(1, Vec2::new(1.0, 0.0), 0.0), ctx(1, true), &mut signals);

        let (s, c) = 10f32.to_radians().sin_cos();
        let mode = run(&mut swipe, PointerEvent::held(1, Vec2::new(c, s), 0.1), ctx(2, true), &mut signals);
        assert_eq!(mode, Some(SwipeMode::Orbit));
        assert!((signals.rotation_angle_degrees - 10.0).abs() < 1e-3);
        assert_eq!(signals.camera_movement, Vec3::ZERO);
    }

    #[test]
    fn zoom_frame_interrupts_drag() {
        let mut swipe = SwipeResolver::new();
        let mut signals = CameraSignals::with_zoom(0.5);
        run(&mut swipe, PointerEvent::began(1, Vec2::ZERO, 0.0), ctx(1, false), &mut signals);
        let zooming = SwipeContext {
            zooming: true,
            ..ctx(2, false)
        };
        assert_eq!(run(&mut swipe, PointerEvent::held(1, Vec2::ONE, 0.1), zooming, &mut signals), None);
        assert!(!swipe.was_rotating());
    }

    #[test]
    fn two_pointers_do_not_swipe() {
        let mut swipe = SwipeResolver::new();
        let mut signals = CameraSignals::with_zoom(0.5);
        let mut batch = FrameBatch::new();
        batch.push(PointerEvent::began(1, Vec2::ZERO, 0.0));
        batch.push(PointerEvent::began(2, Vec2::ONE, 0.0));
        let mode = swipe.update(&batch, &Overhead, &GestureSettings::default(), ctx(1, false), &mut signals);
        assert_eq!(mode, None);
    }
}
