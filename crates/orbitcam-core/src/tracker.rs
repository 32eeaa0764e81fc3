#![forbid(unsafe_code)]

//! Frame-synchronous gesture orchestration.
//!
//! The host appends every pointer event of a frame, then calls
//! [`GestureTracker::resolve`] exactly once. Resolution runs the resolvers in
//! priority order and merges their effects into the [`CameraSignals`]:
//!
//! 1. Mouse wheel zoom, unless any event this frame lies over UI.
//! 2. Pinch zoom and twist. A frame resolved as a pinch always resets the
//!    double-tap recognizer. Once a zoom stops, leftover pinch slots are
//!    cleared.
//! 3. Double-tap-drag zoom (when enabled). It is reset whenever an earlier
//!    step zoomed and it did not.
//! 4. Orbit or pan with the single remaining unclaimed pointer, if no zoom
//!    owned the frame.
//!
//! The batch is cleared afterwards. Resolution never fails: degenerate
//! geometry skips the affected contribution and the signals stay valid.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use orbitcam_core::{FrameTime, GestureSettings, GestureTracker, PerspectiveScene, PointerEvent};
//!
//! let scene = PerspectiveScene::default();
//! let mut tracker = GestureTracker::new(GestureSettings::default());
//!
//! tracker.append_scroll_delta(Vec2::new(0.0, 2.0));
//! let out = tracker.resolve(&scene, FrameTime::new(1, 0.0, 0.1));
//! assert!(out.is_zooming);
//! assert!((out.zoom_fraction - 0.6).abs() < 1e-6);
//!
//! tracker.append_event(PointerEvent::began(1, Vec2::splat(0.5), 0.1));
//! let out = tracker.resolve(&scene, FrameTime::new(2, 0.1, 0.1));
//! assert!(!out.is_zooming);
//! ```

use glam::{Vec2, Vec3};

use crate::double_tap::{DoubleTapPhase, DoubleTapZoom};
use crate::event::{FrameBatch, FrameTime, PointerEvent};
use crate::geometry::{approximately, clamp01};
use crate::output::{CameraSignals, GestureOutput, ResolvedGesture};
use crate::pinch::PinchResolver;
use crate::scene::SceneView;
use crate::settings::{GestureSettings, SettingsError};
use crate::swipe::{SwipeContext, SwipeMode, SwipeResolver};

/// Owns all gesture state for one camera-control session.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    settings: GestureSettings,
    batch: FrameBatch,
    signals: CameraSignals,
    double_tap: DoubleTapZoom,
    pinch: PinchResolver,
    swipe: SwipeResolver,
    navigating: bool,
    true_north_facing: bool,
    is_zooming: bool,
    was_zooming: bool,
    last_gesture: ResolvedGesture,
}

impl GestureTracker {
    /// Create a tracker at the configured default zoom.
    #[must_use]
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            signals: CameraSignals::with_zoom(settings.default_zoom_fraction),
            settings,
            batch: FrameBatch::new(),
            double_tap: DoubleTapZoom::new(),
            pinch: PinchResolver::new(),
            swipe: SwipeResolver::new(),
            navigating: false,
            true_north_facing: false,
            is_zooming: false,
            was_zooming: false,
            last_gesture: ResolvedGesture::Idle,
        }
    }

    /// Like [`new`](Self::new), rejecting out-of-range settings.
    pub fn try_new(settings: GestureSettings) -> Result<Self, SettingsError> {
        Ok(Self::new(settings.validated()?))
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Queue an event for the current frame.
    pub fn append_event(&mut self, event: PointerEvent) {
        self.batch.push(event);
    }

    /// Accumulate a wheel or trackpad delta for the current frame.
    pub fn append_scroll_delta(&mut self, delta: Vec2) {
        self.batch.add_scroll_delta(delta);
    }

    /// Events queued for the current frame.
    #[must_use]
    pub fn pending_events(&self) -> &[PointerEvent] {
        self.batch.events()
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Resolve the queued events into camera signals and clear the batch.
    pub fn resolve(&mut self, scene: &impl SceneView, time: FrameTime) -> GestureOutput {
        let _span = tracing::trace_span!("gesture.resolve", frame = time.frame).entered();

        let scroll = self.batch.scroll_delta();
        let has_input = !self.batch.is_empty() || scroll != Vec2::ZERO;
        let mut zooming = false;
        let mut gesture = ResolvedGesture::Idle;

        if self.wheel_zoom(scene, scroll, time.delta) {
            zooming = true;
            gesture = ResolvedGesture::WheelZoom;
        }

        let pinch = self.pinch.update(
            &self.batch,
            scene,
            &self.settings,
            self.navigating,
            &mut self.signals,
        );
        if pinch.zooming {
            zooming = true;
            gesture = ResolvedGesture::Pinch;
        } else if self.was_zooming && has_input {
            self.pinch.clear_slots();
        }

        if pinch.zooming {
            self.double_tap.reset();
        } else if self.settings.double_tap_zoom_enabled
            && self.double_tap.update(
                &mut self.batch,
                scene,
                time.now,
                &self.settings,
                &mut self.signals.zoom_fraction,
            )
        {
            zooming = true;
            gesture = ResolvedGesture::DoubleTapZoom;
        } else if zooming {
            self.double_tap.reset();
        }

        let ctx = SwipeContext {
            frame: time.frame,
            zooming,
            navigating: self.navigating,
            true_north_facing: self.true_north_facing,
        };
        match self
            .swipe
            .update(&self.batch, scene, &self.settings, ctx, &mut self.signals)
        {
            Some(SwipeMode::Orbit) => gesture = ResolvedGesture::Orbit,
            Some(SwipeMode::Pan) => gesture = ResolvedGesture::Pan,
            None => {}
        }

        self.is_zooming = zooming;
        if has_input {
            self.was_zooming = zooming;
        }
        if gesture != self.last_gesture {
            tracing::debug!(
                from = self.last_gesture.name(),
                to = gesture.name(),
                frame = time.frame,
                "gesture.transition"
            );
            self.last_gesture = gesture;
        }
        self.batch.clear();

        GestureOutput::new(&self.signals, zooming, gesture)
    }

    fn wheel_zoom(&mut self, scene: &impl SceneView, scroll: Vec2, delta: f32) -> bool {
        if approximately(scroll.y, 0.0) {
            return false;
        }
        if self
            .batch
            .events()
            .iter()
            .any(|e| scene.is_over_ui(e.position))
        {
            tracing::trace!(scroll = scroll.y, "wheel.suppressed_over_ui");
            return false;
        }
        self.signals.zoom_fraction = clamp01(
            self.signals.zoom_fraction + scroll.y * delta * self.settings.mouse_scroll_zoom_speed,
        );
        true
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Current zoom fraction, within `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn zoom_fraction(&self) -> f32 {
        self.signals.zoom_fraction
    }

    /// Accumulated rotation in degrees.
    #[inline]
    #[must_use]
    pub fn rotation_angle_degrees(&self) -> f32 {
        self.signals.rotation_angle_degrees
    }

    /// Accumulated camera translation.
    #[inline]
    #[must_use]
    pub fn camera_movement(&self) -> Vec3 {
        self.signals.camera_movement
    }

    /// Ceiling applied to the translation while pinch zooming out.
    #[inline]
    #[must_use]
    pub fn max_camera_movement(&self) -> Vec3 {
        self.signals.max_camera_movement
    }

    /// All signals at once.
    #[inline]
    #[must_use]
    pub fn signals(&self) -> &CameraSignals {
        &self.signals
    }

    /// Whether a zoom gesture owned the last resolved frame.
    #[inline]
    #[must_use]
    pub fn is_currently_zooming(&self) -> bool {
        self.is_zooming
    }

    /// State of the double-tap recognizer.
    #[must_use]
    pub fn double_tap_phase(&self) -> DoubleTapPhase {
        self.double_tap.phase()
    }

    /// Number of pointers held in the pinch slots.
    #[must_use]
    pub fn tracked_pointer_count(&self) -> usize {
        self.pinch.tracked_count()
    }

    /// Pinch resolver state, for inspection.
    #[must_use]
    pub fn pinch(&self) -> &PinchResolver {
        &self.pinch
    }

    /// Settings supplied at construction.
    #[must_use]
    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Host control
    // ------------------------------------------------------------------

    /// Overwrite the zoom fraction. Clamped to `[0, 1]`.
    pub fn set_zoom_fraction(&mut self, zoom: f32) {
        self.signals.zoom_fraction = clamp01(zoom);
    }

    /// Overwrite the rotation accumulator.
    pub fn set_rotation_angle_degrees(&mut self, degrees: f32) {
        self.signals.rotation_angle_degrees = degrees;
    }

    /// Overwrite the translation accumulator.
    pub fn set_camera_movement(&mut self, movement: Vec3) {
        self.signals.camera_movement = movement;
    }

    /// Set the translation ceiling.
    pub fn set_max_camera_movement(&mut self, max: Vec3) {
        self.signals.max_camera_movement = max;
    }

    /// Navigation mode: single-pointer drags orbit instead of pan.
    pub fn set_navigating(&mut self, navigating: bool) {
        self.navigating = navigating;
    }

    /// Whether navigation mode is on.
    #[must_use]
    pub fn is_navigating(&self) -> bool {
        self.navigating
    }

    /// Heading locked to true north: drags pan even while navigating.
    pub fn set_true_north_facing(&mut self, locked: bool) {
        self.true_north_facing = locked;
    }

    /// Whether the heading is locked to true north.
    #[must_use]
    pub fn is_true_north_facing(&self) -> bool {
        self.true_north_facing
    }

    /// Drop all gesture state and return to the default zoom.
    ///
    /// Mode flags and the movement ceiling are kept.
    pub fn reset(&mut self) {
        let max = self.signals.max_camera_movement;
        self.signals = CameraSignals::with_zoom(self.settings.default_zoom_fraction);
        self.signals.max_camera_movement = max;
        self.batch.clear();
        self.double_tap.reset();
        self.pinch.clear_slots();
        self.swipe.reset();
        self.is_zooming = false;
        self.was_zooming = false;
        self.last_gesture = ResolvedGesture::Idle;
    }
}
